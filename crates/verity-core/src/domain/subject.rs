//! The subject under analysis and the boundary that admits it.

use serde::{Deserialize, Serialize};

use super::error::InputRejected;

/// Default minimum body length, in characters.
pub const DEFAULT_MIN_CHARS: usize = 10;

/// Default maximum body length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 10_000;

/// Where the subject text came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Raw text supplied by the caller.
    #[default]
    Text,
    /// Text stripped from a fetched web page.
    Url,
    /// Text extracted from an image by OCR.
    Image,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceKind::Text => "text",
            SourceKind::Url => "url",
            SourceKind::Image => "image",
        };
        f.write_str(s)
    }
}

/// Length bounds enforced before any analysis runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for SubjectLimits {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl SubjectLimits {
    /// Check a body against the bounds. Length is counted in characters of
    /// the trimmed body.
    pub fn check(&self, body: &str) -> Result<(), InputRejected> {
        let actual = body.trim().chars().count();
        if actual == 0 {
            return Err(InputRejected::Empty);
        }
        if actual < self.min_chars {
            return Err(InputRejected::TooShort {
                actual,
                min: self.min_chars,
            });
        }
        if actual > self.max_chars {
            return Err(InputRejected::TooLong {
                actual,
                max: self.max_chars,
            });
        }
        Ok(())
    }
}

/// Immutable text (plus optional title) being evaluated.
///
/// Construct through [`AnalysisSubject::new`] or
/// [`AnalysisSubject::with_limits`]; both validate the body length so the
/// engine never sees an out-of-bounds subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSubject {
    body: String,
    title: Option<String>,
    source: SourceKind,
    url: Option<String>,
}

impl AnalysisSubject {
    /// Validate against the default limits.
    pub fn new(
        body: impl Into<String>,
        title: Option<String>,
    ) -> Result<Self, InputRejected> {
        Self::with_limits(body, title, &SubjectLimits::default())
    }

    /// Validate against explicit limits.
    pub fn with_limits(
        body: impl Into<String>,
        title: Option<String>,
        limits: &SubjectLimits,
    ) -> Result<Self, InputRejected> {
        let body = body.into();
        limits.check(&body)?;
        let body = body.trim().to_string();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self {
            body,
            title,
            source: SourceKind::Text,
            url: None,
        })
    }

    /// Tag the subject with its origin.
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    /// Record the page the body was fetched from. Implies [`SourceKind::Url`].
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.source = SourceKind::Url;
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Body length in characters.
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }

    /// Whitespace-separated word count of the body.
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}
