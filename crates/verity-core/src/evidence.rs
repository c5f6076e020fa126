//! Evidence collector.
//!
//! Produces a best-effort corroboration snapshot keyed by the subject's
//! salient terms. The bundled [`SyntheticEvidence`] source is a stand-in:
//! it derives stable pseudo-counts from a digest of the search terms and
//! marks the snapshot `synthetic`. Any source error or timeout is turned
//! into [`EvidenceSnapshot::Unavailable`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{Result, VerityError};

/// Default bound on a single gather call.
pub const DEFAULT_EVIDENCE_TIMEOUT: Duration = Duration::from_millis(2000);

const TITLE_TERMS: usize = 3;
const BODY_TERMS: usize = 5;
const MIN_BODY_TERM_CHARS: usize = 6;

const COMMUNITIES: &[&str] = &["r/news", "r/politics", "r/conspiracy"];
const TOP_POSTS: &[&str] = &[
    "This seems suspicious...",
    "Need to verify this claim",
    "Source credibility questionable",
];

/// Salient search terms: the title's first three words, then up to five
/// body words longer than five characters.
pub fn search_terms(text: &str, title: Option<&str>) -> Vec<String> {
    let mut terms: Vec<String> = title
        .map(|t| {
            t.split_whitespace()
                .take(TITLE_TERMS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    terms.extend(
        text.split_whitespace()
            .filter(|w| w.chars().count() >= MIN_BODY_TERM_CHARS)
            .take(BODY_TERMS)
            .map(str::to_string),
    );
    terms
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Coverage {
    Limited,
    Extensive,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialMentions {
    pub count: u32,
    pub sentiment: String,
    pub top_posts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Discussions {
    pub count: u32,
    pub communities: Vec<String>,
    pub sentiment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsSources {
    pub mainstream_coverage: Coverage,
    pub source_diversity: u32,
}

/// Corroboration signals for one query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceData {
    pub social_mentions: SocialMentions,
    pub discussions: Discussions,
    /// Site name to status text.
    pub fact_check_sites: BTreeMap<String, String>,
    pub news_sources: NewsSources,
    pub search_terms: Vec<String>,
    /// Hex SHA-256 of the joined search terms.
    pub query_digest: String,
    /// True when the data is generated rather than fetched.
    pub synthetic: bool,
}

/// What the collector hands to the engine: data, or a marker saying why
/// there is none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvidenceSnapshot {
    Available(EvidenceData),
    Unavailable { reason: String },
}

impl EvidenceSnapshot {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        EvidenceSnapshot::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, EvidenceSnapshot::Available(_))
    }

    pub fn data(&self) -> Option<&EvidenceData> {
        match self {
            EvidenceSnapshot::Available(data) => Some(data),
            EvidenceSnapshot::Unavailable { .. } => None,
        }
    }
}

/// A provider of corroboration data.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn gather(&self, text: &str, title: Option<&str>) -> Result<EvidenceData>;
}

/// Deterministic placeholder source. The same terms always produce the same
/// snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticEvidence;

impl SyntheticEvidence {
    pub fn new() -> Self {
        Self
    }

    fn synthesize(terms: Vec<String>) -> EvidenceData {
        let digest = Sha256::digest(terms.join(" ").as_bytes());
        let word = |i: usize| u32::from(u16::from_be_bytes([digest[i], digest[i + 1]]));

        let coverage = match digest[6] % 3 {
            0 => Coverage::Limited,
            1 => Coverage::Extensive,
            _ => Coverage::None,
        };

        let fact_check_sites = BTreeMap::from([
            ("snopes".to_string(), "No recent fact-check found".to_string()),
            ("politifact".to_string(), "Under review".to_string()),
            ("factcheck_org".to_string(), "Not yet analyzed".to_string()),
        ]);

        EvidenceData {
            social_mentions: SocialMentions {
                count: word(0) % 50,
                sentiment: "mixed".to_string(),
                top_posts: TOP_POSTS.iter().map(|s| s.to_string()).collect(),
            },
            discussions: Discussions {
                count: word(2) % 20,
                communities: COMMUNITIES.iter().map(|s| s.to_string()).collect(),
                sentiment: "skeptical".to_string(),
            },
            fact_check_sites,
            news_sources: NewsSources {
                mainstream_coverage: coverage,
                source_diversity: 1 + word(4) % 9,
            },
            search_terms: terms,
            query_digest: hex::encode(digest.as_slice()),
            synthetic: true,
        }
    }
}

#[async_trait]
impl EvidenceSource for SyntheticEvidence {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn gather(&self, text: &str, title: Option<&str>) -> Result<EvidenceData> {
        Ok(Self::synthesize(search_terms(text, title)))
    }
}

/// Bounds an [`EvidenceSource`] in time and folds every failure into an
/// unavailable snapshot.
#[derive(Clone)]
pub struct EvidenceCollector {
    source: Arc<dyn EvidenceSource>,
    timeout: Duration,
}

impl std::fmt::Debug for EvidenceCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceCollector")
            .field("source", &self.source.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for EvidenceCollector {
    fn default() -> Self {
        Self::new(Arc::new(SyntheticEvidence))
    }
}

impl EvidenceCollector {
    pub fn new(source: Arc<dyn EvidenceSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_EVIDENCE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Gather a snapshot. Never fails.
    pub async fn collect(&self, text: &str, title: Option<&str>) -> EvidenceSnapshot {
        let outcome = tokio::time::timeout(self.timeout, self.source.gather(text, title))
            .await
            .map_err(|_| {
                VerityError::InternalFault(format!(
                    "evidence source '{}' timed out after {} ms",
                    self.source.name(),
                    self.timeout.as_millis()
                ))
            })
            .and_then(|r| r);

        match outcome {
            Ok(data) => {
                debug!(
                    event = "evidence.gathered",
                    source = self.source.name(),
                    terms = data.search_terms.len(),
                );
                EvidenceSnapshot::Available(data)
            }
            Err(e) => {
                warn!(event = "evidence.unavailable", source = self.source.name(), error = %e);
                EvidenceSnapshot::unavailable(e.to_string())
            }
        }
    }
}

/// Evidence-only entry point using the synthetic source.
pub async fn gather_evidence(text: &str, title: Option<&str>) -> EvidenceSnapshot {
    EvidenceCollector::default().collect(text, title).await
}
