//! Lexical and sentiment analysis.
//!
//! This analyzer never votes. It contributes supporting detail only:
//! sentiment polarity, syntactic features when a parser is configured, and
//! counts of emotionally charged words and clickbait phrasings.

pub mod sentiment;
pub mod syntax;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::warn;

use crate::domain::{DegradeCause, SignalStatus};

pub use sentiment::{SentimentScorer, SentimentScores};
pub use syntax::{HeuristicParser, LinguisticFeatures, SyntaxError, SyntaxParser};

/// Charged words counted by substring membership in the lowercased text.
pub const EMOTIONAL_WORDS: &[&str] = &[
    "amazing",
    "shocking",
    "incredible",
    "unbelievable",
    "outrageous",
    "devastating",
];

/// Canonical clickbait phrasings, matched against the lowercased text.
pub const CLICKBAIT_PATTERNS: &[&str] = &[
    r"you won['’]?t believe",
    r"shocking truth",
    r"doctors hate",
    r"this one trick",
    r"what happens next",
];

fn clickbait_regexes() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        CLICKBAIT_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Supporting detail produced by the lexical analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexicalReport {
    pub sentiment: SentimentScores,
    /// `None` when no parser is configured or the report degraded.
    pub linguistic_features: Option<LinguisticFeatures>,
    /// Number of [`EMOTIONAL_WORDS`] present.
    pub emotional_language: usize,
    /// Number of [`CLICKBAIT_PATTERNS`] matched.
    pub clickbait_score: usize,
}

impl LexicalReport {
    /// The zero-valued report substituted on any internal error.
    pub fn neutral() -> Self {
        Self {
            sentiment: SentimentScores::neutral(),
            linguistic_features: None,
            emotional_language: 0,
            clickbait_score: 0,
        }
    }
}

/// Lexical report plus whether it degraded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexicalSignal {
    pub status: SignalStatus,
    #[serde(flatten)]
    pub report: LexicalReport,
}

impl LexicalSignal {
    pub fn degraded(cause: DegradeCause, message: impl Into<String>) -> Self {
        Self {
            status: SignalStatus::degraded(cause, message),
            report: LexicalReport::neutral(),
        }
    }
}

/// Lexicon scorer plus an optional syntactic parser.
#[derive(Clone, Default)]
pub struct LexicalAnalyzer {
    scorer: SentimentScorer,
    parser: Option<Arc<dyn SyntaxParser>>,
}

impl std::fmt::Debug for LexicalAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexicalAnalyzer")
            .field("parser", &self.parser.is_some())
            .finish()
    }
}

impl LexicalAnalyzer {
    /// Sentiment and pattern counts only; no syntactic features.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with the built-in [`HeuristicParser`].
    pub fn with_heuristic_parser() -> Self {
        Self::new().with_parser(Arc::new(HeuristicParser::new()))
    }

    pub fn with_parser(mut self, parser: Arc<dyn SyntaxParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Analyze `text`. Never fails: an internal error yields the neutral
    /// report tagged [`DegradeCause::InternalFault`].
    pub fn analyze(&self, text: &str) -> LexicalSignal {
        match self.try_analyze(text) {
            Ok(report) => LexicalSignal {
                status: SignalStatus::Ok,
                report,
            },
            Err(e) => {
                warn!(event = "lexical.degraded", error = %e);
                LexicalSignal::degraded(DegradeCause::InternalFault, e.to_string())
            }
        }
    }

    fn try_analyze(&self, text: &str) -> Result<LexicalReport, SyntaxError> {
        let sentiment = self.scorer.polarity_scores(text);
        let linguistic_features = match &self.parser {
            Some(parser) => Some(parser.parse(text)?),
            None => None,
        };

        let lowered = text.to_lowercase();
        let emotional_language = EMOTIONAL_WORDS
            .iter()
            .filter(|w| lowered.contains(*w))
            .count();
        let clickbait_score = clickbait_regexes()
            .iter()
            .filter(|re| re.is_match(&lowered))
            .count();

        Ok(LexicalReport {
            sentiment,
            linguistic_features,
            emotional_language,
            clickbait_score,
        })
    }
}

/// Run the default analyzer (heuristic parser included) over `text`.
pub fn analyze_linguistics(text: &str) -> LexicalReport {
    LexicalAnalyzer::with_heuristic_parser().analyze(text).report
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenParser;

    impl SyntaxParser for BrokenParser {
        fn parse(&self, _text: &str) -> Result<LinguisticFeatures, SyntaxError> {
            Err(SyntaxError::Failed("tagger crashed".to_string()))
        }
    }

    #[test]
    fn counts_emotional_words_once_each() {
        let report = LexicalAnalyzer::new()
            .analyze("Shocking! An amazing, AMAZING and shocking discovery")
            .report;
        assert_eq!(report.emotional_language, 2);
    }

    #[test]
    fn counts_clickbait_patterns() {
        let report = LexicalAnalyzer::new()
            .analyze("You won't believe what happens next. Doctors hate this one trick!")
            .report;
        assert_eq!(report.clickbait_score, 4);

        let curly = LexicalAnalyzer::new()
            .analyze("You won’t believe this story")
            .report;
        assert_eq!(curly.clickbait_score, 1);
    }

    #[test]
    fn no_parser_means_empty_features() {
        let signal = LexicalAnalyzer::new().analyze("Plain factual sentence here.");
        assert_eq!(signal.status, SignalStatus::Ok);
        assert!(signal.report.linguistic_features.is_none());
    }

    #[test]
    fn heuristic_parser_populates_features() {
        let report = analyze_linguistics("The council approved the budget on Monday.");
        let features = report.linguistic_features.expect("features");
        assert_eq!(features.sentence_count, 1);
    }

    #[test]
    fn parser_failure_degrades_to_neutral() {
        let analyzer = LexicalAnalyzer::new().with_parser(Arc::new(BrokenParser));
        let signal = analyzer.analyze("Shocking news about an amazing cure");
        assert_eq!(signal.status.cause(), Some(DegradeCause::InternalFault));
        assert_eq!(signal.report, LexicalReport::neutral());
    }

    #[test]
    fn signal_flattens_report_fields() {
        let signal = LexicalAnalyzer::new().analyze("A calm and reliable report");
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["status"]["state"], "ok");
        assert!(json["sentiment"]["compound"].is_number());
        assert_eq!(json["clickbait_score"], 0);
    }
}
