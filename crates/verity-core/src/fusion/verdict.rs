//! The engine's output record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{SourceKind, Verdict, NEUTRAL_CONFIDENCE};
use crate::evidence::EvidenceSnapshot;
use crate::generative::JudgeSignal;
use crate::lexical::LexicalSignal;
use crate::statistical::ClassifierSignal;

pub const PIPELINE_FAILURE_RECOMMENDATION: &str = "Please try again";

/// Size and provenance of the analysed subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectMeta {
    /// Characters in the body.
    pub text_length: usize,
    pub word_count: usize,
    pub source_type: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Every analyzer's result, degraded or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisBreakdown {
    pub generative: JudgeSignal,
    pub statistical: ClassifierSignal,
    pub lexical: LexicalSignal,
    pub evidence: EvidenceSnapshot,
    #[serde(flatten)]
    pub subject: SubjectMeta,
}

impl AnalysisBreakdown {
    /// Number of analyzers that fell back to their canonical result.
    pub fn degraded_count(&self) -> usize {
        [
            self.generative.is_degraded(),
            self.statistical.is_degraded(),
            self.lexical.status.is_degraded(),
            !self.evidence.is_available(),
        ]
        .iter()
        .filter(|d| **d)
        .count()
    }
}

/// The breakdown, or the error that prevented one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Analysis {
    Complete(Box<AnalysisBreakdown>),
    Failed { error: String },
}

/// One final verdict for one subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusionVerdict {
    pub request_id: String,
    pub verdict: Verdict,
    /// In 0.0–1.0, rounded to two decimals.
    pub confidence: f64,
    pub analysis: Analysis,
    /// Never empty.
    pub factors: Vec<String>,
    /// Never empty.
    pub recommendations: Vec<String>,
    /// `None` only when the pipeline itself failed.
    pub evidence: Option<EvidenceSnapshot>,
    pub timestamp: DateTime<Utc>,
}

impl FusionVerdict {
    /// The `{UNCERTAIN, 0.5}` verdict returned when fusion could not run.
    pub fn pipeline_failure(request_id: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            request_id: request_id.into(),
            verdict: Verdict::Uncertain,
            confidence: NEUTRAL_CONFIDENCE,
            factors: vec![format!("Analysis failed due to error: {}", error)],
            recommendations: vec![PIPELINE_FAILURE_RECOMMENDATION.to_string()],
            analysis: Analysis::Failed { error },
            evidence: None,
            timestamp: Utc::now(),
        }
    }

    pub fn breakdown(&self) -> Option<&AnalysisBreakdown> {
        match &self.analysis {
            Analysis::Complete(breakdown) => Some(breakdown),
            Analysis::Failed { .. } => None,
        }
    }

    pub fn is_pipeline_failure(&self) -> bool {
        matches!(self.analysis, Analysis::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_failure_shape() {
        let v = FusionVerdict::pipeline_failure("req-9", "task panicked");
        assert_eq!(v.verdict, Verdict::Uncertain);
        assert_eq!(v.confidence, 0.5);
        assert_eq!(v.factors, vec!["Analysis failed due to error: task panicked"]);
        assert_eq!(v.recommendations, vec!["Please try again"]);
        assert!(v.evidence.is_none());
        assert!(v.breakdown().is_none());
        assert!(v.is_pipeline_failure());
    }

    #[test]
    fn failed_analysis_serializes_as_error_object() {
        let v = FusionVerdict::pipeline_failure("req-9", "boom");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["analysis"]["error"], "boom");
        assert_eq!(json["verdict"], "UNCERTAIN");
        assert!(json["timestamp"].as_str().is_some());
    }
}
