//! Best-effort recovery of the structured judgment from free-form output.

use serde::{Deserialize, Serialize};

use crate::domain::{clamp_unit, DegradeCause, Verdict, VerityError};

/// Why the judge could not produce a judgment. Each variant maps to the same
/// canonical fallback but keeps its own diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeFailure {
    #[error("generative service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("no JSON object found in generative response")]
    NoJsonFound,

    #[error("malformed JSON in generative response: {0}")]
    MalformedJson(String),
}

impl JudgeFailure {
    pub fn cause(&self) -> DegradeCause {
        match self {
            JudgeFailure::ServiceUnavailable(_) => DegradeCause::ServiceUnavailable,
            JudgeFailure::NoJsonFound => DegradeCause::NoJsonFound,
            JudgeFailure::MalformedJson(_) => DegradeCause::MalformedJson,
        }
    }

    /// Factor text naming the failure mode.
    pub fn fallback_factor(&self) -> &'static str {
        match self {
            JudgeFailure::ServiceUnavailable(_) => "Analysis unavailable due to API error",
            JudgeFailure::NoJsonFound => {
                "Analysis completed but no JSON object was found in the response"
            }
            JudgeFailure::MalformedJson(_) => {
                "Analysis completed but the response JSON was malformed"
            }
        }
    }

    pub fn fallback_recommendation(&self) -> &'static str {
        match self {
            JudgeFailure::ServiceUnavailable(_) => {
                "Please try again or use alternative verification methods"
            }
            JudgeFailure::NoJsonFound | JudgeFailure::MalformedJson(_) => {
                "Please verify with additional sources"
            }
        }
    }
}

impl From<JudgeFailure> for VerityError {
    fn from(failure: JudgeFailure) -> Self {
        match failure {
            JudgeFailure::ServiceUnavailable(msg) => VerityError::ServiceUnavailable(msg),
            other => VerityError::MalformedResponse(other.to_string()),
        }
    }
}

/// Locate the substring from the first `{` to the last `}` inclusive.
pub fn extract_json_span(raw: &str) -> Result<&str, JudgeFailure> {
    let start = raw.find('{').ok_or(JudgeFailure::NoJsonFound)?;
    let end = raw.rfind('}').ok_or(JudgeFailure::NoJsonFound)?;
    if end < start {
        return Err(JudgeFailure::NoJsonFound);
    }
    Ok(&raw[start..=end])
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FactualIndicators {
    pub claims_verifiable: bool,
    pub specific_dates: bool,
    pub named_sources: bool,
    pub quotes_attributed: bool,
}

/// Scores in 0.0–1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinguisticIndicators {
    pub emotional_language: f64,
    pub exaggeration: f64,
    pub bias_indicators: f64,
    pub clickbait_elements: f64,
}

impl Default for LinguisticIndicators {
    fn default() -> Self {
        Self {
            emotional_language: 0.5,
            exaggeration: 0.5,
            bias_indicators: 0.5,
            clickbait_elements: 0.5,
        }
    }
}

impl LinguisticIndicators {
    fn clamped(self) -> Self {
        Self {
            emotional_language: clamp_unit(self.emotional_language),
            exaggeration: clamp_unit(self.exaggeration),
            bias_indicators: clamp_unit(self.bias_indicators),
            clickbait_elements: clamp_unit(self.clickbait_elements),
        }
    }
}

/// Scores in 0.0–1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceIndicators {
    pub authority_claims: f64,
    pub conspiracy_theory_language: f64,
    pub unverified_claims: f64,
}

impl Default for SourceIndicators {
    fn default() -> Self {
        Self {
            authority_claims: 0.5,
            conspiracy_theory_language: 0.5,
            unverified_claims: 0.5,
        }
    }
}

impl SourceIndicators {
    fn clamped(self) -> Self {
        Self {
            authority_claims: clamp_unit(self.authority_claims),
            conspiracy_theory_language: clamp_unit(self.conspiracy_theory_language),
            unverified_claims: clamp_unit(self.unverified_claims),
        }
    }
}

/// The judgment payload as the service is asked to emit it. Missing fields
/// take the canonical neutral defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct RawJudgement {
    pub verdict: String,
    pub confidence: f64,
    pub factual_indicators: FactualIndicators,
    pub linguistic_indicators: LinguisticIndicators,
    pub source_indicators: SourceIndicators,
    pub key_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for RawJudgement {
    fn default() -> Self {
        Self {
            verdict: Verdict::Uncertain.as_str().to_string(),
            confidence: 0.5,
            factual_indicators: FactualIndicators::default(),
            linguistic_indicators: LinguisticIndicators::default(),
            source_indicators: SourceIndicators::default(),
            key_factors: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// A normalised judgment: known verdict, values clamped, blank list
/// entries removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub verdict: Verdict,
    pub confidence: f64,
    pub factual_indicators: FactualIndicators,
    pub linguistic_indicators: LinguisticIndicators,
    pub source_indicators: SourceIndicators,
    pub key_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extract and parse the judgment from raw service output.
pub fn parse_judgement(raw: &str) -> Result<Judgement, JudgeFailure> {
    let span = extract_json_span(raw)?;
    let parsed: RawJudgement =
        serde_json::from_str(span).map_err(|e| JudgeFailure::MalformedJson(e.to_string()))?;
    Ok(Judgement {
        verdict: Verdict::parse_lenient(&parsed.verdict),
        confidence: clamp_unit(parsed.confidence),
        factual_indicators: parsed.factual_indicators,
        linguistic_indicators: parsed.linguistic_indicators.clamped(),
        source_indicators: parsed.source_indicators.clamped(),
        key_factors: non_blank(parsed.key_factors),
        recommendations: non_blank(parsed.recommendations),
    })
}
