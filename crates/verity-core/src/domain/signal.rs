//! Per-analyzer signal results.

use serde::{Deserialize, Serialize};

/// Neutral confidence reported by every degraded analyzer.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// The three-way classification every analyzer and the engine speak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
    #[default]
    Uncertain,
}

impl Verdict {
    /// Case-insensitive parse. Anything unrecognised is `Uncertain`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "REAL" => Verdict::Real,
            "FAKE" => Verdict::Fake,
            _ => Verdict::Uncertain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
            Verdict::Uncertain => "UNCERTAIN",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Why an analyzer fell back to its canonical result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DegradeCause {
    /// Generative service unreachable, failed, timed out, or not configured.
    ServiceUnavailable,
    /// Generative service replied without any `{...}` span.
    NoJsonFound,
    /// Generative service replied with a span that is not a valid payload.
    MalformedJson,
    /// Statistical classifier artifacts were never loaded.
    ModelNotLoaded,
    /// Any other failure inside an analyzer, including panics and timeouts
    /// of local work.
    InternalFault,
}

impl DegradeCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradeCause::ServiceUnavailable => "service_unavailable",
            DegradeCause::NoJsonFound => "no_json_found",
            DegradeCause::MalformedJson => "malformed_json",
            DegradeCause::ModelNotLoaded => "model_not_loaded",
            DegradeCause::InternalFault => "internal_fault",
        }
    }
}

impl std::fmt::Display for DegradeCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an analyzer produced a real judgment or a fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SignalStatus {
    Ok,
    Degraded { cause: DegradeCause, message: String },
}

impl SignalStatus {
    pub fn degraded(cause: DegradeCause, message: impl Into<String>) -> Self {
        SignalStatus::Degraded {
            cause,
            message: message.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SignalStatus::Degraded { .. })
    }

    /// The degrade cause, if any.
    pub fn cause(&self) -> Option<DegradeCause> {
        match self {
            SignalStatus::Ok => None,
            SignalStatus::Degraded { cause, .. } => Some(*cause),
        }
    }
}

/// One analyzer's judgment about the subject.
///
/// `detail` carries the analyzer-specific payload with a fixed schema so the
/// engine can read named sub-scores directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalResult<D> {
    pub verdict: Verdict,
    /// Confidence in 0.0–1.0.
    pub confidence: f64,
    pub status: SignalStatus,
    pub detail: D,
}

impl<D> SignalResult<D> {
    /// A successful signal. Confidence is clamped into 0.0–1.0.
    pub fn ok(verdict: Verdict, confidence: f64, detail: D) -> Self {
        Self {
            verdict,
            confidence: clamp_unit(confidence),
            status: SignalStatus::Ok,
            detail,
        }
    }

    /// The canonical `{UNCERTAIN, 0.5}` fallback.
    pub fn degraded(cause: DegradeCause, message: impl Into<String>, detail: D) -> Self {
        Self {
            verdict: Verdict::Uncertain,
            confidence: NEUTRAL_CONFIDENCE,
            status: SignalStatus::degraded(cause, message),
            detail,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
    }
}

/// Clamp into 0.0–1.0, mapping NaN to the neutral value.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        NEUTRAL_CONFIDENCE
    } else {
        value.clamp(0.0, 1.0)
    }
}
