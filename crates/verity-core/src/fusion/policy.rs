//! Fixed fusion rules: verdict precedence, confidence weighting, and the
//! non-empty factor/recommendation guarantee.

use crate::domain::{clamp_unit, Verdict};

/// The judge must be strictly more confident than this to decide the verdict.
pub const JUDGE_THRESHOLD: f64 = 0.7;

/// Weight of the judge's confidence in the fused confidence.
pub const JUDGE_WEIGHT: f64 = 0.7;

/// Weight of the classifier's confidence in the fused confidence.
pub const CLASSIFIER_WEIGHT: f64 = 0.3;

pub const FALLBACK_FACTOR: &str = "No specific factors identified";

pub const FALLBACK_RECOMMENDATION: &str = "Verify with additional trusted sources";

/// First match wins: confident FAKE, then confident REAL, else UNCERTAIN.
/// The classifier never decides.
pub fn decide_verdict(judge_verdict: Verdict, judge_confidence: f64) -> Verdict {
    match judge_verdict {
        Verdict::Fake if judge_confidence > JUDGE_THRESHOLD => Verdict::Fake,
        Verdict::Real if judge_confidence > JUDGE_THRESHOLD => Verdict::Real,
        _ => Verdict::Uncertain,
    }
}

/// `0.7 * judge + 0.3 * classifier`, rounded to two decimals.
pub fn fuse_confidence(judge_confidence: f64, classifier_confidence: f64) -> f64 {
    let weighted = JUDGE_WEIGHT * clamp_unit(judge_confidence)
        + CLASSIFIER_WEIGHT * clamp_unit(classifier_confidence);
    clamp_unit(round2(weighted))
}

/// Round to two decimals on the exact binary value, so `0.745` (stored as
/// `0.74499...`) becomes `0.74`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value)
        .parse()
        .unwrap_or((value * 100.0).round() / 100.0)
}

/// Judge-provided entries, or the single fallback entry when there are none.
pub fn non_empty_or(items: &[String], fallback: &str) -> Vec<String> {
    if items.is_empty() {
        vec![fallback.to_string()]
    } else {
        items.to_vec()
    }
}
