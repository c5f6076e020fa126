//! Generative judge adapter.
//!
//! Sends one prompt to a generative text service, recovers a structured
//! judgment from the reply, and degrades to the canonical
//! `{UNCERTAIN, 0.5}` result on any of three independent failures:
//! service error (including timeout), no `{...}` span, or a span that does
//! not parse. The failure kind stays visible in the result's status and
//! fallback factor text.

pub mod extract;
pub mod gemini;
pub mod prompt;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{DegradeCause, SignalResult, VerityError};

pub use extract::{
    extract_json_span, parse_judgement, FactualIndicators, JudgeFailure, Judgement,
    LinguisticIndicators, SourceIndicators,
};
pub use gemini::{BackendError, GeminiClient, GeminiConfig, GenerativeBackend};
pub use prompt::build_prompt;

/// Default bound on a single judge call.
pub const DEFAULT_JUDGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Judge-specific detail with a fixed schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeDetail {
    pub factual_indicators: FactualIndicators,
    pub linguistic_indicators: LinguisticIndicators,
    pub source_indicators: SourceIndicators,
    pub key_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

impl JudgeDetail {
    /// Canonical fallback detail: booleans false, scores 0.5, and a single
    /// factor/recommendation naming the failure.
    pub fn fallback(failure: &JudgeFailure) -> Self {
        Self {
            factual_indicators: FactualIndicators::default(),
            linguistic_indicators: LinguisticIndicators::default(),
            source_indicators: SourceIndicators::default(),
            key_factors: vec![failure.fallback_factor().to_string()],
            recommendations: vec![failure.fallback_recommendation().to_string()],
        }
    }
}

pub type JudgeSignal = SignalResult<JudgeDetail>;

impl From<Judgement> for JudgeSignal {
    fn from(j: Judgement) -> Self {
        SignalResult::ok(
            j.verdict,
            j.confidence,
            JudgeDetail {
                factual_indicators: j.factual_indicators,
                linguistic_indicators: j.linguistic_indicators,
                source_indicators: j.source_indicators,
                key_factors: j.key_factors,
                recommendations: j.recommendations,
            },
        )
    }
}

/// Build the degraded signal for a failure.
pub fn fallback_signal(failure: &JudgeFailure) -> JudgeSignal {
    SignalResult::degraded(
        failure.cause(),
        VerityError::from(failure.clone()).to_string(),
        JudgeDetail::fallback(failure),
    )
}

/// Degraded signal for a failure outside the judge's own error handling,
/// such as a panicked task.
pub fn fault_signal(message: impl Into<String>) -> JudgeSignal {
    SignalResult::degraded(
        DegradeCause::InternalFault,
        message,
        JudgeDetail {
            factual_indicators: FactualIndicators::default(),
            linguistic_indicators: LinguisticIndicators::default(),
            source_indicators: SourceIndicators::default(),
            key_factors: vec!["Analysis unavailable due to an internal error".to_string()],
            recommendations: vec![
                "Please try again or use alternative verification methods".to_string(),
            ],
        },
    )
}

/// Adapter around an optional [`GenerativeBackend`]. Without a backend
/// (no credential) every call degrades as `ServiceUnavailable`.
#[derive(Clone)]
pub struct GenerativeJudge {
    backend: Option<Arc<dyn GenerativeBackend>>,
    timeout: Duration,
}

impl std::fmt::Debug for GenerativeJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeJudge")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenerativeJudge {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend: Some(backend),
            timeout: DEFAULT_JUDGE_TIMEOUT,
        }
    }

    /// A judge with no backend configured.
    pub fn unconfigured() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_JUDGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Judge a subject. Never fails.
    pub async fn judge(&self, text: &str, title: Option<&str>) -> JudgeSignal {
        match self.try_judge(text, title).await {
            Ok(judgement) => {
                debug!(
                    event = "judge.completed",
                    verdict = %judgement.verdict,
                    confidence = judgement.confidence,
                );
                judgement.into()
            }
            Err(failure) => {
                warn!(event = "judge.degraded", cause = %failure.cause(), error = %failure);
                fallback_signal(&failure)
            }
        }
    }

    async fn try_judge(&self, text: &str, title: Option<&str>) -> Result<Judgement, JudgeFailure> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            JudgeFailure::ServiceUnavailable(
                "no generative service credential configured".to_string(),
            )
        })?;

        let prompt = build_prompt(text, title);
        let raw = tokio::time::timeout(self.timeout, backend.complete(&prompt))
            .await
            .map_err(|_| {
                JudgeFailure::ServiceUnavailable(format!(
                    "{} timed out after {} ms",
                    backend.name(),
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| JudgeFailure::ServiceUnavailable(e.to_string()))?;

        parse_judgement(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignalStatus, Verdict};
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl GenerativeBackend for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    struct Hung;

    #[async_trait]
    impl GenerativeBackend for Hung {
        fn name(&self) -> &str {
            "hung"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn unconfigured_judge_is_service_unavailable() {
        let signal = GenerativeJudge::unconfigured().judge("some text", None).await;
        assert_eq!(signal.verdict, Verdict::Uncertain);
        assert_eq!(signal.confidence, 0.5);
        assert_eq!(signal.status.cause(), Some(DegradeCause::ServiceUnavailable));
        assert_eq!(
            signal.detail.key_factors,
            vec!["Analysis unavailable due to API error"]
        );
    }

    #[tokio::test]
    async fn degraded_message_uses_domain_error_text() {
        let signal = GenerativeJudge::new(Arc::new(Canned("no structure at all")))
            .judge("some text", None)
            .await;
        match signal.status {
            SignalStatus::Degraded { message, .. } => {
                assert!(message.starts_with("malformed generative response:"), "{message}");
                assert!(message.contains("no JSON object found"), "{message}");
            }
            SignalStatus::Ok => panic!("expected a degraded signal"),
        }

        let signal = GenerativeJudge::unconfigured().judge("some text", None).await;
        assert_eq!(
            signal.status,
            SignalStatus::Degraded {
                cause: DegradeCause::ServiceUnavailable,
                message: "generative service unavailable: no generative service credential configured"
                    .to_string(),
            }
        );
    }

    #[tokio::test]
    async fn well_formed_reply_is_used() {
        let judge = GenerativeJudge::new(Arc::new(Canned(
            r#"{"verdict":"REAL","confidence":0.88,"key_factors":["Named sources"],"recommendations":["Read the report"]}"#,
        )));
        let signal = judge.judge("some text", Some("title")).await;
        assert_eq!(signal.verdict, Verdict::Real);
        assert_eq!(signal.confidence, 0.88);
        assert!(!signal.is_degraded());
        assert_eq!(signal.detail.key_factors, vec!["Named sources"]);
    }

    #[tokio::test]
    async fn fallback_indicators_are_canonical() {
        let judge = GenerativeJudge::new(Arc::new(Canned("no structure at all")));
        let signal = judge.judge("some text", None).await;
        assert_eq!(signal.status.cause(), Some(DegradeCause::NoJsonFound));
        assert!(!signal.detail.factual_indicators.claims_verifiable);
        assert_eq!(signal.detail.linguistic_indicators.exaggeration, 0.5);
        assert_eq!(signal.detail.source_indicators.unverified_claims, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_backend_times_out() {
        let judge = GenerativeJudge::new(Arc::new(Hung)).with_timeout(Duration::from_secs(5));
        let signal = judge.judge("some text", None).await;
        assert_eq!(signal.status.cause(), Some(DegradeCause::ServiceUnavailable));
        match &signal.status {
            crate::domain::SignalStatus::Degraded { message, .. } => {
                assert!(message.contains("timed out"))
            }
            other => panic!("expected degraded, got {other:?}"),
        }
    }
}
