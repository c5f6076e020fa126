//! Generative judge adapter behaviour against stub backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use verity_core::domain::{DegradeCause, SignalStatus};
use verity_core::generative::build_prompt;
use verity_core::{BackendError, GenerativeBackend, GenerativeJudge, Verdict};

/// Records the prompt and how many times it was called.
struct RecordingBackend {
    reply: String,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<String>,
}

impl RecordingBackend {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(String::new()),
        })
    }
}

#[async_trait]
impl GenerativeBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        Ok(self.reply.clone())
    }
}

struct FailingBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl GenerativeBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::Http("connection reset".to_string()))
    }
}

struct HangingBackend;

#[async_trait]
impl GenerativeBackend for HangingBackend {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

#[tokio::test]
async fn test_prompt_carries_subject_and_title() {
    let backend = RecordingBackend::new(r#"{"verdict": "REAL", "confidence": 0.9}"#);
    let judge = GenerativeJudge::new(backend.clone());
    judge
        .judge("Parliament passed the bill on Tuesday.", Some("Bill passes"))
        .await;

    let prompt = backend.last_prompt.lock().unwrap().clone();
    assert_eq!(
        prompt,
        build_prompt("Parliament passed the bill on Tuesday.", Some("Bill passes"))
    );
}

#[tokio::test]
async fn test_single_attempt_on_failure() {
    let backend = Arc::new(FailingBackend {
        calls: AtomicUsize::new(0),
    });
    let judge = GenerativeJudge::new(backend.clone());
    let signal = judge.judge("Some body text for the judge.", None).await;

    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(signal.status.cause(), Some(DegradeCause::ServiceUnavailable));
    assert_eq!(
        signal.detail.recommendations,
        vec!["Please try again or use alternative verification methods"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_hung_service_is_bounded_by_timeout() {
    let judge =
        GenerativeJudge::new(Arc::new(HangingBackend)).with_timeout(Duration::from_secs(30));
    let started = tokio::time::Instant::now();
    let signal = judge.judge("Some body text for the judge.", None).await;

    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(signal.verdict, Verdict::Uncertain);
    assert_eq!(signal.confidence, 0.5);
    match signal.status {
        SignalStatus::Degraded { cause, message } => {
            assert_eq!(cause, DegradeCause::ServiceUnavailable);
            assert!(message.contains("timed out"), "{message}");
        }
        SignalStatus::Ok => panic!("expected timeout to degrade"),
    }
}

#[tokio::test]
async fn test_reply_wrapped_in_markdown_fence() {
    let reply = "```json\n{\"verdict\": \"FAKE\", \"confidence\": 0.93, \
                 \"linguistic_indicators\": {\"clickbait_elements\": 0.9}, \
                 \"key_factors\": [\"Anonymous insiders only\"]}\n```";
    let signal = GenerativeJudge::new(RecordingBackend::new(reply))
        .judge("Some body text for the judge.", None)
        .await;

    assert_eq!(signal.verdict, Verdict::Fake);
    assert_eq!(signal.confidence, 0.93);
    assert_eq!(signal.detail.linguistic_indicators.clickbait_elements, 0.9);
    // unspecified sub-scores take the neutral value
    assert_eq!(signal.detail.linguistic_indicators.bias_indicators, 0.5);
    assert_eq!(signal.detail.key_factors, vec!["Anonymous insiders only"]);
}

#[tokio::test]
async fn test_unknown_verdict_and_out_of_range_confidence_are_normalised() {
    let signal = GenerativeJudge::new(RecordingBackend::new(
        r#"{"verdict": "MOSTLY TRUE", "confidence": 7.5}"#,
    ))
    .judge("Some body text for the judge.", None)
    .await;

    assert_eq!(signal.verdict, Verdict::Uncertain);
    assert_eq!(signal.confidence, 1.0);
    assert!(!signal.is_degraded());
}

#[tokio::test]
async fn test_each_failure_mode_has_its_own_factor() {
    let no_json = GenerativeJudge::new(RecordingBackend::new("Cannot determine."))
        .judge("Some body text for the judge.", None)
        .await;
    let malformed = GenerativeJudge::new(RecordingBackend::new("{verdict: FAKE}"))
        .judge("Some body text for the judge.", None)
        .await;
    let service = GenerativeJudge::unconfigured()
        .judge("Some body text for the judge.", None)
        .await;

    let factors: Vec<&str> = [&no_json, &malformed, &service]
        .into_iter()
        .map(|s| s.detail.key_factors[0].as_str())
        .collect();
    assert_eq!(factors.len(), 3);
    assert_ne!(factors[0], factors[1]);
    assert_ne!(factors[1], factors[2]);
    assert_ne!(factors[0], factors[2]);
    assert_eq!(no_json.status.cause(), Some(DegradeCause::NoJsonFound));
    assert_eq!(malformed.status.cause(), Some(DegradeCause::MalformedJson));
}
