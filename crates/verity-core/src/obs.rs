//! Structured lifecycle events for one analysis request.
//!
//! Events are emitted at `info!` (failures at `warn!`/`error!`) with an
//! `event` field so they can be filtered in JSON output. Subject text is
//! never logged, only its size.

use tracing::{error, info, warn};

use crate::domain::{DegradeCause, Verdict};

/// Request-scoped span tagged with a `uuid` v4 request id.
///
/// Async work is attached with [`tracing::Instrument`]:
///
/// ```ignore
/// let span = AnalysisSpan::new();
/// run(subject).instrument(span.span().clone()).await;
/// ```
pub struct AnalysisSpan {
    request_id: String,
    span: tracing::Span,
}

impl AnalysisSpan {
    pub fn new() -> Self {
        Self::with_id(&uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            span: tracing::info_span!("verity.analysis", request_id = %request_id),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Enter the span for synchronous work; exits when the guard drops.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Default for AnalysisSpan {
    fn default() -> Self {
        Self::new()
    }
}

pub fn emit_analysis_started(request_id: &str, text_chars: usize, source: &str) {
    info!(
        event = "analysis.started",
        request_id = %request_id,
        text_chars = text_chars,
        source = %source,
    );
}

/// An analyzer fell back to its canonical result.
pub fn emit_signal_degraded(request_id: &str, analyzer: &str, cause: DegradeCause, message: &str) {
    warn!(
        event = "analysis.signal_degraded",
        request_id = %request_id,
        analyzer = %analyzer,
        cause = %cause,
        message = %message,
    );
}

pub fn emit_analysis_finished(
    request_id: &str,
    verdict: Verdict,
    confidence: f64,
    degraded_signals: usize,
    duration_ms: u64,
) {
    info!(
        event = "analysis.finished",
        request_id = %request_id,
        verdict = %verdict,
        confidence = confidence,
        degraded_signals = degraded_signals,
        duration_ms = duration_ms,
    );
}

/// The fusion step itself failed and the pipeline-failure verdict was
/// returned.
pub fn emit_pipeline_failure(request_id: &str, error: &dyn std::fmt::Display) {
    error!(event = "analysis.pipeline_failure", request_id = %request_id, error = %error);
}
