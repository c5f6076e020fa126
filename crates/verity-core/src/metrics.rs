//! Process-wide atomic counters for analysis outcomes.
//!
//! Counters are incremented silently by the engine. Call [`Metrics::flush`]
//! to emit the current values as one `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lock-free counters.
pub struct Metrics {
    analyses_completed: AtomicU64,
    judge_degraded: AtomicU64,
    classifier_degraded: AtomicU64,
    pipeline_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            analyses_completed: AtomicU64::new(0),
            judge_degraded: AtomicU64::new(0),
            classifier_degraded: AtomicU64::new(0),
            pipeline_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_analyses_completed(&self) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "analyses_completed", "counter incremented");
    }

    pub fn inc_judge_degraded(&self) {
        self.judge_degraded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judge_degraded", "counter incremented");
    }

    pub fn inc_classifier_degraded(&self) {
        self.classifier_degraded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "classifier_degraded", "counter incremented");
    }

    pub fn inc_pipeline_failures(&self) {
        self.pipeline_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "pipeline_failures", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            analyses_completed = self.analyses_completed(),
            judge_degraded = self.judge_degraded(),
            classifier_degraded = self.classifier_degraded(),
            pipeline_failures = self.pipeline_failures(),
        );
    }

    pub fn analyses_completed(&self) -> u64 {
        self.analyses_completed.load(Ordering::Relaxed)
    }

    pub fn judge_degraded(&self) -> u64 {
        self.judge_degraded.load(Ordering::Relaxed)
    }

    pub fn classifier_degraded(&self) -> u64 {
        self.classifier_degraded.load(Ordering::Relaxed)
    }

    pub fn pipeline_failures(&self) -> u64 {
        self.pipeline_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.analyses_completed.store(0, Ordering::Relaxed);
        self.judge_degraded.store(0, Ordering::Relaxed);
        self.classifier_degraded.store(0, Ordering::Relaxed);
        self.pipeline_failures.store(0, Ordering::Relaxed);
    }
}
