//! Multi-signal fusion engine.
//!
//! Runs the four analyzers concurrently on one subject, waits for all of
//! them to finish or degrade, then applies the fixed fusion rules in
//! [`policy`]. Nothing an analyzer does can fail the call: adapter errors
//! arrive as degraded signals and a panicked analyzer task is folded into
//! an `InternalFault` signal. If fusion itself panics the caller still
//! receives [`FusionVerdict::pipeline_failure`].

pub mod policy;
pub mod verdict;

use chrono::Utc;
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

use crate::domain::{AnalysisSubject, DegradeCause, SignalStatus};
use crate::evidence::{EvidenceCollector, EvidenceSnapshot};
use crate::generative::{self, GenerativeJudge, JudgeSignal};
use crate::lexical::{LexicalAnalyzer, LexicalSignal};
use crate::metrics::METRICS;
use crate::obs::{self, AnalysisSpan};
use crate::statistical::{self, ClassifierSignal, StatisticalClassifier};

pub use policy::{
    decide_verdict, fuse_confidence, round2, CLASSIFIER_WEIGHT, FALLBACK_FACTOR,
    FALLBACK_RECOMMENDATION, JUDGE_THRESHOLD, JUDGE_WEIGHT,
};
pub use verdict::{Analysis, AnalysisBreakdown, FusionVerdict, SubjectMeta};

/// The four analyzers plus the rules that combine them. Cheap to clone;
/// shared state (classifier artifacts, backend clients) sits behind `Arc`.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    judge: GenerativeJudge,
    classifier: StatisticalClassifier,
    lexical: LexicalAnalyzer,
    evidence: EvidenceCollector,
}

impl FusionEngine {
    /// Engine with the heuristic parser and the synthetic evidence source.
    pub fn new(judge: GenerativeJudge, classifier: StatisticalClassifier) -> Self {
        Self {
            judge,
            classifier,
            lexical: LexicalAnalyzer::with_heuristic_parser(),
            evidence: EvidenceCollector::default(),
        }
    }

    pub fn with_lexical(mut self, lexical: LexicalAnalyzer) -> Self {
        self.lexical = lexical;
        self
    }

    pub fn with_evidence(mut self, evidence: EvidenceCollector) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn judge(&self) -> &GenerativeJudge {
        &self.judge
    }

    pub fn classifier(&self) -> &StatisticalClassifier {
        &self.classifier
    }

    /// Analyse one subject. Always returns a well-formed verdict.
    pub async fn fuse(&self, subject: &AnalysisSubject) -> FusionVerdict {
        let span = AnalysisSpan::new();
        let request_id = span.request_id().to_string();

        let engine = self.clone();
        let owned = subject.clone();
        guarded(span, engine.run(request_id, owned)).await
    }

    async fn run(self, request_id: String, subject: AnalysisSubject) -> FusionVerdict {
        let started = Instant::now();
        obs::emit_analysis_started(
            &request_id,
            subject.char_len(),
            &subject.source().to_string(),
        );

        let (generative, statistical, lexical, evidence) = self.gather_signals(&subject).await;
        report_degraded(&request_id, &generative, &statistical, &lexical);

        let verdict = decide_verdict(generative.verdict, generative.confidence);
        let confidence = fuse_confidence(generative.confidence, statistical.confidence);
        let factors = policy::non_empty_or(&generative.detail.key_factors, FALLBACK_FACTOR);
        let recommendations =
            policy::non_empty_or(&generative.detail.recommendations, FALLBACK_RECOMMENDATION);

        let breakdown = AnalysisBreakdown {
            generative,
            statistical,
            lexical,
            evidence: evidence.clone(),
            subject: SubjectMeta {
                text_length: subject.char_len(),
                word_count: subject.word_count(),
                source_type: subject.source(),
                url: subject.url().map(str::to_string),
            },
        };

        METRICS.inc_analyses_completed();
        obs::emit_analysis_finished(
            &request_id,
            verdict,
            confidence,
            breakdown.degraded_count(),
            started.elapsed().as_millis() as u64,
        );

        FusionVerdict {
            request_id,
            verdict,
            confidence,
            analysis: Analysis::Complete(Box::new(breakdown)),
            factors,
            recommendations,
            evidence: Some(evidence),
            timestamp: Utc::now(),
        }
    }

    /// Run all four analyzers as independent tasks and wait for every one.
    async fn gather_signals(
        &self,
        subject: &AnalysisSubject,
    ) -> (JudgeSignal, ClassifierSignal, LexicalSignal, EvidenceSnapshot) {
        let text = subject.body().to_string();
        let title = subject.title().map(str::to_string);

        let judge_task = {
            let judge = self.judge.clone();
            let (text, title) = (text.clone(), title.clone());
            tokio::spawn(async move { judge.judge(&text, title.as_deref()).await })
        };
        let evidence_task = {
            let evidence = self.evidence.clone();
            let (text, title) = (text.clone(), title.clone());
            tokio::spawn(async move { evidence.collect(&text, title.as_deref()).await })
        };
        let classifier_task = {
            let classifier = self.classifier.clone();
            let text = text.clone();
            tokio::task::spawn_blocking(move || classifier.classify(&text))
        };
        let lexical_task = {
            let lexical = self.lexical.clone();
            tokio::task::spawn_blocking(move || lexical.analyze(&text))
        };

        let (judged, classified, analysed, gathered) =
            tokio::join!(judge_task, classifier_task, lexical_task, evidence_task);

        (
            judged.unwrap_or_else(|e| generative::fault_signal(format!("judge task failed: {e}"))),
            classified.unwrap_or_else(|e| {
                statistical::fault_signal(format!("classifier task failed: {e}"))
            }),
            analysed.unwrap_or_else(|e| {
                LexicalSignal::degraded(
                    DegradeCause::InternalFault,
                    format!("lexical task failed: {e}"),
                )
            }),
            gathered.unwrap_or_else(|e| {
                EvidenceSnapshot::unavailable(format!("evidence task failed: {e}"))
            }),
        )
    }
}

/// Run `pipeline` as its own task. A panic or cancellation becomes the
/// UNCERTAIN pipeline-failure verdict instead of reaching the caller.
pub(crate) async fn guarded<F>(span: AnalysisSpan, pipeline: F) -> FusionVerdict
where
    F: Future<Output = FusionVerdict> + Send + 'static,
{
    let task = tokio::spawn(pipeline.instrument(span.span().clone()));
    match task.await {
        Ok(verdict) => verdict,
        Err(e) => {
            let _guard = span.enter();
            let request_id = span.request_id().to_string();
            METRICS.inc_pipeline_failures();
            obs::emit_pipeline_failure(&request_id, &e);
            FusionVerdict::pipeline_failure(request_id, e.to_string())
        }
    }
}

fn report_degraded(
    request_id: &str,
    generative: &JudgeSignal,
    statistical: &ClassifierSignal,
    lexical: &LexicalSignal,
) {
    if let SignalStatus::Degraded { cause, message } = &generative.status {
        METRICS.inc_judge_degraded();
        obs::emit_signal_degraded(request_id, "generative", *cause, message);
    }
    if let SignalStatus::Degraded { cause, message } = &statistical.status {
        METRICS.inc_classifier_degraded();
        obs::emit_signal_degraded(request_id, "statistical", *cause, message);
    }
    if let SignalStatus::Degraded { cause, message } = &lexical.status {
        obs::emit_signal_degraded(request_id, "lexical", *cause, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Verdict;

    fn offline_engine() -> FusionEngine {
        FusionEngine::new(
            GenerativeJudge::unconfigured(),
            StatisticalClassifier::unavailable("not trained"),
        )
    }

    #[tokio::test]
    async fn fully_offline_engine_still_answers() {
        let subject = AnalysisSubject::new("The council approved the new budget on Monday.", None)
            .unwrap();
        let v = offline_engine().fuse(&subject).await;

        assert_eq!(v.verdict, Verdict::Uncertain);
        assert_eq!(v.confidence, 0.5);
        assert_eq!(v.factors, vec!["Analysis unavailable due to API error"]);
        assert!(!v.recommendations.is_empty());

        let breakdown = v.breakdown().unwrap();
        assert_eq!(
            breakdown.generative.status.cause(),
            Some(DegradeCause::ServiceUnavailable)
        );
        assert_eq!(
            breakdown.statistical.status.cause(),
            Some(DegradeCause::ModelNotLoaded)
        );
        assert!(!breakdown.lexical.status.is_degraded());
        assert_eq!(breakdown.subject.word_count, 8);
        assert_eq!(breakdown.degraded_count(), 2);
        assert!(v.evidence.as_ref().is_some_and(|e| e.is_available()));
    }

    async fn exploding_pipeline() -> FusionVerdict {
        panic!("fusion bug")
    }

    #[tokio::test]
    async fn panicking_pipeline_becomes_failure_verdict() {
        let before = METRICS.pipeline_failures();
        let span = AnalysisSpan::with_id("req-panic");
        let v = guarded(span, exploding_pipeline()).await;

        assert!(v.is_pipeline_failure());
        assert_eq!(v.request_id, "req-panic");
        assert_eq!(v.verdict, Verdict::Uncertain);
        assert_eq!(v.confidence, 0.5);
        assert!(v.factors[0].starts_with("Analysis failed due to error:"));
        assert_eq!(v.recommendations, vec![verdict::PIPELINE_FAILURE_RECOMMENDATION]);
        assert!(METRICS.pipeline_failures() > before);
    }

    #[tokio::test]
    async fn guarded_pipeline_passes_verdict_through() {
        let subject = AnalysisSubject::new("The council approved the new budget on Monday.", None)
            .unwrap();
        let span = AnalysisSpan::with_id("req-ok");
        let v = guarded(span, offline_engine().run("req-ok".to_string(), subject)).await;

        assert!(!v.is_pipeline_failure());
        assert_eq!(v.request_id, "req-ok");
        assert!(v.breakdown().is_some());
    }

    #[tokio::test]
    async fn each_call_gets_its_own_request_id() {
        let subject = AnalysisSubject::new("Some sufficiently long body text.", None).unwrap();
        let engine = offline_engine();
        let a = engine.fuse(&subject).await;
        let b = engine.fuse(&subject).await;
        assert_ne!(a.request_id, b.request_id);
    }
}
