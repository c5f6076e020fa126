//! Verity Core Library
//!
//! Classifies a piece of text as REAL, FAKE, or UNCERTAIN by running four
//! independent analyzers and fusing their signals into one verdict.

pub mod config;
pub mod domain;
pub mod evidence;
pub mod fusion;
pub mod generative;
pub mod lexical;
pub mod metrics;
pub mod obs;
pub mod statistical;
pub mod telemetry;

pub use config::VerityConfig;

pub use domain::{
    AnalysisSubject, DegradeCause, InputRejected, Result, SignalResult, SignalStatus, SourceKind,
    SubjectLimits, Verdict, VerityError,
};

pub use evidence::{
    gather_evidence, EvidenceCollector, EvidenceData, EvidenceSnapshot, EvidenceSource,
    SyntheticEvidence,
};

pub use fusion::{Analysis, AnalysisBreakdown, FusionEngine, FusionVerdict, SubjectMeta};

pub use generative::{
    BackendError, GeminiClient, GeminiConfig, GenerativeBackend, GenerativeJudge, JudgeDetail,
    JudgeFailure, JudgeSignal,
};

pub use lexical::{analyze_linguistics, LexicalAnalyzer, LexicalReport, LexicalSignal};

pub use statistical::{ClassifierDetail, ClassifierSignal, ModelState, StatisticalClassifier};

pub use metrics::METRICS;
pub use obs::{
    emit_analysis_finished, emit_analysis_started, emit_pipeline_failure, emit_signal_degraded,
    AnalysisSpan,
};
pub use telemetry::init_tracing;

/// Verity version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
