//! Statistical classifier adapter.
//!
//! Wraps the fitted vectorizer/model pair behind the uniform signal
//! contract. Missing artifacts are a first-class degraded mode
//! (`ModelNotLoaded`), distinct from a scoring failure (`InternalFault`).

pub mod artifacts;
pub mod preprocess;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::{DegradeCause, SignalResult};

pub use artifacts::{
    ArtifactError, ClassifierArtifacts, ClassifierModel, DecisionTree, ModelState, Norm,
    Prediction, TfidfVectorizer, TreeNode, CLASSIFIER_FILE, VECTORIZER_FILE,
};
pub use preprocess::clean_text;

/// Classifier-specific detail carried in the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierDetail {
    /// Model family, or `"unavailable"` when artifacts are absent.
    pub model: String,
    /// `[real, fake]` when a prediction was made.
    pub probabilities: Option<[f64; 2]>,
    pub terms_matched: usize,
}

impl ClassifierDetail {
    fn unavailable() -> Self {
        Self {
            model: "unavailable".to_string(),
            probabilities: None,
            terms_matched: 0,
        }
    }
}

pub type ClassifierSignal = SignalResult<ClassifierDetail>;

/// Degraded signal for a failure outside the adapter, such as a panicked
/// task.
pub fn fault_signal(message: impl Into<String>) -> ClassifierSignal {
    SignalResult::degraded(
        DegradeCause::InternalFault,
        message,
        ClassifierDetail::unavailable(),
    )
}

/// Adapter around the process-wide [`ModelState`]. Cheap to clone; the
/// artifacts are shared without locking.
#[derive(Debug, Clone)]
pub struct StatisticalClassifier {
    state: ModelState,
}

impl StatisticalClassifier {
    pub fn new(state: ModelState) -> Self {
        Self { state }
    }

    /// Load artifacts from `dir`; absence is not an error.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(ModelState::load(dir))
    }

    /// An adapter with no artifacts, always degraded.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(ModelState::absent(reason))
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Classify `text`. Never fails.
    pub fn classify(&self, text: &str) -> ClassifierSignal {
        let artifacts = match &self.state {
            ModelState::Loaded(artifacts) => artifacts,
            ModelState::Absent { reason } => {
                debug!(event = "classifier.skipped", reason = %reason);
                return SignalResult::degraded(
                    DegradeCause::ModelNotLoaded,
                    format!("Models not available: {}", reason),
                    ClassifierDetail::unavailable(),
                );
            }
        };

        let cleaned = clean_text(text);
        match artifacts.score(&cleaned) {
            Ok(prediction) => SignalResult::ok(
                prediction.verdict,
                prediction.confidence,
                ClassifierDetail {
                    model: artifacts.model_kind().to_string(),
                    probabilities: Some(prediction.probabilities),
                    terms_matched: prediction.terms_matched,
                },
            ),
            Err(e) => {
                warn!(event = "classifier.degraded", error = %e);
                SignalResult::degraded(
                    DegradeCause::InternalFault,
                    e.to_string(),
                    ClassifierDetail {
                        model: artifacts.model_kind().to_string(),
                        probabilities: None,
                        terms_matched: 0,
                    },
                )
            }
        }
    }
}
