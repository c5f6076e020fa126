//! Fitted classifier artifacts: a TF-IDF vectorizer and a binary model.
//!
//! Both are plain JSON files in a model directory. They are loaded once at
//! process start, validated, and shared read-only behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{Verdict, VerityError};

/// Vectorizer artifact file name inside the model directory.
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";

/// Classifier artifact file name inside the model directory.
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// Upper bound on decision-tree traversal steps, guarding against cycles.
const MAX_TREE_DEPTH: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact missing: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),

    #[error("scoring failed: {0}")]
    Scoring(String),
}

impl From<ArtifactError> for VerityError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::Missing(path) => VerityError::ModelNotLoaded(path.display().to_string()),
            ArtifactError::Io { ref path, .. } | ArtifactError::Parse { ref path, .. } => {
                VerityError::Artifact {
                    path: path.clone(),
                    reason: err.to_string(),
                }
            }
            ArtifactError::Inconsistent(_) | ArtifactError::Scoring(_) => {
                VerityError::InternalFault(err.to_string())
            }
        }
    }
}

/// Row normalisation applied after idf weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    #[default]
    L2,
    None,
}

/// Sparse feature vector, sorted by column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(c, _)| *c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, f64)> {
        self.entries.iter()
    }

    /// Number of non-zero columns.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Fitted term-weighting transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default)]
    pub stop_words: HashSet<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
}

impl TfidfVectorizer {
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if let Some((term, col)) = self.vocabulary.iter().find(|(_, c)| **c >= self.idf.len()) {
            return Err(ArtifactError::Inconsistent(format!(
                "term '{}' maps to column {} outside {} features",
                term,
                col,
                self.idf.len()
            )));
        }
        Ok(())
    }

    /// Vectorize already-cleaned text. Tokens are runs of two or more word
    /// characters; stop words and out-of-vocabulary terms are dropped.
    pub fn transform(&self, cleaned: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in cleaned.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if token.chars().count() < 2 || self.stop_words.contains(token) {
                continue;
            }
            if let Some(&col) = self.vocabulary.get(token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.idf[col])
            })
            .collect();
        entries.sort_by_key(|(col, _)| *col);

        if self.norm == Norm::L2 {
            let length = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if length > 0.0 {
                for (_, v) in entries.iter_mut() {
                    *v /= length;
                }
            }
        }
        SparseVector { entries }
    }
}

/// One node of a fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes to `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[real, fake]` of the training samples at this leaf.
    Leaf { value: [f64; 2] },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn predict_proba(&self, x: &SparseVector) -> Result<[f64; 2], ArtifactError> {
        let mut index = 0usize;
        for _ in 0..MAX_TREE_DEPTH {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if x.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total = value[0] + value[1];
                    return Ok(if total > 0.0 {
                        [value[0] / total, value[1] / total]
                    } else {
                        [0.5, 0.5]
                    });
                }
                None => {
                    return Err(ArtifactError::Scoring(format!(
                        "tree node {} out of range",
                        index
                    )))
                }
            }
        }
        Err(ArtifactError::Scoring(
            "tree traversal exceeded maximum depth".to_string(),
        ))
    }
}

/// Fitted binary classifier. Class 1 is FAKE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<DecisionTree> },
}

impl ClassifierModel {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierModel::LogisticRegression { .. } => "logistic_regression",
            ClassifierModel::RandomForest { .. } => "random_forest",
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), ArtifactError> {
        match self {
            ClassifierModel::LogisticRegression { coefficients, .. } => {
                if coefficients.len() != n_features {
                    return Err(ArtifactError::Inconsistent(format!(
                        "logistic model has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    )));
                }
            }
            ClassifierModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(ArtifactError::Inconsistent(
                        "random forest has no trees".to_string(),
                    ));
                }
                for (t, tree) in trees.iter().enumerate() {
                    if tree.nodes.is_empty() {
                        return Err(ArtifactError::Inconsistent(format!("tree {} is empty", t)));
                    }
                    for node in &tree.nodes {
                        if let TreeNode::Split {
                            feature,
                            left,
                            right,
                            ..
                        } = node
                        {
                            if *feature >= n_features
                                || *left >= tree.nodes.len()
                                || *right >= tree.nodes.len()
                            {
                                return Err(ArtifactError::Inconsistent(format!(
                                    "tree {} has a split referencing feature {} / children {},{}",
                                    t, feature, left, right
                                )));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Class probabilities `[real, fake]`.
    pub fn predict_proba(&self, x: &SparseVector) -> Result<[f64; 2], ArtifactError> {
        match self {
            ClassifierModel::LogisticRegression {
                coefficients,
                intercept,
            } => {
                let mut z = *intercept;
                for (col, value) in x.iter() {
                    let weight = coefficients.get(*col).ok_or_else(|| {
                        ArtifactError::Scoring(format!("no coefficient for column {}", col))
                    })?;
                    z += weight * value;
                }
                let fake = 1.0 / (1.0 + (-z).exp());
                Ok([1.0 - fake, fake])
            }
            ClassifierModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(ArtifactError::Scoring("empty forest".to_string()));
                }
                let mut sum = [0.0, 0.0];
                for tree in trees {
                    let p = tree.predict_proba(x)?;
                    sum[0] += p[0];
                    sum[1] += p[1];
                }
                let n = trees.len() as f64;
                Ok([sum[0] / n, sum[1] / n])
            }
        }
    }
}

/// Outcome of scoring one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub verdict: Verdict,
    /// `[real, fake]`.
    pub probabilities: [f64; 2],
    /// Maximum class probability.
    pub confidence: f64,
    /// Vocabulary terms present in the document.
    pub terms_matched: usize,
}

/// A validated vectorizer/model pair.
#[derive(Debug, Clone)]
pub struct ClassifierArtifacts {
    vectorizer: TfidfVectorizer,
    model: ClassifierModel,
}

impl ClassifierArtifacts {
    pub fn from_parts(
        vectorizer: TfidfVectorizer,
        model: ClassifierModel,
    ) -> Result<Self, ArtifactError> {
        vectorizer.validate()?;
        model.validate(vectorizer.n_features())?;
        Ok(Self { vectorizer, model })
    }

    /// Load both artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let vectorizer: TfidfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
        let model: ClassifierModel = read_json(&dir.join(CLASSIFIER_FILE))?;
        Self::from_parts(vectorizer, model)
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Score cleaned text.
    pub fn score(&self, cleaned: &str) -> Result<Prediction, ArtifactError> {
        let x = self.vectorizer.transform(cleaned);
        let probabilities = self.model.predict_proba(&x)?;
        let verdict = if probabilities[1] > probabilities[0] {
            Verdict::Fake
        } else {
            Verdict::Real
        };
        Ok(Prediction {
            verdict,
            probabilities,
            confidence: probabilities[0].max(probabilities[1]),
            terms_matched: x.nnz(),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Process-wide classifier state with explicit absence signalling.
#[derive(Debug, Clone)]
pub enum ModelState {
    Loaded(Arc<ClassifierArtifacts>),
    Absent { reason: String },
}

impl ModelState {
    /// Load artifacts from `dir`, logging the outcome. Never fails: missing
    /// or unusable artifacts produce [`ModelState::Absent`].
    pub fn load(dir: &Path) -> Self {
        match ClassifierArtifacts::load(dir) {
            Ok(artifacts) => {
                info!(
                    event = "classifier.loaded",
                    dir = %dir.display(),
                    model = artifacts.model_kind(),
                    features = artifacts.vectorizer.n_features(),
                );
                ModelState::Loaded(Arc::new(artifacts))
            }
            Err(e @ ArtifactError::Missing(_)) => {
                warn!(event = "classifier.absent", dir = %dir.display(), error = %e);
                ModelState::Absent {
                    reason: VerityError::from(e).to_string(),
                }
            }
            Err(e) => {
                error!(event = "classifier.load_failed", dir = %dir.display(), error = %e);
                ModelState::Absent {
                    reason: VerityError::from(e).to_string(),
                }
            }
        }
    }

    pub fn absent(reason: impl Into<String>) -> Self {
        ModelState::Absent {
            reason: reason.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }
}
