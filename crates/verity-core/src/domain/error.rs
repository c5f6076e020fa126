//! Domain-level error taxonomy for Verity.
//!
//! Only [`InputRejected`] ever reaches a caller as a failure. Every other
//! variant of [`VerityError`] is recovered at an analyzer or fusion boundary
//! and turned into a degraded `UNCERTAIN` result.

use std::path::PathBuf;

/// Reasons a subject is refused at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputRejected {
    #[error("subject body is missing")]
    Empty,

    #[error("subject body has {actual} characters, minimum is {min}")]
    TooShort { actual: usize, min: usize },

    #[error("subject body has {actual} characters, maximum is {max}")]
    TooLong { actual: usize, max: usize },
}

/// Verity domain errors.
#[derive(Debug, thiserror::Error)]
pub enum VerityError {
    #[error("generative service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed generative response: {0}")]
    MalformedResponse(String),

    #[error("classifier artifacts not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("input rejected: {0}")]
    InputRejected(#[from] InputRejected),

    #[error("internal fault: {0}")]
    InternalFault(String),

    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("artifact error at {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

}

/// Result type for Verity domain operations.
pub type Result<T> = std::result::Result<T, VerityError>;
