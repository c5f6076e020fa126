//! Domain model shared by every analyzer and the fusion engine.
//!
//! - `AnalysisSubject`: the validated text (plus optional title) under analysis
//! - `SignalResult`: one analyzer's verdict, confidence, status, and detail
//! - `VerityError` / `InputRejected`: the error taxonomy

pub mod error;
pub mod signal;
pub mod subject;

pub use error::{InputRejected, Result, VerityError};
pub use signal::{
    clamp_unit, DegradeCause, SignalResult, SignalStatus, Verdict, NEUTRAL_CONFIDENCE,
};
pub use subject::{
    AnalysisSubject, SourceKind, SubjectLimits, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS,
};
