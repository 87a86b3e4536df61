//! Plan error types

use lmclient::LmError;
use thiserror::Error;

/// Errors from plan construction and generation
#[derive(Debug, Error)]
pub enum PlanError {
    /// A structured plan record is missing its required `task` field (or is
    /// otherwise not a plan record). A malformed record is a caller or model
    /// bug, never retried.
    #[error("Malformed plan record: {0}")]
    MalformedPlan(String),

    /// The generate-and-parse cycle exhausted its retry budget without
    /// producing a parseable plan
    #[error("Plan generation failed after {attempts} attempts")]
    GenerationFailed { attempts: u32 },

    /// A precondition violation reported to the caller, never retried
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Prompt template: {0}")]
    Template(String),

    #[error("Plan serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Lm(#[from] LmError),
}

/// Errors from executing a plan tree
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The cancellation flag was raised between node resolutions
    #[error("Execution cancelled")]
    Cancelled,

    #[error("Prompt template: {0}")]
    Template(String),

    #[error(transparent)]
    Lm(#[from] LmError),
}
