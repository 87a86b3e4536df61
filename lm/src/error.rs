//! LM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LM operations
#[derive(Debug, Error)]
pub enum LmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LmError {
    /// Check if this error is retryable
    ///
    /// Transient transport faults are retryable; malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LmError::RateLimited { .. } => true,
            LmError::ApiError { status, .. } => *status >= 500,
            LmError::Network(_) => true,
            LmError::EmptyResponse => true,
            LmError::InvalidResponse(_) => false,
            LmError::Json(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
