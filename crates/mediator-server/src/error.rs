// crates/mediator-server/src/error.rs
// Standardized error types for Mediator

use thiserror::Error;

/// Main error type for the Mediator library
#[derive(Error, Debug)]
pub enum MediatorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("provider {0} is temporarily unavailable (circuit open)")]
    CircuitOpen(String),

    #[error("unknown error: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using MediatorError
pub type Result<T> = std::result::Result<T, MediatorError>;

impl MediatorError {
    /// Whether the failure was caused by the provider being slow or down,
    /// as opposed to a bad request
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MediatorError::Timeout(_) | MediatorError::CircuitOpen(_) | MediatorError::Http(_)
        )
    }
}

impl From<String> for MediatorError {
    fn from(s: String) -> Self {
        MediatorError::Other(s)
    }
}

impl From<MediatorError> for String {
    fn from(err: MediatorError) -> Self {
        err.to_string()
    }
}
