//! Error types for Estimator core operations.
//!
//! Every service operation returns [`Result`]. Messages are written to be shown
//! to the end user as-is; the CLI layer only adds exit codes and hints.

use thiserror::Error;

/// Result type alias for Estimator operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Core error type for Estimator operations.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// No authenticated actor is available for a mutating operation
    #[error("Not authenticated")]
    Auth,

    /// A required field is missing or a rule was violated
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying store operation failed
    #[error("Storage error: {0}")]
    Persistence(String),

    /// The AI generation service failed or returned malformed output
    #[error("Generation failed: {0}")]
    UpstreamGeneration(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for EstimatorError {
    fn from(err: rusqlite::Error) -> Self {
        EstimatorError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for EstimatorError {
    fn from(err: std::io::Error) -> Self {
        EstimatorError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for EstimatorError {
    fn from(err: serde_json::Error) -> Self {
        EstimatorError::UpstreamGeneration(err.to_string())
    }
}

impl From<reqwest::Error> for EstimatorError {
    fn from(err: reqwest::Error) -> Self {
        EstimatorError::UpstreamGeneration(err.to_string())
    }
}
