//! CLI error types for structured error handling.
//!
//! Handlers return `anyhow::Result`; `main` looks for a [`CliError`] or a core
//! [`EstimatorError`] in the chain to pick the exit code.

use std::fmt;

use estimator_core::EstimatorError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, database, record)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),

    /// Database integrity check failed
    IntegrityFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::IntegrityFailed(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
        }
    }
}

/// Exit code for a core error.
pub fn core_exit_code(err: &EstimatorError) -> i32 {
    match err {
        EstimatorError::NotFound(_) => exit_codes::NOT_FOUND,
        EstimatorError::Validation(_) | EstimatorError::InvalidInput(_) => {
            exit_codes::INVALID_INPUT
        }
        EstimatorError::Auth => exit_codes::AUTH_FAILED,
        EstimatorError::Persistence(_) | EstimatorError::UpstreamGeneration(_) => 1,
    }
}

/// Exit code for any error returned by a handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return cli_err.exit_code();
        }
        if let Some(core_err) = cause.downcast_ref::<EstimatorError>() {
            return core_exit_code(core_err);
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_exit_codes() {
        assert_eq!(CliError::not_found("x", "y").exit_code(), 3);
        assert_eq!(CliError::invalid_input("x").exit_code(), 4);
        assert_eq!(CliError::IntegrityFailed("x".into()).exit_code(), 6);
    }

    #[test]
    fn test_core_errors_map_through_anyhow() {
        let err: anyhow::Error = EstimatorError::NotFound("Estimate x not found".into()).into();
        assert_eq!(exit_code_for(&err), exit_codes::NOT_FOUND);

        let err: anyhow::Error = EstimatorError::Validation("Description is required".into()).into();
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);

        let err: anyhow::Error = EstimatorError::Auth.into();
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_FAILED);

        let err: anyhow::Error = EstimatorError::Persistence("disk".into()).into();
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_context_keeps_core_exit_code() {
        let err = anyhow::Error::new(EstimatorError::NotFound("Project P-0009 not found".into()))
            .context("Failed to load project");
        assert_eq!(exit_code_for(&err), exit_codes::NOT_FOUND);
    }

    #[test]
    fn test_plain_anyhow_is_general_failure() {
        let err = anyhow::anyhow!("something odd");
        assert_eq!(exit_code_for(&err), 1);
    }
}
