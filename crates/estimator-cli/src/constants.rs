//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (storage, generation, anything unclassified)
/// - 2: Misuse of shell command (reserved by shells and clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, database, customer, project, estimate, line item).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or a failed validation rule.
    pub const INVALID_INPUT: i32 = 4;

    /// No signed-in user for a mutating command.
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Environment variable holding the acting user's UUID.
pub const USER_ENV: &str = "ESTIMATOR_USER";

/// Environment variable holding the acting user's email.
pub const EMAIL_ENV: &str = "ESTIMATOR_EMAIL";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ESTIMATOR_CONFIG";

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "ESTIMATOR_LOG";
