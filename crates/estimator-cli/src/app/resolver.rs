//! Path resolution for config and database files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, EstimatorConfig};
use crate::constants::CONFIG_ENV;

/// Resolve the config file path, checking ESTIMATOR_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the database path from `--db` / ESTIMATOR_DB, then config.
pub fn resolve_database_path(
    cli: &Cli,
    config: Option<&EstimatorConfig>,
    config_path: &Path,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.db.as_deref() {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    match config {
        Some(config) => Ok(PathBuf::from(&config.database.path)),
        None => Err(anyhow::anyhow!(missing_config_message(config_path))),
    }
}

/// Error message when the database file is missing.
pub fn missing_database_message(path: &Path) -> String {
    format!(
        "No database found at {}\n\nRun:\n  estimator init\n\nOr specify a database path:\n  ESTIMATOR_DB=/path/to/estimator.db estimator init",
        path.display()
    )
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No config found at {}\n\nRun:\n  estimator init\n\nOr specify a database path:\n  estimator --db /path/to/estimator.db <command>",
        config_path.display()
    )
}
