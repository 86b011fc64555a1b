//! Application context for the Estimator CLI.
//!
//! Bundles CLI arguments with the lazily-loaded config file and resolves the
//! pieces every handler needs: the service, the acting user and the UI mode.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use estimator_core::generation::OpenAiGenerator;
use estimator_core::storage::{SqliteStorage, StorageEngine};
use estimator_core::{Actor, EstimateService, Session};

use crate::cli::Cli;
use crate::config::{read_config, AiSection, EstimatorConfig};
use crate::constants::{EMAIL_ENV, USER_ENV};
use crate::errors::CliError;
use crate::ui::{OutputFlags, UiContext};

use super::resolver::{missing_database_message, resolve_config_path, resolve_database_path};

pub type Service = EstimateService<SqliteStorage>;

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<EstimatorConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The `--db` / ESTIMATOR_DB value, if given.
    pub fn db_flag(&self) -> Option<&str> {
        self.cli.db.as_deref().filter(|path| !path.trim().is_empty())
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&EstimatorConfig>> {
        let config = self.config.get_or_try_init(|| -> anyhow::Result<_> {
            let path = resolve_config_path()?;
            if !path.exists() {
                debug!(path = %path.display(), "no config file");
                return Ok(None);
            }
            read_config(&path).map(Some)
        })?;
        Ok(config.as_ref())
    }

    /// Resolve the database path from flags or config.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        let config_path = resolve_config_path()?;
        resolve_database_path(self.cli, self.config()?, &config_path)
    }

    /// Open the database and wrap it in a service.
    pub fn open_service(&self) -> anyhow::Result<Service> {
        let path = self.database_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                missing_database_message(&path),
                "Hint: Run `estimator init` to create it.",
            )
            .into());
        }
        debug!(path = %path.display(), "opening database");
        let storage = SqliteStorage::open(&path)?;
        Ok(EstimateService::new(storage))
    }

    /// Resolve the acting user: ESTIMATOR_USER first, then the config `[user]`.
    ///
    /// Returns an anonymous session when neither is set; mutating commands
    /// then fail with the auth error.
    pub fn session(&self) -> anyhow::Result<Session> {
        if let Ok(value) = std::env::var(USER_ENV) {
            if !value.trim().is_empty() {
                let id = Uuid::parse_str(value.trim()).map_err(|_| {
                    CliError::invalid_input(format!("{} is not a valid UUID: {}", USER_ENV, value))
                })?;
                let email = std::env::var(EMAIL_ENV).unwrap_or_default();
                return Ok(Session::authenticated(Actor::new(id, email)));
            }
        }

        if let Some(user) = self.config()?.and_then(|config| config.user.as_ref()) {
            return Ok(Session::authenticated(Actor::new(user.id, user.email.clone())));
        }

        Ok(Session::anonymous())
    }

    /// Build the AI generator from the `[ai]` config section.
    pub fn generator(&self) -> anyhow::Result<OpenAiGenerator> {
        let default_ai = AiSection::default();
        let ai = self
            .config()?
            .map(|config| &config.ai)
            .unwrap_or(&default_ai);
        Ok(OpenAiGenerator::new(ai.generator_config()?)?)
    }

    /// The `[files] base_url` setting, if configured.
    pub fn file_base_url(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .config()?
            .and_then(|config| config.files.base_url.clone())
            .filter(|url| !url.trim().is_empty()))
    }

    /// Build a UI context from the global output flags.
    pub fn ui_context(&self) -> UiContext {
        UiContext::from_flags(OutputFlags {
            json: self.cli.json,
            format: self.cli.format.as_deref(),
            no_color: self.cli.no_color,
            ascii: self.cli.ascii,
        })
    }
}
