use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

use estimator_core::storage::{SqliteStorage, StorageEngine};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_database_path, read_config, write_config, EstimatorConfig, UserSection};
use crate::errors::CliError;
use crate::output::print_receipt;
use crate::ui::{hint, print};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let db_path = match args.path.as_deref().or(ctx.db_flag()) {
        Some(path) => PathBuf::from(path),
        None => default_database_path()?,
    };
    let config_path = match args.config_path.as_deref() {
        Some(path) => PathBuf::from(path),
        None => resolve_config_path()?,
    };

    if db_path.exists() {
        return Err(CliError::invalid_input(format!(
            "A database already exists at {}\nHint: Point --db at it to use it, or choose another path.",
            db_path.display()
        ))
        .into());
    }

    let storage = SqliteStorage::create(&db_path)?;
    let format_version = storage.format_version()?;
    storage.check_integrity()?;
    drop(storage);

    // Keep the user identity and AI settings of an existing config.
    let config = if config_path.exists() {
        let mut config = read_config(&config_path)?;
        config.database.path = db_path.to_string_lossy().to_string();
        if config.user.is_none() {
            config.user = Some(new_user(args));
        }
        config
    } else {
        EstimatorConfig::new(db_path.clone(), new_user(args))
    };
    write_config(&config_path, &config)?;

    info!(db = %db_path.display(), config = %config_path.display(), "initialized");

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context();
        let user_id = config
            .user
            .as_ref()
            .map(|user| user.id.to_string())
            .unwrap_or_default();
        print_receipt(
            &ui_ctx,
            "Estimator initialized",
            &[
                ("Database", db_path.display().to_string()),
                ("Config", config_path.display().to_string()),
                ("Format", format_version),
                ("User", user_id),
            ],
        )?;
        if ui_ctx.mode.is_pretty() {
            print(
                &ui_ctx,
                &hint(&ui_ctx, "estimator project add --name \"Kitchen remodel\" --type kitchen"),
            );
        }
    }
    Ok(())
}

fn new_user(args: &InitArgs) -> UserSection {
    UserSection {
        id: Uuid::new_v4(),
        email: args.email.clone().unwrap_or_default(),
    }
}
