use estimator_core::StorageEngine;

use crate::app::AppContext;
use crate::errors::CliError;
use crate::ui::{badge, hint, kv, print, Badge, OutputMode};

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let ui_ctx = ctx.ui_context();

    match service.storage().check_integrity() {
        Ok(()) => {
            if ctx.quiet() {
                return Ok(());
            }
            match ui_ctx.mode {
                OutputMode::Pretty => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "sqlite integrity"));
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "foreign keys"));
                    let path = ctx.database_path()?;
                    print(&ui_ctx, &kv(&ui_ctx, "Database", &path.display().to_string()));
                }
                OutputMode::Json => {
                    let value = serde_json::json!({
                        "status": "ok",
                        "checks": ["integrity", "foreign_keys"],
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputMode::Plain => {
                    println!("check=integrity ok");
                    println!("check=foreign_keys ok");
                    println!("status=ok");
                }
            }
            Ok(())
        }
        Err(err) => {
            if ui_ctx.mode.is_pretty() {
                print(&ui_ctx, &badge(&ui_ctx, Badge::Err, "Integrity check failed"));
                print(
                    &ui_ctx,
                    &hint(
                        &ui_ctx,
                        "Restore the database file from a backup before editing further.",
                    ),
                );
            }
            Err(CliError::IntegrityFailed(format!("Integrity check failed: {}", err)).into())
        }
    }
}
