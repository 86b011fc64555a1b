use estimator_core::service::files::storage_path_for;
use estimator_core::service::FileInput;

use crate::app::AppContext;
use crate::cli::{FileAttachArgs, FileDeleteArgs, FileListArgs};
use crate::errors::CliError;
use crate::helpers::{confirm_or_cancel, non_empty, resolve_estimate, resolve_file};
use crate::output::print_receipt;
use crate::ui::{format_datetime, header, print, short_id, table, Column};

/// Human-readable byte count.
fn file_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    let bytes = bytes.max(0) as f64;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / (KB * KB))
    }
}

pub fn handle_attach(ctx: &AppContext, args: &FileAttachArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;

    let metadata = std::fs::metadata(&args.file).map_err(|e| {
        CliError::not_found(
            format!("Cannot read {}: {}", args.file.display(), e),
            "Hint: Pass the path of a local photo or drawing.",
        )
    })?;
    if !metadata.is_file() {
        return Err(
            CliError::invalid_input(format!("{} is not a file", args.file.display())).into(),
        );
    }
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let storage_path = non_empty(args.storage_path.as_deref())
        .unwrap_or_else(|| storage_path_for(&estimate.project_id, &estimate.id, &file_name));
    let mime_type = non_empty(args.mime_type.as_deref()).or_else(|| {
        mime_guess::from_path(&args.file)
            .first_raw()
            .map(str::to_string)
    });

    let mut input = FileInput::new(storage_path, file_name, metadata.len() as i64);
    if let Some(mime_type) = mime_type {
        input = input.mime_type(mime_type);
    }
    let id = service.attach_estimate_file(&session, &estimate.id, &input)?;

    if !ctx.quiet() {
        let file = service.get_estimate_file(&estimate.id, &id)?;
        let ui_ctx = ctx.ui_context();
        if ui_ctx.mode.is_json() {
            println!("{}", serde_json::to_string_pretty(&file)?);
        } else {
            print_receipt(
                &ui_ctx,
                &format!("Attached '{}'", file.file_name),
                &[
                    ("ID", file.id.to_string()),
                    ("Storage path", file.storage_path),
                    ("Type", file.mime_type),
                    ("Size", file.file_size.to_string()),
                ],
            )?;
        }
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &FileListArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let files = service.list_estimate_files(&estimate.id)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }
    if files.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, "No files attached.");
        }
        return Ok(());
    }

    let pretty = ui_ctx.mode.is_pretty();
    let rows: Vec<Vec<String>> = files
        .iter()
        .map(|f| {
            vec![
                if pretty {
                    short_id(&f.id)
                } else {
                    f.id.to_string()
                },
                f.file_name.clone(),
                f.mime_type.clone(),
                if pretty {
                    file_size(f.file_size)
                } else {
                    f.file_size.to_string()
                },
                format_datetime(&f.created_at, pretty),
                f.storage_path.clone(),
            ]
        })
        .collect();

    if pretty {
        println!("{}", header(&ui_ctx, "files", Some(&estimate.name)));
    }
    println!(
        "{}",
        table(
            &ui_ctx,
            &[
                Column::new("ID"),
                Column::new("Name"),
                Column::new("Type"),
                Column::numeric("Size"),
                Column::new("Uploaded"),
                Column::new("Path"),
            ],
            &rows,
        )
    );
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &FileDeleteArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let file = resolve_file(&service, &estimate.id, &args.file)?;

    let prompt = format!("Remove attachment '{}'?", file.file_name);
    if !confirm_or_cancel(ctx, args.force, &prompt)? {
        return Ok(());
    }

    let removed = service.delete_estimate_file(&session, &estimate.id, &file.id)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            &format!("Removed '{}'", removed.file_name),
            &[
                ("Deleted", removed.id.to_string()),
                ("Storage path", removed.storage_path),
            ],
        )?;
    }
    Ok(())
}
