use estimator_core::service::BulkMode;

use crate::app::AppContext;
use crate::cli::{GenerateDraftArgs, GenerateScopeArgs};
use crate::helpers::{confirm_or_cancel, parse_choice, resolve_estimate, resolve_line_item};
use crate::output::print_receipt;
use crate::ui::format::wrap;
use crate::ui::{money, print, Spinner};

pub fn handle_draft(ctx: &AppContext, args: &GenerateDraftArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    session.require_actor()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let mode: BulkMode = parse_choice(&args.mode)?;

    if mode == BulkMode::Replace {
        let existing = service.list_line_items(&estimate.id)?.len();
        if existing > 0 {
            let prompt = format!(
                "Replace the {} existing line item(s) of '{}'?",
                existing, estimate.name
            );
            if !confirm_or_cancel(ctx, args.force, &prompt)? {
                return Ok(());
            }
        }
    }

    let generator = ctx.generator()?;
    let base_url = ctx.file_base_url()?;
    let ui_ctx = ctx.ui_context();

    let spinner = Spinner::new(&ui_ctx, "Drafting line items");
    spinner.start();
    let result = if args.with_files {
        service.generate_draft_with_attachments(
            &session,
            &estimate.id,
            &generator,
            &args.description,
            &args.file_urls,
            base_url.as_deref(),
            mode,
        )
    } else {
        service.generate_draft(
            &session,
            &estimate.id,
            &generator,
            &args.description,
            &args.file_urls,
            mode,
        )
    };
    spinner.clear();
    let inserted = result?;

    if !ctx.quiet() {
        let estimate = service.get_estimate(&estimate.id)?;
        print_receipt(
            &ui_ctx,
            "Draft line items added",
            &[
                ("ID", estimate.id.to_string()),
                ("Mode", mode.as_str().to_string()),
                ("Inserted", inserted.to_string()),
                (
                    "Estimate total",
                    money(estimate.total_price, ui_ctx.mode.is_pretty()),
                ),
            ],
        )?;
    }
    Ok(())
}

pub fn handle_scope(ctx: &AppContext, args: &GenerateScopeArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    session.require_actor()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let item = resolve_line_item(&service, &estimate.id, &args.item)?;

    let generator = ctx.generator()?;
    let ui_ctx = ctx.ui_context();

    let spinner = Spinner::new(&ui_ctx, "Writing scope");
    spinner.start();
    let result = service.generate_scope_for_line_item(
        &session,
        &estimate.id,
        &item.id,
        &generator,
        args.dictation.as_deref(),
    );
    spinner.clear();
    let scope = result?;

    if ctx.quiet() {
        return Ok(());
    }
    if ui_ctx.mode.is_json() {
        let value = serde_json::json!({
            "status": "ok",
            "line_item_id": item.id,
            "proposal_description": scope,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if ui_ctx.mode.is_pretty() {
        print_receipt(&ui_ctx, "Scope stored", &[("ID", item.id.to_string())])?;
        for line in wrap(&scope, ui_ctx.text_width()) {
            print(&ui_ctx, &format!("    {}", line));
        }
    } else {
        print_receipt(
            &ui_ctx,
            "Scope stored",
            &[
                ("ID", item.id.to_string()),
                ("Proposal description", scope.replace('\n', "\\n")),
            ],
        )?;
    }
    Ok(())
}
