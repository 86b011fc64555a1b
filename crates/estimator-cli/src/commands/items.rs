use uuid::Uuid;

use estimator_core::service::{LineItemInput, MoveDirection};
use estimator_core::storage::SortUpdate;

use crate::app::{AppContext, Service};
use crate::cli::{
    Direction, ItemAddArgs, ItemDeleteArgs, ItemEditArgs, ItemMoveArgs, ItemReorderArgs,
};
use crate::errors::CliError;
use crate::helpers::{confirm_or_cancel, edited, resolve_estimate, resolve_line_item};
use crate::output::print_receipt;
use crate::ui::money;

/// Current estimate total as a receipt field.
fn total_field(
    ctx: &AppContext,
    service: &Service,
    estimate_id: &Uuid,
) -> anyhow::Result<(&'static str, String)> {
    let estimate = service.get_estimate(estimate_id)?;
    Ok((
        "Estimate total",
        money(estimate.total_price, ctx.ui_context().mode.is_pretty()),
    ))
}

pub fn handle_add(ctx: &AppContext, args: &ItemAddArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;

    let mut input = LineItemInput::new(args.description.clone(), args.value);
    if let Some(proposal) = &args.proposal {
        input = input.proposal(proposal.clone());
    }
    let id = service.add_line_item(&session, &estimate.id, &input)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context();
        if ui_ctx.mode.is_json() {
            let item = service.get_line_item(&estimate.id, &id)?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        } else {
            print_receipt(
                &ui_ctx,
                "Line item added",
                &[
                    ("ID", id.to_string()),
                    ("Value", money(args.value, ui_ctx.mode.is_pretty())),
                    total_field(ctx, &service, &estimate.id)?,
                ],
            )?;
        }
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &ItemEditArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let item = resolve_line_item(&service, &estimate.id, &args.item)?;

    if args.description.is_none() && args.value.is_none() && args.proposal.is_none() {
        return Err(CliError::invalid_input(
            "Nothing to change; pass --description, --value or --proposal",
        )
        .into());
    }

    let input = LineItemInput {
        description: args
            .description
            .clone()
            .unwrap_or_else(|| item.description.clone()),
        proposal_description: edited(&item.proposal_description, args.proposal.as_deref()),
        value: args.value.unwrap_or(item.total_price),
    };
    service.update_line_item(&session, &item.id, &estimate.id, &input)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            "Line item updated",
            &[
                ("ID", item.id.to_string()),
                total_field(ctx, &service, &estimate.id)?,
            ],
        )?;
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &ItemDeleteArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let item = resolve_line_item(&service, &estimate.id, &args.item)?;

    let prompt = format!("Delete line item '{}'?", item.description);
    if !confirm_or_cancel(ctx, args.force, &prompt)? {
        return Ok(());
    }

    service.delete_line_item(&session, &item.id, &estimate.id)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            &format!("Deleted line item '{}'", item.description),
            &[
                ("Deleted", item.id.to_string()),
                total_field(ctx, &service, &estimate.id)?,
            ],
        )?;
    }
    Ok(())
}

pub fn handle_move(ctx: &AppContext, args: &ItemMoveArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let item = resolve_line_item(&service, &estimate.id, &args.item)?;

    let direction = match args.direction {
        Direction::Up => MoveDirection::Up,
        Direction::Down => MoveDirection::Down,
    };
    let moved = service.move_line_item(&session, &estimate.id, &item.id, direction)?;

    if !ctx.quiet() {
        let position = service
            .list_line_items(&estimate.id)?
            .iter()
            .position(|i| i.id == item.id)
            .map(|index| index + 1)
            .unwrap_or_default();
        let title = if moved {
            "Line item moved"
        } else {
            "Line item already at the edge"
        };
        print_receipt(
            &ctx.ui_context(),
            title,
            &[
                ("ID", item.id.to_string()),
                ("Moved", moved.to_string()),
                ("Position", position.to_string()),
            ],
        )?;
    }
    Ok(())
}

pub fn handle_reorder(ctx: &AppContext, args: &ItemReorderArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;

    let mut updates = Vec::with_capacity(args.items.len());
    for (index, reference) in args.items.iter().enumerate() {
        let item = resolve_line_item(&service, &estimate.id, reference)?;
        updates.push(SortUpdate {
            id: item.id,
            sort_order: index as i64,
        });
    }

    service.reorder_line_items(&session, &estimate.id, &updates)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            "Line items reordered",
            &[("Updated", updates.len().to_string())],
        )?;
    }
    Ok(())
}
