use std::collections::HashMap;

use uuid::Uuid;

use estimator_core::service::EstimateInput;
use estimator_core::storage::{EstimateFilter, EstimateStatus};
use estimator_core::templates;

use crate::app::AppContext;
use crate::cli::{
    EstimateCreateArgs, EstimateDeleteArgs, EstimateEditArgs, EstimateListArgs, EstimateRefArgs,
};
use crate::errors::CliError;
use crate::helpers::{confirm_or_cancel, edited, non_empty, parse_choice, resolve_estimate};
use crate::output::{
    estimate_detail_json, estimate_rows, line_item_rows, print_receipt, timestamps,
    ESTIMATE_COLUMNS, LINE_ITEM_COLUMNS,
};
use crate::ui::format::wrap;
use crate::ui::{badge, blank_line, divider, header, hint, kv, money, print, table, Badge};

pub fn handle_create(ctx: &AppContext, args: &EstimateCreateArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let project = service.find_project(&args.project)?;

    let mut input = EstimateInput::new(args.name.clone());
    if let Some(status) = args.status.as_deref() {
        input = input.status(parse_choice::<EstimateStatus>(status)?);
    }
    if let Some(notes) = non_empty(args.notes.as_deref()) {
        input = input.notes(notes);
    }

    let template_key = match (&args.template, args.from_project_type) {
        (Some(key), _) => {
            if templates::find(key).is_none() {
                return Err(CliError::invalid_input(format!(
                    "Unknown template '{}'\nHint: Run `estimator templates` to list template keys.",
                    key
                ))
                .into());
            }
            Some(key.clone())
        }
        (None, true) => Some(project.project_type.as_str().to_string()),
        (None, false) => None,
    };

    let id = match &template_key {
        Some(key) => service.create_estimate_from_template(&session, &project.id, &input, key)?,
        None => service.create_estimate(&session, &project.id, &input)?,
    };

    let estimate = service.get_estimate(&id)?;
    let items = service.list_line_items(&id)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&estimate_detail_json(&estimate, &items))?
        );
    } else if !ctx.quiet() {
        let mut fields = vec![
            ("ID", estimate.id.to_string()),
            ("Project", project.project_number.clone()),
            ("Version", estimate.version.to_string()),
            ("Line items", items.len().to_string()),
        ];
        if let Some(key) = template_key {
            fields.push(("Template", key));
        }
        print_receipt(&ui_ctx, "Estimate created", &fields)?;
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &EstimateListArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;

    let mut filter = EstimateFilter::new();
    if let Some(reference) = args.project.as_deref() {
        filter = filter.project(service.find_project(reference)?.id);
    }
    if let Some(status) = args.status.as_deref() {
        filter = filter.status(parse_choice(status)?);
    }
    let estimates = service.list_estimates(&filter)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&estimates)?);
        return Ok(());
    }

    if estimates.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, "No estimates found.");
        }
        return Ok(());
    }

    let numbers: HashMap<Uuid, String> = service
        .list_projects()?
        .into_iter()
        .map(|p| (p.id, p.project_number))
        .collect();
    let rows = estimate_rows(&ui_ctx, &estimates, |e| {
        numbers.get(&e.project_id).cloned().unwrap_or_default()
    });

    if ui_ctx.mode.is_pretty() {
        println!("{}", header(&ui_ctx, "estimates", Some(&estimates.len().to_string())));
    }
    println!("{}", table(&ui_ctx, &ESTIMATE_COLUMNS, &rows));
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &EstimateRefArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let items = service.list_line_items(&estimate.id)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&estimate_detail_json(&estimate, &items))?
        );
        return Ok(());
    }

    let project = service.get_project(&estimate.project_id)?;
    let pretty = ui_ctx.mode.is_pretty();

    if pretty {
        println!(
            "{}",
            header(
                &ui_ctx,
                &format!("{} v{}", project.project_number, estimate.version),
                Some(&estimate.name),
            )
        );
    }

    let mut lines = vec![
        ("ID", estimate.id.to_string()),
        ("Project", project.project_number.clone()),
        ("Version", estimate.version.to_string()),
        ("Name", estimate.name.clone()),
        (
            "Status",
            if pretty {
                estimate.status.label().to_string()
            } else {
                estimate.status.as_str().to_string()
            },
        ),
    ];
    if let Some(notes) = &estimate.notes {
        lines.push(("Notes", notes.clone()));
    }
    lines.extend(timestamps(&ui_ctx, &estimate.created_at, &estimate.updated_at));
    for (key, value) in &lines {
        println!("{}", kv(&ui_ctx, key, value));
    }

    if !items.is_empty() {
        blank_line(&ui_ctx);
        println!(
            "{}",
            table(&ui_ctx, &LINE_ITEM_COLUMNS, &line_item_rows(&ui_ctx, &items))
        );
    } else if pretty {
        blank_line(&ui_ctx);
        println!("{}", badge(&ui_ctx, Badge::Info, "No line items yet"));
        println!(
            "{}",
            hint(&ui_ctx, "estimator item add <ESTIMATE> \"Description\" --value 0")
        );
    }

    if pretty {
        for (index, item) in items.iter().enumerate() {
            if let Some(scope) = &item.proposal_description {
                blank_line(&ui_ctx);
                println!("{}. {}", index + 1, item.description);
                for line in wrap(scope, ui_ctx.text_width()) {
                    println!("    {}", line);
                }
            }
        }
        println!("{}", divider(&ui_ctx));
    }
    println!("{}", kv(&ui_ctx, "Total", &money(estimate.total_price, pretty)));
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &EstimateEditArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;

    let status = match args.status.as_deref() {
        Some(value) => parse_choice(value)?,
        None => estimate.status,
    };
    let input = EstimateInput {
        name: args.name.clone().unwrap_or_else(|| estimate.name.clone()),
        status: Some(status),
        notes: edited(&estimate.notes, args.notes.as_deref()),
    };
    service.update_estimate(&session, &estimate.id, &input)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            "Estimate updated",
            &[
                ("ID", estimate.id.to_string()),
                ("Status", status.as_str().to_string()),
            ],
        )?;
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &EstimateDeleteArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let estimate = resolve_estimate(&service, &args.estimate)?;
    let item_count = service.list_line_items(&estimate.id)?.len();

    let prompt = format!(
        "Delete estimate '{}' (v{}) and its {} line item(s)?",
        estimate.name, estimate.version, item_count
    );
    if !confirm_or_cancel(ctx, args.force, &prompt)? {
        return Ok(());
    }

    service.delete_estimate(&session, &estimate.id)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            &format!("Deleted estimate '{}'", estimate.name),
            &[
                ("Deleted", estimate.id.to_string()),
                ("Line items", item_count.to_string()),
            ],
        )?;
    }
    Ok(())
}
