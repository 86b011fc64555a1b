use std::collections::HashMap;

use uuid::Uuid;

use estimator_core::storage::{EstimateFilter, Project, ProjectFields};

use crate::app::{AppContext, Service};
use crate::cli::{
    ProjectAddArgs, ProjectDeleteArgs, ProjectEditArgs, ProjectFieldArgs, ProjectRefArgs,
};
use crate::helpers::{confirm_or_cancel, edited, non_empty, parse_choice, resolve_customer};
use crate::output::{
    estimate_rows, print_receipt, project_detail_json, timestamps, ESTIMATE_COLUMNS,
};
use crate::ui::{blank_line, header, kv, money, print, table, truncate, Column};

/// Resolve `--customer`: a reference links, an empty string unlinks.
fn customer_link(service: &Service, reference: &str) -> anyhow::Result<Option<Uuid>> {
    if reference.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(resolve_customer(service, reference)?.id))
}

fn apply_field_args(
    service: &Service,
    mut fields: ProjectFields,
    args: &ProjectFieldArgs,
) -> anyhow::Result<ProjectFields> {
    if let Some(value) = args.project_type.as_deref() {
        fields.project_type = parse_choice(value)?;
    }
    if let Some(value) = args.status.as_deref() {
        fields.status = parse_choice(value)?;
    }
    if let Some(reference) = args.customer.as_deref() {
        fields.customer_id = customer_link(service, reference)?;
    }
    fields.description = edited(&fields.description, args.description.as_deref());
    fields.address = edited(&fields.address, args.address.as_deref());
    fields.city = edited(&fields.city, args.city.as_deref());
    fields.state = edited(&fields.state, args.state.as_deref());
    fields.zip = edited(&fields.zip, args.zip.as_deref());
    fields.notes = edited(&fields.notes, args.notes.as_deref());
    if args.estimated_value.is_some() {
        fields.estimated_value = args.estimated_value;
    }
    if args.contract_value.is_some() {
        fields.contract_value = args.contract_value;
    }
    Ok(fields)
}

fn current_fields(project: &Project) -> ProjectFields {
    ProjectFields {
        name: project.name.clone(),
        customer_id: project.customer_id,
        status: project.status,
        project_type: project.project_type,
        description: project.description.clone(),
        address: project.address.clone(),
        city: project.city.clone(),
        state: project.state.clone(),
        zip: project.zip.clone(),
        estimated_value: project.estimated_value,
        contract_value: project.contract_value,
        notes: project.notes.clone(),
    }
}

/// True when `--description` is the only field being edited.
fn description_only(args: &ProjectEditArgs) -> bool {
    let f = &args.fields;
    args.name.is_none()
        && f.description.is_some()
        && f.project_type.is_none()
        && f.status.is_none()
        && f.customer.is_none()
        && f.address.is_none()
        && f.city.is_none()
        && f.state.is_none()
        && f.zip.is_none()
        && f.estimated_value.is_none()
        && f.contract_value.is_none()
        && f.notes.is_none()
}

pub fn handle_add(ctx: &AppContext, args: &ProjectAddArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;

    let base = ProjectFields {
        name: args.name.clone(),
        ..Default::default()
    };
    let fields = apply_field_args(&service, base, &args.fields)?;
    let id = service.create_project(&session, &fields)?;
    let project = service.get_project(&id)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else if !ctx.quiet() {
        print_receipt(
            &ui_ctx,
            "Project added",
            &[
                ("ID", project.id.to_string()),
                ("Number", project.project_number.clone()),
                ("Name", project.name.clone()),
                ("Type", project.project_type.as_str().to_string()),
            ],
        )?;
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let projects = service.list_projects()?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, "No projects found.");
        }
        return Ok(());
    }

    let customer_names: HashMap<Uuid, String> = service
        .list_customers()?
        .into_iter()
        .map(|c| (c.id, c.full_name()))
        .collect();

    let pretty = ui_ctx.mode.is_pretty();
    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| {
            vec![
                p.project_number.clone(),
                if pretty {
                    truncate(&p.name, 36)
                } else {
                    p.name.clone()
                },
                if pretty {
                    p.project_type.label().to_string()
                } else {
                    p.project_type.as_str().to_string()
                },
                if pretty {
                    p.status.label().to_string()
                } else {
                    p.status.as_str().to_string()
                },
                p.customer_id
                    .and_then(|id| customer_names.get(&id).cloned())
                    .unwrap_or_default(),
                p.estimated_value
                    .map(|value| money(value, pretty))
                    .unwrap_or_default(),
            ]
        })
        .collect();

    if pretty {
        println!("{}", header(&ui_ctx, "projects", Some(&projects.len().to_string())));
    }
    println!(
        "{}",
        table(
            &ui_ctx,
            &[
                Column::new("Number"),
                Column::new("Name"),
                Column::new("Type"),
                Column::new("Status"),
                Column::new("Customer"),
                Column::numeric("Est. Value"),
            ],
            &rows,
        )
    );
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ProjectRefArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let project = service.find_project(&args.project)?;
    let estimates = service.list_estimates(&EstimateFilter::new().project(project.id))?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&project_detail_json(&project, &estimates))?
        );
        return Ok(());
    }

    let pretty = ui_ctx.mode.is_pretty();
    if pretty {
        println!("{}", header(&ui_ctx, &project.project_number, Some(&project.name)));
    }

    let mut lines = vec![
        ("ID", project.id.to_string()),
        ("Number", project.project_number.clone()),
        ("Name", project.name.clone()),
        ("Type", project.project_type.as_str().to_string()),
        ("Status", project.status.as_str().to_string()),
    ];
    if let Some(customer_id) = project.customer_id {
        let label = service
            .get_customer(&customer_id)
            .map(|c| c.full_name())
            .unwrap_or_else(|_| customer_id.to_string());
        lines.push(("Customer", label));
    }
    if let Some(address) = project.full_address() {
        lines.push(("Address", address));
    }
    if let Some(value) = project.estimated_value {
        lines.push(("Estimated value", money(value, pretty)));
    }
    if let Some(value) = project.contract_value {
        lines.push(("Contract value", money(value, pretty)));
    }
    if let Some(description) = &project.description {
        lines.push(("Description", description.clone()));
    }
    if let Some(notes) = &project.notes {
        lines.push(("Notes", notes.clone()));
    }
    lines.extend(timestamps(&ui_ctx, &project.created_at, &project.updated_at));

    for (key, value) in &lines {
        println!("{}", kv(&ui_ctx, key, value));
    }

    if !estimates.is_empty() {
        blank_line(&ui_ctx);
        let rows = estimate_rows(&ui_ctx, &estimates, |_| project.project_number.clone());
        println!("{}", table(&ui_ctx, &ESTIMATE_COLUMNS, &rows));
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &ProjectEditArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let project = service.find_project(&args.project)?;

    if description_only(args) {
        let description = non_empty(args.fields.description.as_deref()).unwrap_or_default();
        service.update_project_description(&session, &project.id, &description)?;
    } else {
        let mut fields = current_fields(&project);
        if let Some(name) = &args.name {
            fields.name = name.clone();
        }
        let fields = apply_field_args(&service, fields, &args.fields)?;
        service.update_project(&session, &project.id, &fields)?;
    }

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            "Project updated",
            &[
                ("ID", project.id.to_string()),
                ("Number", project.project_number.clone()),
            ],
        )?;
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &ProjectDeleteArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let project = service.find_project(&args.project)?;

    let estimate_count = service
        .list_estimates(&EstimateFilter::new().project(project.id))?
        .len();
    let prompt = format!(
        "Delete project {} '{}' and its {} estimate(s)?",
        project.project_number, project.name, estimate_count
    );
    if !confirm_or_cancel(ctx, args.force, &prompt)? {
        return Ok(());
    }

    service.delete_project(&session, &project.id)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            &format!("Deleted project {}", project.project_number),
            &[
                ("Deleted", project.id.to_string()),
                ("Estimates", estimate_count.to_string()),
            ],
        )?;
    }
    Ok(())
}
