//! JSON and plain-text shapes shared by several commands.

use serde_json::{json, Value};

use estimator_core::service::totals::line_items_total;
use estimator_core::storage::{Estimate, LineItem, Project};

use crate::ui::{
    format_datetime, money, receipt, short_id, single_line, truncate, Column, UiContext,
};

/// Print the result of a mutation: a receipt, or in JSON mode an object of
/// the same fields plus `"status": "ok"`.
pub fn print_receipt(ctx: &UiContext, title: &str, items: &[(&str, String)]) -> anyhow::Result<()> {
    if ctx.mode.is_json() {
        let mut object = serde_json::Map::new();
        object.insert("status".to_string(), json!("ok"));
        for (key, value) in items {
            object.insert(key.to_lowercase().replace(' ', "_"), json!(value));
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
    } else {
        println!("{}", receipt(ctx, title, items));
    }
    Ok(())
}

/// An estimate with its ordered line items.
pub fn estimate_detail_json(estimate: &Estimate, items: &[LineItem]) -> Value {
    json!({
        "estimate": estimate,
        "line_items": items,
        "line_item_count": items.len(),
        "line_items_total": line_items_total(items),
    })
}

/// A project with its estimates.
pub fn project_detail_json(project: &Project, estimates: &[Estimate]) -> Value {
    json!({
        "project": project,
        "estimates": estimates,
    })
}

pub const ESTIMATE_COLUMNS: [Column; 6] = [
    Column::new("ID"),
    Column::new("Project"),
    Column::new("Ver"),
    Column::new("Name"),
    Column::new("Status"),
    Column::numeric("Total"),
];

/// Table rows for an estimate list. `project_label` maps a project id to a label.
pub fn estimate_rows(
    ctx: &UiContext,
    estimates: &[Estimate],
    project_label: impl Fn(&Estimate) -> String,
) -> Vec<Vec<String>> {
    let pretty = ctx.mode.is_pretty();
    estimates
        .iter()
        .map(|e| {
            vec![
                if pretty {
                    short_id(&e.id)
                } else {
                    e.id.to_string()
                },
                project_label(e),
                e.version.to_string(),
                if pretty {
                    truncate(&e.name, 40)
                } else {
                    single_line(&e.name)
                },
                if pretty {
                    e.status.label().to_string()
                } else {
                    e.status.as_str().to_string()
                },
                money(e.total_price, pretty),
            ]
        })
        .collect()
}

pub const LINE_ITEM_COLUMNS: [Column; 4] = [
    Column::new("#"),
    Column::new("ID"),
    Column::new("Description"),
    Column::numeric("Total"),
];

pub fn line_item_rows(ctx: &UiContext, items: &[LineItem]) -> Vec<Vec<String>> {
    let pretty = ctx.mode.is_pretty();
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            vec![
                (index + 1).to_string(),
                if pretty {
                    short_id(&item.id)
                } else {
                    item.id.to_string()
                },
                if pretty {
                    truncate(&item.description, 48)
                } else {
                    single_line(&item.description)
                },
                money(item.total_price, pretty),
            ]
        })
        .collect()
}

/// Created/updated timestamps as key-value pairs.
pub fn timestamps(
    ctx: &UiContext,
    created: &chrono::DateTime<chrono::Utc>,
    updated: &chrono::DateTime<chrono::Utc>,
) -> [(&'static str, String); 2] {
    let pretty = ctx.mode.is_pretty();
    [
        ("Created", format_datetime(created, pretty)),
        ("Updated", format_datetime(updated, pretty)),
    ]
}
