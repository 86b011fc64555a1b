use clap::CommandFactory;
use clap_complete::generate;

use estimator_core::templates::{self, TEMPLATES};

use crate::app::AppContext;
use crate::cli::{Cli, CompletionsArgs, TemplatesArgs};
use crate::errors::CliError;
use crate::ui::{header, kv, print, table, Column};

pub fn handle_templates(ctx: &AppContext, args: &TemplatesArgs) -> anyhow::Result<()> {
    let ui_ctx = ctx.ui_context();

    if let Some(key) = args.key.as_deref() {
        let template = templates::find(key).ok_or_else(|| {
            CliError::not_found(
                format!("Template '{}' not found", key),
                "Hint: Run `estimator templates` to list template keys.",
            )
        })?;

        if ui_ctx.mode.is_json() {
            let value = serde_json::json!({
                "key": template.key,
                "label": template.label,
                "items": template.items,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        print(&ui_ctx, &header(&ui_ctx, "template", Some(template.label)));
        print(&ui_ctx, &kv(&ui_ctx, "Key", template.key));
        for (index, item) in template.items.iter().enumerate() {
            print(&ui_ctx, &format!("{:>3}. {}", index + 1, item));
        }
        return Ok(());
    }

    if ui_ctx.mode.is_json() {
        let value: Vec<_> = TEMPLATES
            .iter()
            .map(|t| {
                serde_json::json!({
                    "key": t.key,
                    "label": t.label,
                    "item_count": t.items.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = TEMPLATES
        .iter()
        .map(|t| {
            vec![
                t.key.to_string(),
                t.label.to_string(),
                t.items.len().to_string(),
            ]
        })
        .collect();
    if ui_ctx.mode.is_pretty() {
        println!("{}", header(&ui_ctx, "templates", None));
    }
    println!(
        "{}",
        table(
            &ui_ctx,
            &[
                Column::new("Key"),
                Column::new("Label"),
                Column::numeric("Items"),
            ],
            &rows,
        )
    );
    Ok(())
}

pub fn handle_completions(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "estimator", &mut std::io::stdout());
    Ok(())
}
