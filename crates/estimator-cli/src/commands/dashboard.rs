use crate::app::AppContext;
use crate::ui::{header, kv, money};

pub fn handle_dashboard(ctx: &AppContext) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let counts = service.dashboard()?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    let pretty = ui_ctx.mode.is_pretty();
    if pretty {
        println!("{}", header(&ui_ctx, "dashboard", None));
    }
    let lines = [
        ("Active projects", counts.active_projects.to_string()),
        ("Open estimates", counts.open_estimates.to_string()),
        ("Open estimate value", money(counts.open_estimate_value, pretty)),
        ("Customers", counts.customers.to_string()),
    ];
    for (key, value) in lines {
        println!("{}", kv(&ui_ctx, key, &value));
    }
    Ok(())
}
