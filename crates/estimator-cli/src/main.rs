//! Estimator CLI - pre-construction estimating for residential projects
//!
//! Command-line front end over `estimator-core`: customers, projects,
//! versioned estimates and their line items, plus AI-drafted line items.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use estimator_core::VERSION;

use crate::app::AppContext;
use crate::cli::{
    Cli, Commands, CustomerSubcommand, EstimateSubcommand, FileSubcommand, GenerateSubcommand,
    ItemSubcommand, ProjectSubcommand,
};
use crate::commands::{
    customers, dashboard, estimates, files, generate, init, items, maintenance, misc, projects,
};
use crate::constants::LOG_ENV;
use crate::errors::exit_code_for;
use crate::ui::print_error;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let ui_ctx = ctx.ui_context();

        let error_msg = format!("{}", e);
        let (message, hint) = split_error_hint(&error_msg);

        print_error(&ui_ctx, message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

/// Log to stderr so stdout stays clean for plain and JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Split an explicit "Hint:" line off an error message, or supply a hint for
/// common failures.
fn split_error_hint(error: &str) -> (&str, Option<String>) {
    if let Some(idx) = error.find("\nHint:") {
        return (error[..idx].trim_end(), Some(error[idx + 1..].to_string()));
    }
    (error, contextual_hint(error))
}

fn contextual_hint(error: &str) -> Option<String> {
    let error_lower = error.to_lowercase();

    if error_lower.contains("not authenticated") {
        return Some(
            "Hint: Run `estimator init` to create a local user, or set ESTIMATOR_USER to a UUID."
                .to_string(),
        );
    }

    if error_lower.contains("file") && error_lower.contains("not found in estimate") {
        return Some("Hint: Run `estimator file list <ESTIMATE>` to see file IDs.".to_string());
    }

    if error_lower.contains("line item") && error_lower.contains("not found") {
        return Some(
            "Hint: Run `estimator estimate show <ESTIMATE>` to see its line items.".to_string(),
        );
    }

    if error_lower.contains("estimate") && error_lower.contains("not found") {
        return Some("Hint: Run `estimator estimate list` to find estimate IDs.".to_string());
    }

    if error_lower.contains("project") && error_lower.contains("not found") {
        return Some("Hint: Run `estimator project list` to see project numbers.".to_string());
    }

    if error_lower.contains("customer") && error_lower.contains("not found") {
        return Some("Hint: Run `estimator customer list` to find customer IDs.".to_string());
    }

    if error_lower.contains("generation failed") {
        return Some(
            "Hint: Check the [ai] section of the config and that the API key is valid.".to_string(),
        );
    }

    if error_lower.contains("format version") {
        return Some(
            "Hint: This database was created by a different Estimator version.".to_string(),
        );
    }

    None
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args),
        Some(Commands::Customer(args)) => match &args.command {
            CustomerSubcommand::Add(add_args) => customers::handle_add(ctx, add_args),
            CustomerSubcommand::List => customers::handle_list(ctx),
            CustomerSubcommand::Show(show_args) => customers::handle_show(ctx, show_args),
            CustomerSubcommand::Edit(edit_args) => customers::handle_edit(ctx, edit_args),
            CustomerSubcommand::Delete(delete_args) => customers::handle_delete(ctx, delete_args),
        },
        Some(Commands::Project(args)) => match &args.command {
            ProjectSubcommand::Add(add_args) => projects::handle_add(ctx, add_args),
            ProjectSubcommand::List => projects::handle_list(ctx),
            ProjectSubcommand::Show(show_args) => projects::handle_show(ctx, show_args),
            ProjectSubcommand::Edit(edit_args) => projects::handle_edit(ctx, edit_args),
            ProjectSubcommand::Delete(delete_args) => projects::handle_delete(ctx, delete_args),
        },
        Some(Commands::Estimate(args)) => match &args.command {
            EstimateSubcommand::Create(create_args) => estimates::handle_create(ctx, create_args),
            EstimateSubcommand::List(list_args) => estimates::handle_list(ctx, list_args),
            EstimateSubcommand::Show(show_args) => estimates::handle_show(ctx, show_args),
            EstimateSubcommand::Edit(edit_args) => estimates::handle_edit(ctx, edit_args),
            EstimateSubcommand::Delete(delete_args) => estimates::handle_delete(ctx, delete_args),
        },
        Some(Commands::Item(args)) => match &args.command {
            ItemSubcommand::Add(add_args) => items::handle_add(ctx, add_args),
            ItemSubcommand::Edit(edit_args) => items::handle_edit(ctx, edit_args),
            ItemSubcommand::Delete(delete_args) => items::handle_delete(ctx, delete_args),
            ItemSubcommand::Move(move_args) => items::handle_move(ctx, move_args),
            ItemSubcommand::Reorder(reorder_args) => items::handle_reorder(ctx, reorder_args),
        },
        Some(Commands::File(args)) => match &args.command {
            FileSubcommand::Attach(attach_args) => files::handle_attach(ctx, attach_args),
            FileSubcommand::List(list_args) => files::handle_list(ctx, list_args),
            FileSubcommand::Delete(delete_args) => files::handle_delete(ctx, delete_args),
        },
        Some(Commands::Generate(args)) => match &args.command {
            GenerateSubcommand::Draft(draft_args) => generate::handle_draft(ctx, draft_args),
            GenerateSubcommand::Scope(scope_args) => generate::handle_scope(ctx, scope_args),
        },
        Some(Commands::Templates(args)) => misc::handle_templates(ctx, args),
        Some(Commands::Dashboard) => dashboard::handle_dashboard(ctx),
        Some(Commands::Check) => maintenance::handle_check(ctx),
        Some(Commands::Completions(args)) => misc::handle_completions(args),
        None => {
            println!("Estimator v{}", VERSION);
            println!("\nQuickstart:");
            println!("  estimator init --email you@example.com");
            println!("  estimator project add --name \"Smith kitchen\" --type kitchen");
            println!("  estimator estimate create P-0001 --name \"Base bid\" --from-project-type");
            println!("  estimator item add <ESTIMATE> \"Cabinets\" --value 18500");
            println!("  estimator estimate show <ESTIMATE>");
            println!("\nRun `estimator --help` for full usage.");
            Ok(())
        }
    }
}
