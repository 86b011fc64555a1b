use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use estimator_core::VERSION;

/// Estimator - pre-construction estimating for residential projects
#[derive(Parser)]
#[command(name = "estimator")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the estimator database
    #[arg(long, global = true, env = "ESTIMATOR_DB")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format override (pretty or plain)
    #[arg(long, global = true, value_parser = ["pretty", "plain"])]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols and borders only
    #[arg(long, global = true)]
    pub ascii: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and write the config file
    Init(InitArgs),

    /// Manage customers
    Customer(CustomerArgs),

    /// Manage projects
    Project(ProjectArgs),

    /// Manage estimates
    Estimate(EstimateArgs),

    /// Manage estimate line items
    Item(ItemArgs),

    /// Manage photos and drawings attached to an estimate
    File(FileArgs),

    /// Draft line items or scope text with the AI service
    Generate(GenerateArgs),

    /// List built-in line item templates
    Templates(TemplatesArgs),

    /// Show active project and open estimate counts
    Dashboard,

    /// Check database integrity
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the database will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Email recorded for the local user
    #[arg(long)]
    pub email: Option<String>,

    /// Config path override
    #[arg(long)]
    pub config_path: Option<String>,
}

#[derive(Args)]
pub struct CustomerArgs {
    #[command(subcommand)]
    pub command: CustomerSubcommand,
}

#[derive(Subcommand)]
pub enum CustomerSubcommand {
    /// Add a customer
    Add(CustomerAddArgs),
    /// List customers
    List,
    /// Show a customer
    Show(CustomerRefArgs),
    /// Edit a customer
    Edit(CustomerEditArgs),
    /// Delete a customer
    Delete(CustomerDeleteArgs),
}

/// Optional contact fields shared by `customer add` and `customer edit`.
///
/// Passing an empty string on edit clears the field.
#[derive(Args, Default)]
pub struct ContactArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct CustomerAddArgs {
    /// First name
    #[arg(long)]
    pub first: String,

    /// Last name
    #[arg(long)]
    pub last: String,

    #[command(flatten)]
    pub contact: ContactArgs,
}

#[derive(Args)]
pub struct CustomerRefArgs {
    /// Customer ID (or unique prefix)
    #[arg(value_name = "CUSTOMER")]
    pub customer: String,
}

#[derive(Args)]
pub struct CustomerEditArgs {
    /// Customer ID (or unique prefix)
    #[arg(value_name = "CUSTOMER")]
    pub customer: String,

    #[arg(long)]
    pub first: Option<String>,

    #[arg(long)]
    pub last: Option<String>,

    #[command(flatten)]
    pub contact: ContactArgs,
}

#[derive(Args)]
pub struct CustomerDeleteArgs {
    /// Customer ID (or unique prefix)
    #[arg(value_name = "CUSTOMER")]
    pub customer: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Add a project
    Add(ProjectAddArgs),
    /// List projects
    List,
    /// Show a project and its estimates
    Show(ProjectRefArgs),
    /// Edit a project
    Edit(ProjectEditArgs),
    /// Delete a project with its estimates
    Delete(ProjectDeleteArgs),
}

/// Optional project fields shared by `project add` and `project edit`.
#[derive(Args, Default)]
pub struct ProjectFieldArgs {
    /// Project type (remodel, addition, kitchen, bathroom, new_construction, other)
    #[arg(long = "type", value_name = "TYPE")]
    pub project_type: Option<String>,

    /// Pipeline status (lead, estimating, proposal_sent, contracted, in_progress, completed, cancelled)
    #[arg(long)]
    pub status: Option<String>,

    /// Customer ID (or unique prefix); empty string unlinks on edit
    #[arg(long)]
    pub customer: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub estimated_value: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub contract_value: Option<f64>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    #[arg(long)]
    pub name: String,

    #[command(flatten)]
    pub fields: ProjectFieldArgs,
}

#[derive(Args)]
pub struct ProjectRefArgs {
    /// Project ID or number (e.g. P-0001)
    #[arg(value_name = "PROJECT")]
    pub project: String,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    /// Project ID or number (e.g. P-0001)
    #[arg(value_name = "PROJECT")]
    pub project: String,

    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub fields: ProjectFieldArgs,
}

#[derive(Args)]
pub struct ProjectDeleteArgs {
    /// Project ID or number (e.g. P-0001)
    #[arg(value_name = "PROJECT")]
    pub project: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct EstimateArgs {
    #[command(subcommand)]
    pub command: EstimateSubcommand,
}

#[derive(Subcommand)]
pub enum EstimateSubcommand {
    /// Create the next estimate version for a project
    Create(EstimateCreateArgs),
    /// List estimates
    List(EstimateListArgs),
    /// Show an estimate with its line items
    Show(EstimateRefArgs),
    /// Edit an estimate's name, status or notes
    Edit(EstimateEditArgs),
    /// Delete an estimate and its line items
    Delete(EstimateDeleteArgs),
}

#[derive(Args)]
pub struct EstimateCreateArgs {
    /// Project ID or number (e.g. P-0001)
    #[arg(value_name = "PROJECT")]
    pub project: String,

    /// Estimate name
    #[arg(long)]
    pub name: String,

    /// Status (draft, review, approved, superseded)
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Seed line items from a template (see `estimator templates`)
    #[arg(long, conflicts_with = "from_project_type")]
    pub template: Option<String>,

    /// Seed line items from the template matching the project type
    #[arg(long)]
    pub from_project_type: bool,
}

#[derive(Args)]
pub struct EstimateListArgs {
    /// Only estimates for this project
    #[arg(long)]
    pub project: Option<String>,

    /// Only estimates with this status
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct EstimateRefArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,
}

#[derive(Args)]
pub struct EstimateEditArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    /// Notes; empty string clears them
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct EstimateDeleteArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Append a line item to an estimate
    Add(ItemAddArgs),
    /// Overwrite a line item's description, value or proposal text
    Edit(ItemEditArgs),
    /// Delete a line item
    Delete(ItemDeleteArgs),
    /// Swap a line item with its neighbour
    Move(ItemMoveArgs),
    /// Set the order of line items explicitly
    Reorder(ItemReorderArgs),
}

#[derive(Args)]
pub struct ItemAddArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Line item description
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Lump-sum value in dollars
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub value: f64,

    /// Client-facing scope text
    #[arg(long)]
    pub proposal: Option<String>,
}

#[derive(Args)]
pub struct ItemEditArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Line item ID (or unique prefix within the estimate)
    #[arg(value_name = "ITEM")]
    pub item: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Client-facing scope text; empty string clears it
    #[arg(long)]
    pub proposal: Option<String>,
}

#[derive(Args)]
pub struct ItemDeleteArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Line item ID (or unique prefix within the estimate)
    #[arg(value_name = "ITEM")]
    pub item: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Args)]
pub struct ItemMoveArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Line item ID (or unique prefix within the estimate)
    #[arg(value_name = "ITEM")]
    pub item: String,

    #[arg(value_enum, value_name = "DIRECTION")]
    pub direction: Direction,
}

#[derive(Args)]
pub struct ItemReorderArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Line item IDs in their new order
    #[arg(value_name = "ITEM", required = true)]
    pub items: Vec<String>,
}

#[derive(Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileSubcommand,
}

#[derive(Subcommand)]
pub enum FileSubcommand {
    /// Record a photo or drawing against an estimate
    Attach(FileAttachArgs),
    /// List an estimate's attachments
    List(FileListArgs),
    /// Remove an attachment record
    Delete(FileDeleteArgs),
}

#[derive(Args)]
pub struct FileAttachArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Local file to record; its name, size and type are read from disk
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Key or URL where the file is stored (default: project/estimate/<random>.<ext>)
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Content type override
    #[arg(long)]
    pub mime_type: Option<String>,
}

#[derive(Args)]
pub struct FileListArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,
}

#[derive(Args)]
pub struct FileDeleteArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// File ID (or unique prefix within the estimate)
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub command: GenerateSubcommand,
}

#[derive(Subcommand)]
pub enum GenerateSubcommand {
    /// Draft line items from a project description
    Draft(GenerateDraftArgs),
    /// Write proposal scope text for one line item
    Scope(GenerateScopeArgs),
}

#[derive(Args)]
pub struct GenerateDraftArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Free-text description of the work
    #[arg(long)]
    pub description: String,

    /// Plan or photo URL to include (repeatable)
    #[arg(long = "file-url", value_name = "URL")]
    pub file_urls: Vec<String>,

    /// Also send the estimate's attached files
    #[arg(long)]
    pub with_files: bool,

    /// replace existing items or append to them
    #[arg(long, default_value = "replace")]
    pub mode: String,

    /// Skip confirmation when replacing existing items
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct GenerateScopeArgs {
    /// Estimate ID (or unique prefix)
    #[arg(value_name = "ESTIMATE")]
    pub estimate: String,

    /// Line item ID (or unique prefix within the estimate)
    #[arg(value_name = "ITEM")]
    pub item: String,

    /// Dictated notes to base the scope on
    #[arg(long)]
    pub dictation: Option<String>,
}

#[derive(Args)]
pub struct TemplatesArgs {
    /// Show the items of one template
    #[arg(value_name = "KEY")]
    pub key: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
