use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "quismon-iac")]
#[command(version)]
#[command(about = "Declarative management of Quismon checks, alerts and channels", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Declared configuration file
    #[arg(long, global = true, default_value = "quismon.toml", env = "QUISMON_CONFIG")]
    pub config: String,

    /// State file
    #[arg(long, global = true, default_value = "terraform.tfstate", env = "QUISMON_STATE")]
    pub state: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check the configuration against every schema without contacting the API
    Validate,

    /// Show what apply would change
    Plan(PlanArgs),

    /// Make the remote objects match the configuration
    Apply(ApplyArgs),

    /// Delete every object recorded in state
    Destroy(DestroyArgs),

    /// Re-read every object in state from the API
    Refresh,

    /// Adopt an existing remote object into state
    Import {
        /// Declared address, e.g. quismon_check.api
        address: String,

        /// Remote ID (check_id:alert_rule_id for alert rules)
        id: String,
    },

    /// Inspect or edit the state file
    #[command(subcommand)]
    State(StateCommand),

    /// List probe regions
    Regions {
        /// Validate a single region code instead of listing
        #[arg(long)]
        check: Option<String>,
    },

    /// Print resource and data source schemas
    Schema {
        /// Only this type
        type_name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Limit to a type or a single instance (e.g. quismon_check or check.api)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Plan against state as recorded, without reading from the API first
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Limit to a type or a single instance (e.g. quismon_check or check.api)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub auto_approve: bool,

    /// Instances applied in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,

    /// Plan against state as recorded, without reading from the API first
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Limit to a type or a single instance
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub auto_approve: bool,

    /// Instances deleted in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,
}

#[derive(Subcommand)]
pub enum StateCommand {
    /// List every address in state
    List,

    /// Show the recorded attributes of one instance
    Show {
        address: String,
    },

    /// Forget an instance without deleting the remote object
    Rm {
        address: String,
    },
}
