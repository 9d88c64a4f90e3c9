use std::path::PathBuf;

use chrono::NaiveDate;
use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use clap_complete::aot::Shell;
use demand_core::models::{Category, Priority};

#[derive(Parser)]
#[command(name = "demand")]
#[command(about = "File client demands as Trello cards from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the settings file holding the Trello credentials
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Optional path to the priority label table (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub labels: Option<PathBuf>,

    /// Keep credentials in the OS keychain instead of the settings file
    #[arg(long, global = true)]
    pub keyring: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a demand as a new card
    #[command(alias = "new")]
    Submit(SubmitArgs),
    /// Manage stored Trello credentials
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show the priority to label mapping in use
    Labels {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell (detected from $SHELL when omitted)
        #[arg(value_enum)]
        shell: Option<Shell>,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct SubmitArgs {
    /// Project title
    #[arg(long)]
    pub title: String,
    /// Detailed description of the client demand
    #[arg(long)]
    pub description: String,
    /// Priority label for the card
    #[arg(long, value_parser = priority_parser())]
    pub priority: Option<Priority>,
    /// Deadline as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub deadline: Option<NaiveDate>,
    /// Category appended to the card name
    #[arg(long, value_parser = category_parser())]
    pub category: Option<Category>,
    /// Destination list id (defaults to the stored list id)
    #[arg(long, value_name = "ID")]
    pub list_id: Option<String>,
    /// File to attach; repeat for up to four files
    #[arg(short, long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
    /// Output the submission report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Save API key, token and default list id
    Set {
        /// Trello API key
        #[arg(long, value_name = "KEY")]
        api_key: String,
        /// Trello access token
        #[arg(long, value_name = "TOKEN")]
        token: String,
        /// Default destination list id
        #[arg(long, value_name = "ID")]
        list_id: String,
    },
    /// Show whether credentials are configured
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove stored credentials
    Clear,
}

/// English names are offered for completion; the Portuguese names stay
/// accepted as hidden aliases.
fn priority_parser() -> impl TypedValueParser<Value = Priority> {
    PossibleValuesParser::new([
        PossibleValue::new("low").alias("baixa"),
        PossibleValue::new("normal"),
        PossibleValue::new("high").alias("alta"),
        PossibleValue::new("urgent").alias("urgente"),
    ])
    .try_map(|value| value.parse::<Priority>())
}

fn category_parser() -> impl TypedValueParser<Value = Category> {
    PossibleValuesParser::new([PossibleValue::new("design").help("Design work")])
        .try_map(|value| value.parse::<Category>())
}
