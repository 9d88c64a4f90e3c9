//! Demand Desk CLI - file client demands as Trello cards
//!
//! Stores Trello credentials locally and submits demands with attachments.

mod cli;
mod commands;
mod error;
mod secret_store;
mod settings;


use clap::Parser;
use demand_core::trello::TrelloClient;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::labels::run_labels;
use crate::commands::submit::run_submit;
use crate::error::CliError;
use crate::settings::{load_labels, CredentialBackend};

const DEFAULT_LOG_FILTER: &str = "demand_cli=info,demand_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Submit(args) => {
            let backend = CredentialBackend::resolve(cli.settings.as_deref(), cli.keyring)?;
            let stored = backend.open().load();
            let labels = load_labels(cli.labels.as_deref())?;
            let api = TrelloClient::from_env()?;
            run_submit(args, &stored, api, labels).await?;
        }
        Commands::Config { command } => {
            let backend = CredentialBackend::resolve(cli.settings.as_deref(), cli.keyring)?;
            run_config(command, &backend)?;
        }
        Commands::Labels { json } => {
            let labels = load_labels(cli.labels.as_deref())?;
            run_labels(&labels, json)?;
        }
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
