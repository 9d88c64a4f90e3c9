use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] demand_core::Error),
    #[error(transparent)]
    Validation(#[from] demand_core::ValidationError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Trello is not configured. Run `demand config set --api-key <KEY> --token <TOKEN> --list-id <ID>`."
    )]
    NotConfigured,
}
