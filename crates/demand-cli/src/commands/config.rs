use serde::Serialize;

use demand_core::config::{ConfigStore, SettingsStore, StoredCredentials};
use demand_core::util::redact_secret;

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::settings::CredentialBackend;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConfigStatus {
    pub configured: bool,
    pub backend: String,
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub list_id: Option<String>,
}

pub fn run_config(command: ConfigCommands, backend: &CredentialBackend) -> Result<(), CliError> {
    let store = backend.open();
    match command {
        ConfigCommands::Set {
            api_key,
            token,
            list_id,
        } => {
            store.save(&api_key, &token, &list_id)?;
            println!("Trello credentials saved to {}", backend.describe());
        }
        ConfigCommands::Show { json } => {
            let status = config_status(&store, backend);
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                for line in format_status_lines(&status) {
                    println!("{line}");
                }
            }
        }
        ConfigCommands::Clear => {
            store.clear()?;
            println!("Trello credentials removed from {}", backend.describe());
        }
    }
    Ok(())
}

pub fn config_status<S: SettingsStore>(
    store: &ConfigStore<S>,
    backend: &CredentialBackend,
) -> ConfigStatus {
    status_from(&store.load(), backend)
}

fn status_from(stored: &StoredCredentials, backend: &CredentialBackend) -> ConfigStatus {
    let present = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };
    ConfigStatus {
        configured: stored.is_configured(),
        backend: backend.describe(),
        api_key: present(&stored.api_key).map(|value| redact_secret(&value)),
        token: present(&stored.token).map(|value| redact_secret(&value)),
        list_id: present(&stored.list_id),
    }
}

pub fn format_status_lines(status: &ConfigStatus) -> Vec<String> {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
    vec![
        format!(
            "Status:   {}",
            if status.configured {
                "configured"
            } else {
                "not configured"
            }
        ),
        format!("Storage:  {}", status.backend),
        format!("API key:  {}", show(&status.api_key)),
        format!("Token:    {}", show(&status.token)),
        format!("List id:  {}", show(&status.list_id)),
    ]
}
