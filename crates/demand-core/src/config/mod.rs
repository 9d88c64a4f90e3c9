//! Credential configuration store.
//!
//! Persists the Trello API key, access token and default list id under fixed
//! keys and publishes whether all three are present.

mod labels;
mod store;

use std::fmt;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::ValidationError;
use crate::util::is_blank;
use crate::Result;

pub use labels::PriorityLabels;
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

pub const KEY_API_KEY: &str = "trello_api_key";
pub const KEY_TOKEN: &str = "trello_token";
pub const KEY_LIST_ID: &str = "trello_list_id";

const ALL_KEYS: [&str; 3] = [KEY_API_KEY, KEY_TOKEN, KEY_LIST_ID];

/// API key and token sent with every remote call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The three persisted values. Missing keys read as empty strings.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoredCredentials {
    pub api_key: String,
    pub token: String,
    pub list_id: String,
}

impl StoredCredentials {
    /// `true` when all three values are non-empty.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !is_blank(&self.api_key) && !is_blank(&self.token) && !is_blank(&self.list_id)
    }

    /// Key and token, when both are present.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        if is_blank(&self.api_key) || is_blank(&self.token) {
            return None;
        }
        Some(Credentials {
            api_key: self.api_key.clone(),
            token: self.token.clone(),
        })
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StoredCredentials")
            .field("api_key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("list_id", &self.list_id)
            .finish()
    }
}

/// Configuration store over any [`SettingsStore`] backend.
pub struct ConfigStore<S: SettingsStore> {
    store: S,
    configured: watch::Sender<bool>,
}

impl<S: SettingsStore> ConfigStore<S> {
    pub fn new(store: S) -> Self {
        let configured = read_credentials(&store).is_configured();
        let (configured, _) = watch::channel(configured);
        Self { store, configured }
    }

    /// Read the three values. Never fails: unreadable storage reads as empty.
    pub fn load(&self) -> StoredCredentials {
        read_credentials(&self.store)
    }

    /// Persist all three values as one batch.
    ///
    /// Rejects empty or whitespace-only values without writing anything.
    pub fn save(&self, api_key: &str, token: &str, list_id: &str) -> Result<()> {
        let api_key = require(api_key, "api_key")?;
        let token = require(token, "token")?;
        let list_id = require(list_id, "list_id")?;

        self.store.set_many(&[
            (KEY_API_KEY, api_key),
            (KEY_TOKEN, token),
            (KEY_LIST_ID, list_id),
        ])?;
        tracing::info!("Trello configuration saved");
        self.configured.send_replace(true);
        Ok(())
    }

    /// Remove all three values.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_many(&ALL_KEYS)?;
        tracing::info!("Trello configuration cleared");
        self.configured.send_replace(false);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        *self.configured.borrow()
    }

    /// Listen for configured/unconfigured transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.configured.subscribe()
    }
}

fn require<'a>(value: &'a str, field: &'static str) -> std::result::Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn read_credentials<S: SettingsStore>(store: &S) -> StoredCredentials {
    let read = |key: &str| match store.get(key) {
        Ok(value) => value.unwrap_or_default(),
        Err(error) => {
            tracing::warn!("Failed to read setting {}: {}", key, error);
            String::new()
        }
    };

    StoredCredentials {
        api_key: read(KEY_API_KEY),
        token: read(KEY_TOKEN),
        list_id: read(KEY_LIST_ID),
    }
}
