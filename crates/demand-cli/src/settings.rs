//! Locations of the persisted CLI state and the credential backend choice.

use std::path::{Path, PathBuf};

use demand_core::config::{ConfigStore, FileSettingsStore, PriorityLabels, SettingsStore};
use demand_core::util::normalize_text_option;

use crate::error::CliError;
use crate::secret_store::KeyringSettingsStore;

const APP_DIR_NAME: &str = "demand";
const SETTINGS_FILE_NAME: &str = "settings.json";
const LABELS_FILE_NAME: &str = "priority-labels.json";
const ENV_SETTINGS_PATH: &str = "DEMAND_SETTINGS_PATH";

pub type CliConfigStore = ConfigStore<Box<dyn SettingsStore>>;

pub fn config_dir() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

/// Settings file: explicit flag, then `DEMAND_SETTINGS_PATH`, then the config dir.
pub fn resolve_settings_path(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = normalize_text_option(std::env::var(ENV_SETTINGS_PATH).ok()) {
        return Ok(PathBuf::from(path));
    }
    Ok(config_dir()?.join(SETTINGS_FILE_NAME))
}

pub fn resolve_labels_path(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config_dir()?.join(LABELS_FILE_NAME)),
    }
}

/// Where credentials live for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialBackend {
    File(PathBuf),
    Keyring,
}

impl CredentialBackend {
    pub fn resolve(settings: Option<&Path>, use_keyring: bool) -> Result<Self, CliError> {
        if use_keyring {
            Ok(Self::Keyring)
        } else {
            Ok(Self::File(resolve_settings_path(settings)?))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Keyring => "OS keychain".to_string(),
        }
    }

    pub fn open(&self) -> CliConfigStore {
        let store: Box<dyn SettingsStore> = match self {
            Self::File(path) => Box::new(FileSettingsStore::new(path.clone())),
            Self::Keyring => Box::new(KeyringSettingsStore::default()),
        };
        ConfigStore::new(store)
    }
}

pub fn load_labels(explicit: Option<&Path>) -> Result<PriorityLabels, CliError> {
    let path = resolve_labels_path(explicit)?;
    PriorityLabels::load_or_default(&path).map_err(|error| {
        CliError::Config(format!(
            "Failed to load priority labels from {}: {}",
            path.display(),
            error
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_settings_path_wins() {
        let path = PathBuf::from("/tmp/demand-explicit.json");
        assert_eq!(resolve_settings_path(Some(&path)).unwrap(), path);
    }

    #[test]
    fn keyring_flag_selects_keyring_backend() {
        assert_eq!(
            CredentialBackend::resolve(None, true).unwrap(),
            CredentialBackend::Keyring
        );
        assert_eq!(CredentialBackend::Keyring.describe(), "OS keychain");
    }

    #[test]
    fn file_backend_opens_store_at_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let backend = CredentialBackend::resolve(Some(&path), false).unwrap();
        assert_eq!(backend, CredentialBackend::File(path.clone()));

        let store = backend.open();
        store.save("k", "t", "l").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn explicit_labels_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, r#"{"low":"1","normal":"2","high":"3","urgent":"4"}"#).unwrap();
        let labels = load_labels(Some(&path)).unwrap();
        assert_eq!(labels.urgent, "4");
    }

    #[test]
    fn broken_labels_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(load_labels(Some(&path)), Err(CliError::Config(_))));
    }
}
