//! OS keychain backend for the credential store.
//!
//! All values live in a single keychain entry holding a JSON object, so a
//! batch write replaces every key at once.

use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use demand_core::config::SettingsStore;
use demand_core::{Error, Result};

const KEYRING_SERVICE_NAME: &str = "demand-cli";
const KEYRING_USERNAME: &str = "trello_credentials";

#[derive(Debug, Clone)]
pub struct KeyringSettingsStore {
    service: String,
    username: String,
}

impl Default for KeyringSettingsStore {
    fn default() -> Self {
        Self {
            service: KEYRING_SERVICE_NAME.to_string(),
            username: KEYRING_USERNAME.to_string(),
        }
    }
}

impl KeyringSettingsStore {
    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(test)]
    fn with_username(username: &str) -> Self {
        Self {
            username: username.to_string(),
            ..Self::default()
        }
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.username).map_err(map_keyring_error)
    }

    #[cfg(not(test))]
    fn read_raw(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(map_keyring_error(error)),
        }
    }

    #[cfg(test)]
    fn read_raw(&self) -> Result<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(guard.get(&self.key()).cloned())
    }

    #[cfg(not(test))]
    fn write_raw(&self, raw: &str) -> Result<()> {
        self.entry()?.set_password(raw).map_err(map_keyring_error)
    }

    #[cfg(test)]
    fn write_raw(&self, raw: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        guard.insert(self.key(), raw.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn delete_raw(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(map_keyring_error(error)),
        }
    }

    #[cfg(test)]
    fn delete_raw(&self) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        guard.remove(&self.key());
        Ok(())
    }

    #[cfg(test)]
    fn key(&self) -> String {
        format!("{}:{}", self.service, self.username)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match self.read_raw()? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl SettingsStore for KeyringSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut values = self.read_all()?;
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        self.write_raw(&serde_json::to_string(&values)?)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.read_all()?;
        for key in keys {
            values.remove(*key);
        }
        if values.is_empty() {
            self.delete_raw()
        } else {
            self.write_raw(&serde_json::to_string(&values)?)
        }
    }
}

#[cfg(not(test))]
fn map_keyring_error(error: keyring::Error) -> Error {
    Error::Storage(format!("Secure storage error: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use demand_core::config::ConfigStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyring_store_roundtrip() {
        let store = KeyringSettingsStore::with_username("roundtrip");
        store.set_many(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove_many(&["a", "b"]).unwrap();
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.read_raw().unwrap(), None);
    }

    #[test]
    fn config_store_over_keyring() {
        let config = ConfigStore::new(KeyringSettingsStore::with_username("config"));
        config.save("key", "token", "list").unwrap();
        assert!(config.is_configured());

        config.clear().unwrap();
        assert!(!config.load().is_configured());
    }
}
