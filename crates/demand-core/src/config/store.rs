//! Durable key-value backends for the configuration store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{Error, Result};

/// String key-value storage.
///
/// `set_many` must look atomic to later `get` calls: either every entry of the
/// batch is visible or none is.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// JSON object file on disk. Writes go to a sibling temp file which is then
/// renamed over the original.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|error| {
            Error::Storage(format!(
                "Failed to read settings at {}: {}",
                self.path.display(),
                error
            ))
        })?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|error| {
            Error::Storage(format!(
                "Failed to parse settings at {}: {}",
                self.path.display(),
                error
            ))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                Error::Storage(format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    error
                ))
            })?;
        }

        let serialized = serde_json::to_string_pretty(values)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, serialized).map_err(|error| {
            Error::Storage(format!(
                "Failed to write settings at {}: {}",
                temp_path.display(),
                error
            ))
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|error| {
            Error::Storage(format!(
                "Failed to replace settings at {}: {}",
                self.path.display(),
                error
            ))
        })
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut values = self.read_all()?;
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        self.write_all(&values)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.read_all()?;
        let before = values.len();
        for key in keys {
            values.remove(*key);
        }
        if values.len() == before {
            return Ok(());
        }
        self.write_all(&values)
    }
}

/// In-process store, used by tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut guard = self.lock()?;
        for (key, value) in entries {
            guard.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut guard = self.lock()?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        (**self).set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        (**self).remove_many(keys)
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        (**self).set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        (**self).remove_many(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join("settings.json"));

        assert_eq!(store.get("missing").unwrap(), None);

        store.set_many(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        store.remove_many(&["a"]).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = FileSettingsStore::new(path.clone()).get("a").unwrap_err();
        assert!(error.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemorySettingsStore::new();
        store.set_many(&[("k", "v")]).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove_many(&["k"]).unwrap();
        assert!(store.snapshot().unwrap().is_empty());
    }
}
