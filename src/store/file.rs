//! Durable JSON file store.
//!
//! All keys live in one JSON object on disk, so sessions survive restarts
//! of the process that drives the wizard.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::StoreError;

/// File name used by [`FileStore::in_dir`]
pub const SESSIONS_FILE: &str = "sessions.json";

/// [`KeyValueStore`] backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the sessions file inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Move an unreadable sessions file out of the way and start empty
    fn set_aside(&self, reason: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let backup = self.path.with_extension("json.corrupt");
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            reason,
            "Sessions file is corrupt, starting a new one"
        );
        fs::rename(&self.path, &backup)?;
        Ok(BTreeMap::new())
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        // Write to a sibling file first so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt { reason, .. }) => self.set_aside(&reason)?,
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        assert_eq!(store.get("listing").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_set_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path().join("state").join("nested"));

        store.set("listing", r#"{"title":"Bike"}"#).unwrap();
        assert!(store.path().exists());
        assert!(store.path().ends_with(SESSIONS_FILE));
    }

    #[test]
    fn test_values_survive_new_instance() {
        let temp_dir = TempDir::new().unwrap();
        FileStore::in_dir(temp_dir.path())
            .set("listing", "payload")
            .unwrap();

        let reopened = FileStore::in_dir(temp_dir.path());
        assert_eq!(reopened.get("listing").unwrap().as_deref(), Some("payload"));
    }

    #[test]
    fn test_keys_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some(""));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_is_reported_on_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.get("a"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        fs::write(store.path(), "{not json").unwrap();

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        // The unreadable contents are kept next to the new file
        let backup = store.path().with_extension("json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");
    }
}
