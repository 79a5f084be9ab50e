//! In-memory store for tests and embedding

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::KeyValueStore;
use crate::error::StoreError;

/// A single recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    Get(String),
    Set(String, String),
}

/// In-memory [`KeyValueStore`] that records every call.
///
/// Clones share the same entries and log, so a test can hand one clone to
/// the wizard and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    /// Record of calls made through the trait
    pub command_log: Arc<Mutex<Vec<StoreCommand>>>,
    /// When set, reads fail with [`StoreError::Unavailable`]
    pub fail_reads: Arc<Mutex<bool>>,
    /// When set, writes fail with [`StoreError::Unavailable`]
    pub fail_writes: Arc<Mutex<bool>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose reads and writes all fail
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *lock(&self.fail_reads) = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }

    /// Seed an entry without recording a command
    pub fn insert(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    /// Current value under `key` (for test assertions)
    pub fn value(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    /// Get the command log
    pub fn get_commands(&self) -> Vec<StoreCommand> {
        lock(&self.command_log).clone()
    }

    /// Values written under `key`, oldest first
    pub fn writes_to(&self, key: &str) -> Vec<String> {
        self.get_commands()
            .into_iter()
            .filter_map(|cmd| match cmd {
                StoreCommand::Set(k, v) if k == key => Some(v),
                _ => None,
            })
            .collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        lock(&self.command_log).push(StoreCommand::Get(key.to_string()));

        if *lock(&self.fail_reads) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.command_log).push(StoreCommand::Set(key.to_string(), value.to_string()));

        if *lock(&self.fail_writes) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        assert_eq!(
            store.get_commands(),
            vec![
                StoreCommand::Get("a".to_string()),
                StoreCommand::Set("a".to_string(), "1".to_string()),
                StoreCommand::Set("a".to_string(), "2".to_string()),
                StoreCommand::Get("a".to_string()),
            ]
        );
        assert_eq!(store.writes_to("a"), vec!["1", "2"]);
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.set("k", "v").unwrap();
        assert_eq!(store.value("k").as_deref(), Some("v"));
        assert_eq!(store.get_commands().len(), 1);
    }

    #[test]
    fn test_insert_is_not_logged() {
        let store = MemoryStore::new();
        store.insert("k", "v");
        assert!(store.get_commands().is_empty());
    }

    #[test]
    fn test_failing_writes_keep_old_value() {
        let store = MemoryStore::new();
        store.insert("k", "old");
        store.set_fail_writes(true);

        assert!(matches!(store.set("k", "new"), Err(StoreError::Unavailable(_))));
        assert_eq!(store.value("k").as_deref(), Some("old"));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_unavailable_store() {
        let store = MemoryStore::unavailable();
        assert!(store.get("k").is_err());
        assert!(store.set("k", "v").is_err());
    }
}
