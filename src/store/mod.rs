//! Persistence of in-progress form values.
//!
//! The wizard only needs a string key-value store. [`KeyValueStore`]
//! abstracts the backend so tests can run against [`MemoryStore`] while the
//! CLI uses the durable [`FileStore`]. [`PersistenceStore`] layers the JSON
//! blob handling on top.

mod file;
mod memory;

use std::sync::Arc;

pub use file::{FileStore, SESSIONS_FILE};
pub use memory::{MemoryStore, StoreCommand};

use crate::error::{StoreError, WizardError};
use crate::values::FormValues;

/// Trait abstracting a string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// JSON-blob persistence of form values over a [`KeyValueStore`]
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Load the values saved under `key`.
    ///
    /// Returns `None` when nothing usable is stored. Read failures and
    /// malformed blobs are logged and treated the same as an empty slot.
    pub fn load(&self, key: &str) -> Option<FormValues> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read persisted form values");
                return None;
            }
        };

        if raw.is_empty() {
            return None;
        }

        match serde_json::from_str::<FormValues>(&raw) {
            Ok(values) => Some(values),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding malformed persisted form values");
                None
            }
        }
    }

    /// Serialize `values` and store them under `key`
    pub fn save(&self, key: &str, values: &FormValues) -> Result<(), WizardError> {
        let blob = serde_json::to_string(values)?;
        self.backend.set(key, &blob)?;
        tracing::debug!(key, fields = values.len(), "Persisted form values");
        Ok(())
    }

    /// Mark the session under `key` as finished
    pub fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.backend.set(key, "")?;
        tracing::debug!(key, "Cleared persisted form values");
        Ok(())
    }
}
