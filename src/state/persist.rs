//! Whitelisted slice persistence.
//!
//! Each persisted slice is stored as JSON under `"{prefix}{slice}"`. Reads
//! happen once at startup; writes happen whenever the store changes a
//! whitelisted slice.
//!
//! ERROR HANDLING
//! ==============
//! A missing key is normal (first visit). Unreadable or corrupt entries are
//! skipped with a warning so one bad slice cannot block startup.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::tree::StateTree;
use crate::config::PersistConfig;
use crate::error::StorageError;

/// Key/value string storage (browser `localStorage` or in-memory).
pub trait StateStorage: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage used when the browser offers none.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Unavailable)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Unavailable)?;
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Unavailable)?;
        items.remove(key);
        Ok(())
    }
}

/// Read every whitelisted slice that was persisted earlier.
///
/// Never fails: absent or unreadable slices are left out of the result.
pub fn load_stored_state(storage: &dyn StateStorage, config: &PersistConfig) -> StateTree {
    let mut tree = StateTree::new();
    for slice in &config.whitelist {
        let key = config.key_for(slice);
        let raw = match storage.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("skipping persisted slice {slice}: {e}");
                continue;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => tree.set_slice(slice.clone(), value),
            Err(e) => log::warn!("discarding corrupt persisted slice {slice}: {e}"),
        }
    }
    tree
}

/// Write one slice back if the whitelist allows it. `None` removes it.
///
/// Returns `true` when storage was touched.
pub fn persist_slice(
    storage: &dyn StateStorage,
    config: &PersistConfig,
    slice: &str,
    value: Option<&Value>,
) -> bool {
    if !config.allows(slice) {
        return false;
    }
    let key = config.key_for(slice);
    let result = match value {
        Some(value) => storage.set_item(&key, &value.to_string()),
        None => storage.remove_item(&key),
    };
    if let Err(e) = result {
        log::warn!("failed to persist slice {slice}: {e}");
        return false;
    }
    true
}
