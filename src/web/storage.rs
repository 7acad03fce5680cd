//! `localStorage`-backed state storage.

use crate::error::StorageError;
use crate::state::persist::StateStorage;

/// Looks up `window.localStorage` on every call; holds no JS handles so it
/// can live in `Send + Sync` contexts.
pub struct LocalStorage;

impl LocalStorage {
    pub fn available() -> bool {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten()).is_some()
    }

    fn backend() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

impl StateStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::backend()?.get_item(key).map_err(|e| StorageError::Read(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::backend()?.set_item(key, value).map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::backend()?.remove_item(key).map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}
