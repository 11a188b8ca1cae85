//! Browser LocalStorage adapter (WASM only)

use super::{KeyValueStore, StoreError};

/// `window.localStorage` wrapper
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = Self::storage()?;
        storage.get_item(key).map_err(|_| StoreError::Unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage.set_item(key, value).map_err(|_| StoreError::Write {
            key: key.to_string(),
            reason: "quota exceeded or storage disabled".to_string(),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage.remove_item(key).map_err(|_| StoreError::Write {
            key: key.to_string(),
            reason: "remove rejected".to_string(),
        })
    }
}
