//! Key-value persistence for the small JSON records the game keeps
//!
//! Records:
//! - Coin ledger
//! - Skin unlocks
//! - Settings
//! - Leaderboard, high score, player name
//! - First-run flag
//!
//! Reads never fail: a missing or corrupt record falls back to its default.
//! Writes report a `StoreError` so callers can roll back.

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod local_storage;

pub use memory::MemoryStore;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage keys
pub mod keys {
    pub const LEDGER: &str = "gap_runner_coins";
    pub const UNLOCKS: &str = "gap_runner_skins";
    pub const SETTINGS: &str = "gap_runner_settings";
    pub const LEADERBOARD: &str = "gap_runner_leaderboard";
    pub const HIGH_SCORE: &str = "gap_runner_high_score";
    pub const PLAYER_NAME: &str = "gap_runner_player_name";
    /// Set once the first-time starter balance has been granted
    pub const STARTER_GRANTED: &str = "gap_runner_first_login";
}

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage (LocalStorage semantics)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Load a JSON record, falling back to `T::default()` on any failure
pub fn load_record<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Corrupt record `{}` ({}), using defaults", key, err);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(err) => {
            log::warn!("Could not read `{}` ({}), using defaults", key, err);
            T::default()
        }
    }
}

/// Serialize and write a JSON record
pub fn save_record<T>(store: &mut dyn KeyValueStore, key: &str, record: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(record)?;
    store.set(key, &json)
}

/// Raw value of one key, captured so a multi-key write can be undone
#[derive(Debug, Clone)]
pub struct Snapshot {
    key: &'static str,
    raw: Option<String>,
}

impl Snapshot {
    pub fn capture(store: &dyn KeyValueStore, key: &'static str) -> Result<Self, StoreError> {
        Ok(Self {
            key,
            raw: store.get(key)?,
        })
    }

    /// Put the captured value back (or remove the key if it was absent)
    pub fn restore(&self, store: &mut dyn KeyValueStore) {
        let result = match &self.raw {
            Some(raw) => store.set(self.key, raw),
            None => store.remove(self.key),
        };
        if let Err(err) = result {
            log::warn!("Rollback of `{}` failed: {}", self.key, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn test_load_missing_record_uses_default() {
        let store = MemoryStore::new();
        let counter: Counter = load_record(&store, "counter");
        assert_eq!(counter, Counter::default());
    }

    #[test]
    fn test_load_corrupt_record_uses_default() {
        let mut store = MemoryStore::new();
        store.set("counter", "{not json").unwrap();
        let counter: Counter = load_record(&store, "counter");
        assert_eq!(counter, Counter::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        save_record(&mut store, "counter", &Counter { value: 7 }).unwrap();
        let counter: Counter = load_record(&store, "counter");
        assert_eq!(counter.value, 7);
    }

    #[test]
    fn test_snapshot_restore_removes_absent_key() {
        let mut store = MemoryStore::new();
        let snap = Snapshot::capture(&store, keys::LEDGER).unwrap();
        store.set(keys::LEDGER, "{}").unwrap();
        snap.restore(&mut store);
        assert_eq!(store.get(keys::LEDGER).unwrap(), None);
    }

    #[test]
    fn test_snapshot_restore_previous_value() {
        let mut store = MemoryStore::new();
        store.set(keys::UNLOCKS, "old").unwrap();
        let snap = Snapshot::capture(&store, keys::UNLOCKS).unwrap();
        store.set(keys::UNLOCKS, "new").unwrap();
        snap.restore(&mut store);
        assert_eq!(store.get(keys::UNLOCKS).unwrap().as_deref(), Some("old"));
    }
}
