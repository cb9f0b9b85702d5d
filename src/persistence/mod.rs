//! Key-value persistence seam
//!
//! The core never touches files or browser storage directly. Anything that
//! must survive a restart (best combo, statistics) goes through a
//! [`KeyValueStore`] supplied by the host:
//! - [`MemoryStore`]: in-process map for native hosts and tests
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)
//!
//! Values are stored as JSON strings.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// String key-value storage provided by the host
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Read and decode a JSON value. Missing or corrupt entries yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = store.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Ignoring corrupt entry '{}': {}", key, err);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.set(key, &json),
        Err(err) => log::warn!("Failed to encode '{}': {}", key, err),
    }
}

/// In-memory store (sorted for stable dumps)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "best", &17u32);
        assert_eq!(store.get("best").as_deref(), Some("17"));
        assert_eq!(load_json::<u32>(&store, "best"), Some(17));
    }

    #[test]
    fn test_missing_and_corrupt_entries_load_as_none() {
        let mut store = MemoryStore::new();
        assert_eq!(load_json::<u32>(&store, "best"), None);
        store.set("best", "not a number");
        assert_eq!(load_json::<u32>(&store, "best"), None);
        store.remove("best");
        assert!(store.is_empty());
    }
}
