//! Browser LocalStorage backend

use super::KeyValueStore;

/// Store backed by `window.localStorage`
///
/// Every call looks the storage object up again; when it is unavailable
/// (private mode, sandboxed iframe) reads return `None` and writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    log::warn!("LocalStorage rejected write to '{}'", key);
                }
            }
            None => log::warn!("LocalStorage unavailable, '{}' not saved", key),
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(key).is_err() {
                log::warn!("LocalStorage rejected removal of '{}'", key);
            }
        }
    }
}
