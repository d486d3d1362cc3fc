//! Browser LocalStorage store

use web_sys::Storage;

use super::KeyValueStore;
use crate::error::StorageError;

pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// The window's LocalStorage, if the page may use it
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable("LocalStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

fn js_err(e: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Unavailable(format!("{e:?}"))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(js_err)
    }
}
