//! Key-value backends
//!
//! Browser builds talk to LocalStorage; tests and native runs use an
//! in-memory map.

use std::collections::BTreeMap;

use super::PersistenceError;

/// String-keyed string storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
    /// Every key currently stored
    fn keys(&self) -> Result<Vec<String>, PersistenceError>;
}

/// In-memory store, sorted by key
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
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Open the window's LocalStorage. Fails in private mode or workers.
    pub fn open() -> Result<Self, PersistenceError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistenceError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> PersistenceError {
    PersistenceError::Storage(format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage.remove_item(key).map_err(js_error)
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let len = self.storage.length().map_err(js_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(js_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        store.set("a", "3").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.get("missing").unwrap(), None);
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.len(), 1);
    }
}
