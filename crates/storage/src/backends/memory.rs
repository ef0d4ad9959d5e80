//! In-memory backend.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::KeyValueStore;
use crate::error::StorageResult;

/// A [`KeyValueStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        let mut map = self.entries.write();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        let mut map = self.entries.write();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("token", "abc".to_string()).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overwrite() {
        let store = MemoryStore::new();
        store.set("token", "old".to_string()).unwrap();
        store.set("token", "new".to_string()).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.remove("nothing").unwrap();
        assert!(store.is_empty());
    }
}
