//! Core key-value storage trait.
//!
//! This module defines the [`KeyValueStore`] trait, the durable string map the
//! session store persists into. Implementations live in [`crate::backends`].

use crate::error::StorageResult;

/// A durable map from string keys to string values.
///
/// Multi-key writes ([`set_many`](KeyValueStore::set_many) and
/// [`remove_many`](KeyValueStore::remove_many)) must be applied as a single
/// unit: a reader never observes some of the entries without the others.
///
/// # Example
///
/// ```
/// use hospitex_storage::KeyValueStore;
/// use hospitex_storage::backends::memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.set_many(&[("a", "1".to_string()), ("b", "2".to_string())]).unwrap();
/// assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
///
/// store.remove_many(&["a", "b"]).unwrap();
/// assert!(store.get("b").unwrap().is_none());
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes every entry in one logical operation, overwriting existing values.
    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()>;

    /// Removes every key in one logical operation. Missing keys are ignored.
    fn remove_many(&self, keys: &[&str]) -> StorageResult<()>;

    /// Writes a single entry.
    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.set_many(&[(key, value)])
    }

    /// Removes a single key.
    fn remove(&self, key: &str) -> StorageResult<()> {
        self.remove_many(&[key])
    }
}
