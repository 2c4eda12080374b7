//! In-memory metadata store for testing.

use crate::backend::{validate_key, MetadataStore};
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory metadata store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral clients that don't need persistence
///
/// # Example
///
/// ```rust
/// use ovensync_storage::{InMemoryStore, MetadataStore};
///
/// let store = InMemoryStore::new();
/// assert_eq!(store.read("meta").unwrap(), None);
/// store.write("meta", b"v1").unwrap();
/// assert_eq!(store.write_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
    writes: RwLock<u64>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one pre-existing record.
    ///
    /// Useful for testing recovery from damaged records.
    #[must_use]
    pub fn with_record(key: &str, data: Vec<u8>) -> Self {
        let store = Self::new();
        store.records.write().insert(key.to_string(), data);
        store
    }

    /// Returns the number of successful writes since creation.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        *self.writes.read()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl MetadataStore for InMemoryStore {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.records.read().get(key).cloned())
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        self.records.write().insert(key.to_string(), data.to_vec());
        *self.writes.write() += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.records.write().remove(key);
        Ok(())
    }
}
