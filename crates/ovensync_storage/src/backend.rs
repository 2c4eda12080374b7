//! Metadata store trait definition.

use crate::error::{StorageError, StorageResult};

/// A durable store of named records.
///
/// The sync engine keeps its whole state (operation log plus watermarks) in
/// a single named record and rewrites it after every logical operation.
/// Backends only have to provide whole-record replacement.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `write`
/// - `write` replaces the record atomically; a crash mid-write leaves
///   either the old or the new record, never a mix
/// - `remove` of a missing record succeeds
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait MetadataStore: Send + Sync {
    /// Reads the record stored under `key`.
    ///
    /// Returns `None` if the record was never written or has been removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write cannot be made
    /// durable.
    fn write(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Removes the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: MetadataStore + ?Sized> MetadataStore for std::sync::Arc<S> {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        (**self).write(key, data)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Checks that `key` is usable as a record name.
///
/// Keys are restricted to ASCII letters, digits, `_`, `-` and `.`, must not
/// be empty and must not start with a dot, so a key can never name a path
/// outside the store.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] when the key is rejected.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_keys() {
        assert!(validate_key("ovensync.metadata").is_ok());
        assert!(validate_key("sync_meta-2").is_ok());
    }

    #[test]
    fn rejects_path_like_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
        assert!(validate_key("with space").is_err());
    }
}
