//! File-based metadata store for persistent storage.
//!
//! Layout of a store directory:
//!
//! ```text
//! <store_dir>/
//! ├─ LOCK              # Advisory lock for single-owner access
//! ├─ <key>             # One file per record
//! └─ .<key>.tmp        # Transient, only during a write
//! ```

use crate::backend::{validate_key, MetadataStore};
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";

/// A file-based metadata store.
///
/// Every record lives in its own file. Records survive process restarts.
///
/// # Durability
///
/// Writes use the write-then-rename pattern:
/// 1. Write to a temporary file
/// 2. `sync_all` the temporary file
/// 3. Rename it over the record file
/// 4. Fsync the directory so the rename itself is durable
///
/// # Exclusive Access
///
/// The store holds an exclusive advisory lock on `LOCK` for its whole
/// lifetime. Only one `FileStore` can be open per directory at a time.
///
/// # Example
///
/// ```no_run
/// use ovensync_storage::{FileStore, MetadataStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("sync-data")).unwrap();
/// store.write("ovensync.metadata", b"{}").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Serializes writers within this process.
    write_lock: Mutex<()>,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store in `dir`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another store holds the directory,
    /// or an I/O error if the directory cannot be created.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;

        if !dir.is_dir() {
            return Err(StorageError::Corrupted(format!(
                "store path is not a directory: {}",
                dir.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: dir.display().to_string(),
            });
        }

        tracing::debug!(dir = %dir.display(), "opened file store");

        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        if key == LOCK_FILE {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        // NTFS journals metadata updates; directory handles cannot be fsynced
        Ok(())
    }
}

impl MetadataStore for FileStore {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.record_path(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.record_path(key)?;
        let temp_path = self.dir.join(format!(".{key}.tmp"));

        let _guard = self.write_lock.lock();

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &path)?;
        self.sync_directory()
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.record_path(key)?;

        let _guard = self.write_lock.lock();

        match fs::remove_file(&path) {
            Ok(()) => self.sync_directory(),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");

        let store = FileStore::open(&path).unwrap();
        assert!(path.join(LOCK_FILE).exists());
        assert_eq!(store.read("meta").unwrap(), None);
        assert_eq!(store.dir(), path);
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.write("meta", b"hello").unwrap();
        assert_eq!(store.read("meta").unwrap(), Some(b"hello".to_vec()));

        store.write("meta", b"world").unwrap();
        assert_eq!(store.read("meta").unwrap(), Some(b"world".to_vec()));
        assert!(!dir.path().join(".meta.tmp").exists());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.write("meta", b"persistent data").unwrap();
        }

        {
            let store = FileStore::open(dir.path()).unwrap();
            assert_eq!(
                store.read("meta").unwrap(),
                Some(b"persistent data".to_vec())
            );
        }
    }

    #[test]
    fn file_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.write("meta", b"data").unwrap();
        store.remove("meta").unwrap();
        assert_eq!(store.read("meta").unwrap(), None);

        store.remove("meta").unwrap();
    }

    #[test]
    fn file_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _store = FileStore::open(dir.path()).unwrap();

        let second = FileStore::open(dir.path());
        assert!(matches!(second, Err(StorageError::Locked { .. })));
    }

    #[test]
    fn file_lock_released_on_drop() {
        let dir = tempdir().unwrap();
        drop(FileStore::open(dir.path()).unwrap());
        assert!(FileStore::open(dir.path()).is_ok());
    }

    #[test]
    fn file_rejects_lock_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.write(LOCK_FILE, b"x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
