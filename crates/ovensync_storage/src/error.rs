//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another process holds the store directory.
    #[error("store locked: another process has exclusive access to {path}")]
    Locked {
        /// The locked directory.
        path: String,
    },

    /// The record key cannot be used as a record name.
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),

    /// The store layout on disk is not usable.
    #[error("store corrupted: {0}")]
    Corrupted(String),
}
