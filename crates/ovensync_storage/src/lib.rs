//! # ovensync Storage
//!
//! Durable metadata store backends for the ovensync engine.
//!
//! Stores hold **named opaque records**. They do not interpret the bytes
//! they keep; the engine owns the record format.
//!
//! ## Design Principles
//!
//! - A record is read and replaced as a whole, never patched in place
//! - `write` returning `Ok` means the record survives process termination
//!   (for durable backends)
//! - Must be `Send + Sync` so one engine instance can be shared by reference
//!
//! ## Available Backends
//!
//! - [`InMemoryStore`] - For testing and ephemeral clients
//! - [`FileStore`] - Persistent, one file per record, exclusively locked
//!
//! ## Example
//!
//! ```rust
//! use ovensync_storage::{InMemoryStore, MetadataStore};
//!
//! let store = InMemoryStore::new();
//! store.write("sync", b"{}").unwrap();
//! assert_eq!(store.read("sync").unwrap(), Some(b"{}".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{validate_key, MetadataStore};
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
