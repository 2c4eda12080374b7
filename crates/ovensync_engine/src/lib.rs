//! # ovensync Engine
//!
//! Offline-first sync engine for the bakery backend.
//!
//! This crate provides:
//! - Operation recording with merge-on-record (one pending change per entity)
//! - Push of pending operations, grouped by entity type
//! - Pull of the server's full snapshot
//! - Compaction of synced history
//! - HTTP transport abstraction
//!
//! ## Architecture
//!
//! The engine implements a **push-then-pull** cycle:
//! 1. Push pending local operations (atomic at the bookkeeping level)
//! 2. Pull the authoritative snapshot, even if nothing was pushed
//!
//! Reconciling a pulled snapshot with pending local edits is left to the
//! caller; [`SyncEngine::has_pending`] tells it which entities to skip.
//!
//! ## Key Invariants
//!
//! - At most one unsynced operation per entity
//! - Every recorded operation is durable before `record` returns
//! - A failed push leaves every operation pending, verbatim
//! - Push and pull never return errors; failures are reported in outcomes
//! - Metadata read-modify-write is serialized; no lock is held while
//!   waiting on the network

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod report;
mod transport;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::{SyncConfig, DEFAULT_METADATA_KEY};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use http::HttpTransport;
pub use report::{PullOutcome, PushOutcome, SyncReport, SyncStats, SyncStatus};
pub use transport::{MockTransport, SyncTransport};

pub use ovensync_protocol::{
    EntityType, Operation, OperationKind, PullResponse, PushItem, PushRequest, RecordOutcome,
    Snapshot,
};
