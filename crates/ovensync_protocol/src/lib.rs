//! # ovensync Protocol
//!
//! Operation log, merge rules and wire types for the ovensync engine.
//!
//! This crate provides:
//! - [`Operation`] records and the closed set of [`EntityType`]s
//! - The merge reducer that folds a new change into a pending one
//! - [`OperationLog`] with compaction of synced history
//! - [`SyncMetadata`], the durable record layout
//! - Push/pull wire messages (JSON)
//!
//! This is a pure crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod error;
mod merge;
mod messages;
mod metadata;
mod operation;
mod oplog;

pub use entity::{EntityType, OperationKind};
pub use error::{ProtocolError, ProtocolResult};
pub use merge::{merge, MergeDecision};
pub use messages::{PullResponse, PushItem, PushRequest, Snapshot};
pub use metadata::SyncMetadata;
pub use operation::{Mutation, Operation};
pub use oplog::{OperationLog, RecordOutcome, DEFAULT_HISTORY_LIMIT};
