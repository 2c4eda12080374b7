//! Error types for the protocol crate.

use crate::entity::{EntityType, OperationKind};
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while building operations or decoding records.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Entity type name outside the known set.
    #[error("unknown entity type: {0:?}")]
    UnknownEntityType(String),

    /// Operation kind name outside create/update/delete.
    #[error("unknown operation kind: {0:?}")]
    UnknownOperationKind(String),

    /// Entity ID was empty.
    #[error("entity id must not be empty")]
    EmptyEntityId,

    /// A create or update came without an entity snapshot.
    #[error("{kind} operation requires a payload")]
    MissingPayload {
        /// The kind that was recorded.
        kind: OperationKind,
    },

    /// An update arrived for an entity whose delete is still pending.
    #[error("{entity_type} {entity_id:?} has a pending delete")]
    EntityDeleted {
        /// Entity type.
        entity_type: EntityType,
        /// Entity ID.
        entity_id: String,
    },

    /// JSON encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
