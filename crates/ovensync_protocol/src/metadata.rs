//! Durable sync metadata record.

use crate::error::ProtocolResult;
use crate::oplog::OperationLog;
use serde::{Deserialize, Serialize};

/// Process-wide sync state, persisted as a single JSON record.
///
/// Stored layout:
///
/// ```json
/// { "lastSyncTimestamp": 0, "lastPullTimestamp": 0, "pendingOperations": [] }
/// ```
///
/// Timestamps are Unix millis; `0` means the watermark was never set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMetadata {
    /// Completion time of the last successful push.
    #[serde(rename = "lastSyncTimestamp", default)]
    pub last_push_at: u64,
    /// Completion time of the last successful pull.
    #[serde(rename = "lastPullTimestamp", default)]
    pub last_pull_at: u64,
    /// All operations, synced and unsynced.
    #[serde(rename = "pendingOperations", default)]
    pub log: OperationLog,
}

impl SyncMetadata {
    /// Creates the zero state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes to JSON bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes from JSON bytes and repairs the log invariants.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the bytes are not a metadata record.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut metadata: SyncMetadata = serde_json::from_slice(bytes)?;
        metadata.log.repair();
        Ok(metadata)
    }

    /// Returns true if this is the zero state.
    pub fn is_empty(&self) -> bool {
        self.last_push_at == 0 && self.last_pull_at == 0 && self.log.is_empty()
    }
}
