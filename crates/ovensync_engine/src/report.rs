//! Outcomes, status and statistics reported by the engine.

use crate::error::SyncError;
use ovensync_protocol::Snapshot;

/// Result of a push attempt.
#[derive(Debug)]
pub enum PushOutcome {
    /// No unsynced operation was waiting; no request was made.
    NothingPending,
    /// The server accepted every operation sent.
    Pushed {
        /// Number of operations delivered.
        operations: usize,
    },
    /// The push failed; every operation sent is still pending.
    Failed(SyncError),
}

impl PushOutcome {
    /// Returns true if operations were delivered.
    pub fn is_success(&self) -> bool {
        matches!(self, PushOutcome::Pushed { .. })
    }

    /// Returns the number of operations delivered.
    pub fn pushed(&self) -> usize {
        match self {
            PushOutcome::Pushed { operations } => *operations,
            _ => 0,
        }
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&SyncError> {
        match self {
            PushOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Result of a pull attempt.
#[derive(Debug)]
pub enum PullOutcome {
    /// The server's full snapshot.
    Pulled(Snapshot),
    /// The pull failed; the pull watermark is unchanged.
    Failed(SyncError),
}

impl PullOutcome {
    /// Returns true if a snapshot was received.
    pub fn is_success(&self) -> bool {
        matches!(self, PullOutcome::Pulled(_))
    }

    /// Returns the snapshot, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            PullOutcome::Pulled(snapshot) => Some(snapshot),
            PullOutcome::Failed(_) => None,
        }
    }

    /// Consumes the outcome, returning the snapshot if any.
    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            PullOutcome::Pulled(snapshot) => Some(snapshot),
            PullOutcome::Failed(_) => None,
        }
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&SyncError> {
        match self {
            PullOutcome::Failed(e) => Some(e),
            PullOutcome::Pulled(_) => None,
        }
    }
}

/// Result of a push-then-pull cycle.
#[derive(Debug)]
pub struct SyncReport {
    /// Outcome of the push step.
    pub pushed: PushOutcome,
    /// Outcome of the pull step.
    pub pulled: PullOutcome,
}

/// Read-only view of the sync metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// Unsynced operations waiting for a push.
    pub pending_count: usize,
    /// Time since the last successful push; `None` if there never was one.
    pub ms_since_last_push: Option<u64>,
    /// Time since the last successful pull; `None` if there never was one.
    pub ms_since_last_pull: Option<u64>,
    /// Last successful push, Unix millis.
    pub last_push_at: Option<u64>,
    /// Last successful pull, Unix millis.
    pub last_pull_at: Option<u64>,
}

/// Statistics about sync activity since the engine was opened or cleared.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Pushes the server accepted.
    pub pushes_completed: u64,
    /// Pushes that failed.
    pub pushes_failed: u64,
    /// Operations delivered by accepted pushes.
    pub operations_pushed: u64,
    /// Pulls that returned a snapshot.
    pub pulls_completed: u64,
    /// Pulls that failed.
    pub pulls_failed: u64,
    /// Synced operations dropped by compaction.
    pub operations_compacted: u64,
    /// Last error message.
    pub last_error: Option<String>,
}
