//! Configuration for the sync engine.

use ovensync_protocol::DEFAULT_HISTORY_LIMIT;
use std::time::Duration;

/// Record key the engine stores its metadata under by default.
pub const DEFAULT_METADATA_KEY: &str = "ovensync.metadata";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Sync endpoint URL (POST for push, GET for pull).
    pub endpoint: String,
    /// Name of the durable metadata record.
    pub metadata_key: String,
    /// Synced operations kept for diagnostics after compaction.
    pub history_limit: usize,
    /// Request timeout applied by the HTTP transport.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the metadata record key.
    pub fn with_metadata_key(mut self, key: impl Into<String>) -> Self {
        self.metadata_key = key.into();
        self
    }

    /// Sets how many synced operations compaction keeps.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("")
    }
}
