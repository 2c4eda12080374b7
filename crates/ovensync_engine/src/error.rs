//! Error types for the sync engine.

use ovensync_protocol::ProtocolError;
use ovensync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// Server answered with a non-success HTTP status.
    #[error("server rejected request with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// Server reported a failure in the response body.
    #[error("server error: {0}")]
    ServerError(String),

    /// The request timed out.
    #[error("operation timed out")]
    Timeout,

    /// Response or record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The calling layer recorded an invalid operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(#[source] ProtocolError),

    /// The metadata store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying the same call later can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Rejected { status } => *status >= 500 || matches!(status, 408 | 429),
            SyncError::ServerError(_) | SyncError::Timeout => true,
            SyncError::Codec(_) | SyncError::InvalidOperation(_) | SyncError::Storage(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection reset").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::Rejected { status: 503 }.is_retryable());
        assert!(SyncError::Rejected { status: 429 }.is_retryable());
        assert!(!SyncError::Rejected { status: 401 }.is_retryable());
        assert!(!SyncError::InvalidOperation(ProtocolError::EmptyEntityId).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::Rejected { status: 500 };
        assert_eq!(err.to_string(), "server rejected request with status 500");

        let err = SyncError::InvalidOperation(ProtocolError::EmptyEntityId);
        assert!(err.to_string().contains("entity id must not be empty"));
    }
}
