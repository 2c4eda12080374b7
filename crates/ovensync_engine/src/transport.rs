//! Transport layer abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use ovensync_protocol::{PullResponse, PushRequest};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A sync transport handles network communication with the sync server.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process servers, mocks for testing).
///
/// Implementations report every failure through `Err`; the engine turns
/// them into outcomes and never lets them reach its caller. The engine
/// imposes no timeout of its own, so implementations should.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Delivers pending operations. `Ok` means the server accepted them.
    async fn push(&self, auth_token: &str, request: &PushRequest) -> SyncResult<()>;

    /// Fetches the server's full snapshot.
    async fn pull(&self, auth_token: &str) -> SyncResult<PullResponse>;
}

#[async_trait]
impl<T: SyncTransport + ?Sized> SyncTransport for Arc<T> {
    async fn push(&self, auth_token: &str, request: &PushRequest) -> SyncResult<()> {
        (**self).push(auth_token, request).await
    }

    async fn pull(&self, auth_token: &str) -> SyncResult<PullResponse> {
        (**self).pull(auth_token).await
    }
}

/// A mock transport for testing.
///
/// Records every push it receives. Pushes succeed unless the transport is
/// disconnected or a rejection status is set; pulls return the configured
/// response.
#[derive(Debug)]
pub struct MockTransport {
    connected: AtomicBool,
    push_status: Mutex<Option<u16>>,
    pull_response: Mutex<Option<PullResponse>>,
    pushes: Mutex<Vec<(String, PushRequest)>>,
    pull_calls: AtomicUsize,
}

impl MockTransport {
    /// Creates a new connected mock transport.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            push_status: Mutex::new(None),
            pull_response: Mutex::new(None),
            pushes: Mutex::new(Vec::new()),
            pull_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the connected state. A disconnected transport fails every call.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Makes pushes fail with the given HTTP status (`None` to accept).
    pub fn set_push_status(&self, status: Option<u16>) {
        *self.push_status.lock() = status;
    }

    /// Sets the pull response.
    pub fn set_pull_response(&self, response: PullResponse) {
        *self.pull_response.lock() = Some(response);
    }

    /// Returns every push request received, including rejected ones.
    pub fn pushes(&self) -> Vec<PushRequest> {
        self.pushes.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Returns the number of push requests received.
    pub fn push_count(&self) -> usize {
        self.pushes.lock().len()
    }

    /// Returns the auth token of the last push.
    pub fn last_token(&self) -> Option<String> {
        self.pushes.lock().last().map(|(token, _)| token.clone())
    }

    /// Returns the number of pull calls received.
    pub fn pull_count(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }

    fn check_connected(&self) -> SyncResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::transport_retryable("network unreachable"))
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncTransport for MockTransport {
    async fn push(&self, auth_token: &str, request: &PushRequest) -> SyncResult<()> {
        self.check_connected()?;
        self.pushes
            .lock()
            .push((auth_token.to_string(), request.clone()));

        match *self.push_status.lock() {
            Some(status) => Err(SyncError::Rejected { status }),
            None => Ok(()),
        }
    }

    async fn pull(&self, _auth_token: &str) -> SyncResult<PullResponse> {
        self.check_connected()?;
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        self.pull_response
            .lock()
            .clone()
            .ok_or_else(|| SyncError::ServerError("no mock pull response set".into()))
    }
}
