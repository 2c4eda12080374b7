//! Test fixtures and engine helpers.
//!
//! Provides ready-made engines over in-memory and file-backed stores and a
//! transport wrapper that holds pushes in flight on demand.

use crate::server::MemoryServer;
use async_trait::async_trait;
use ovensync_engine::{SyncConfig, SyncEngine, SyncResult, SyncTransport};
use ovensync_protocol::{PullResponse, PushRequest};
use ovensync_storage::{FileStore, InMemoryStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Endpoint used by test configurations. Never contacted.
pub const TEST_ENDPOINT: &str = "http://localhost:0/api/sync";

/// Auth token used by test scenarios.
pub const TEST_TOKEN: &str = "test-token";

/// User id used by test scenarios.
pub const TEST_USER: &str = "test-user";

/// An engine talking to a [`MemoryServer`] over an in-memory store.
pub type MemoryEngine = SyncEngine<Arc<MemoryServer>, InMemoryStore>;

/// An engine talking to a [`MemoryServer`] over a file store.
pub type FileEngine = SyncEngine<Arc<MemoryServer>, FileStore>;

/// Returns the configuration used by the fixtures.
pub fn test_config() -> SyncConfig {
    SyncConfig::new(TEST_ENDPOINT)
}

/// Creates an engine over a fresh in-memory store.
pub fn engine_with_memory(server: &Arc<MemoryServer>) -> MemoryEngine {
    engine_with_store(server, InMemoryStore::new())
}

/// Creates an engine over the given in-memory store.
pub fn engine_with_store(server: &Arc<MemoryServer>, store: InMemoryStore) -> MemoryEngine {
    SyncEngine::open(test_config(), Arc::clone(server), store)
}

/// Opens an engine over a file store in `dir`.
///
/// # Panics
///
/// Panics if the store cannot be opened (for example, still locked by
/// another engine).
pub fn engine_with_file_store(server: &Arc<MemoryServer>, dir: &TempDir) -> FileEngine {
    let store = FileStore::open(dir.path()).expect("Failed to open file store");
    SyncEngine::open(test_config(), Arc::clone(server), store)
}

/// Creates a temporary directory for file-store tests.
///
/// # Panics
///
/// Panics if the directory cannot be created.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A transport that can hold pushes in flight until released.
///
/// While armed, each push signals [`GatedTransport::wait_until_parked`]
/// and then waits for [`GatedTransport::release`] before reaching the
/// inner transport. Pulls pass straight through.
pub struct GatedTransport<T> {
    inner: T,
    armed: AtomicBool,
    parked: Notify,
    released: Notify,
}

impl<T: SyncTransport> GatedTransport<T> {
    /// Wraps `inner` with the gate armed.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(true),
            parked: Notify::new(),
            released: Notify::new(),
        }
    }

    /// Returns the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Waits until a push is parked at the gate.
    pub async fn wait_until_parked(&self) {
        self.parked.notified().await;
    }

    /// Lets one parked push through.
    pub fn release(&self) {
        self.released.notify_one();
    }

    /// Disarms the gate; later pushes pass straight through.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl<T: SyncTransport> SyncTransport for GatedTransport<T> {
    async fn push(&self, auth_token: &str, request: &PushRequest) -> SyncResult<()> {
        if self.armed.load(Ordering::SeqCst) {
            self.parked.notify_one();
            self.released.notified().await;
        }
        self.inner.push(auth_token, request).await
    }

    async fn pull(&self, auth_token: &str) -> SyncResult<PullResponse> {
        self.inner.pull(auth_token).await
    }
}
