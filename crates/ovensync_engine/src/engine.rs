//! The sync engine: operation recording, push, pull and compaction.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::report::{PullOutcome, PushOutcome, SyncReport, SyncStats, SyncStatus};
use crate::transport::SyncTransport;
use ovensync_protocol::{
    EntityType, Mutation, Operation, OperationKind, ProtocolError, PullResponse, PushRequest,
    RecordOutcome, Snapshot, SyncMetadata,
};
use ovensync_storage::MetadataStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Mutable engine state, guarded by one lock.
#[derive(Debug, Default)]
struct EngineState {
    metadata: SyncMetadata,
    /// IDs of operations inside a push that has not completed yet.
    in_flight: HashSet<String>,
    stats: SyncStats,
    /// Bumped by `clear`; network results from an older epoch are dropped.
    epoch: u64,
}

/// The sync engine manages the operation log and its exchange with the
/// sync server.
///
/// The engine owns its metadata record exclusively. Every read-modify-write
/// of the metadata happens under one lock that is released before any
/// transport call, so recording is never blocked by the network.
/// Persisting does happen under that lock, including the write that
/// completes a push or pull; with a [`FileStore`](ovensync_storage::FileStore)
/// that write is fsynced on the calling task.
///
/// # Example
///
/// ```ignore
/// let engine = SyncEngine::open(config, HttpTransport::from_config(&config)?, store);
/// engine.record(EntityType::Recipe, "r1", OperationKind::Create, Some(json!({"name": "Cake"})))?;
/// let report = engine.sync(&token, &user_id).await;
/// ```
pub struct SyncEngine<T: SyncTransport, S: MetadataStore> {
    config: SyncConfig,
    transport: T,
    store: S,
    state: Mutex<EngineState>,
}

impl<T: SyncTransport, S: MetadataStore> SyncEngine<T, S> {
    /// Opens an engine over `store`, loading any persisted metadata.
    ///
    /// A missing record starts from the empty state. An unreadable or
    /// corrupted record is treated as absent; the engine never fails to open.
    pub fn open(config: SyncConfig, transport: T, store: S) -> Self {
        let metadata = load_metadata(&store, &config.metadata_key);
        debug!(
            key = %config.metadata_key,
            operations = metadata.log.len(),
            pending = metadata.log.pending_count(),
            "opened sync engine"
        );

        Self {
            config,
            transport,
            store,
            state: Mutex::new(EngineState {
                metadata,
                ..EngineState::default()
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the metadata store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a local change to an entity.
    ///
    /// The change is merged with the entity's pending operation, if any,
    /// so that at most one unsynced operation exists per entity. The
    /// metadata is durable before this returns.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidOperation`] for an empty entity ID, a create or
    ///   update without payload, or an update after a pending delete
    /// - [`SyncError::Storage`] if the metadata could not be persisted; the
    ///   log is rolled back and the change is not recorded
    pub fn record(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        kind: OperationKind,
        payload: Option<Value>,
    ) -> SyncResult<RecordOutcome> {
        let mutation = Mutation::new(kind, payload)
            .map_err(|e| invalid_operation(entity_type, entity_id, e))?;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let previous = state.metadata.log.clone();

        let outcome = state
            .metadata
            .log
            .record(entity_type, entity_id, mutation, now_millis(), &state.in_flight)
            .map_err(|e| invalid_operation(entity_type, entity_id, e))?;

        debug!(%entity_type, entity_id, %kind, ?outcome, "recorded operation");

        if outcome == RecordOutcome::Unchanged {
            return Ok(outcome);
        }

        if let Err(e) = self.persist(&state.metadata) {
            error!(%entity_type, entity_id, error = %e, "failed to persist recorded operation");
            state.metadata.log = previous;
            return Err(e);
        }

        Ok(outcome)
    }

    /// Pushes every unsynced operation to the server.
    ///
    /// Never fails: transport errors and rejections are reported in the
    /// outcome and leave every operation pending, verbatim. On success the
    /// sent operations are marked synced unless they were changed while the
    /// request was in flight, the push watermark is advanced and the log is
    /// compacted.
    pub async fn push(&self, auth_token: &str, user_id: &str) -> PushOutcome {
        let (request, sent, epoch) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let batch: Vec<&Operation> = state
                .metadata
                .log
                .pending()
                .filter(|op| !state.in_flight.contains(&op.id))
                .collect();

            if batch.is_empty() {
                debug!("nothing to push");
                return PushOutcome::NothingPending;
            }

            let request = PushRequest::from_operations(user_id, batch.iter().copied(), now_millis());
            let sent: HashSet<String> = batch.iter().map(|op| op.id.clone()).collect();
            state.in_flight.extend(sent.iter().cloned());
            (request, sent, state.epoch)
        };

        debug!(operations = sent.len(), "pushing operations");
        let result = self.transport.push(auth_token, &request).await;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        for id in &sent {
            state.in_flight.remove(id);
        }

        if let Err(e) = result {
            warn!(error = %e, retryable = e.is_retryable(), "push failed");
            if state.epoch == epoch {
                state.stats.pushes_failed += 1;
                state.stats.last_error = Some(e.to_string());
            }
            return PushOutcome::Failed(e);
        }

        let operations = sent.len();
        if state.epoch != epoch {
            debug!(operations, "metadata cleared during push; result not applied");
            return PushOutcome::Pushed { operations };
        }

        let marked = state.metadata.log.mark_synced(&sent);
        state.metadata.last_push_at = advance(state.metadata.last_push_at);
        let compacted = state.metadata.log.compact(self.config.history_limit);

        state.stats.pushes_completed += 1;
        state.stats.operations_pushed += operations as u64;
        state.stats.operations_compacted += compacted as u64;

        if let Err(e) = self.persist(&state.metadata) {
            error!(error = %e, "failed to persist push completion");
            state.stats.last_error = Some(e.to_string());
        }

        info!(operations, marked, compacted, "push completed");
        PushOutcome::Pushed { operations }
    }

    /// Pulls the server's full snapshot.
    ///
    /// Never fails: errors are reported in the outcome. The pull watermark is
    /// advanced only when a snapshot was received. Reconciling the snapshot
    /// with pending local edits is up to the caller; see [`Self::has_pending`].
    ///
    /// Takes no user id: the snapshot request is a bare `GET` identified by
    /// the bearer token alone.
    pub async fn pull(&self, auth_token: &str) -> PullOutcome {
        let epoch = self.state.lock().epoch;

        let result = match self.transport.pull(auth_token).await {
            Ok(response) => response_snapshot(response),
            Err(e) => Err(e),
        };

        let mut state = self.state.lock();
        match result {
            Ok(snapshot) => {
                if state.epoch != epoch {
                    debug!("metadata cleared during pull; watermark not advanced");
                    return PullOutcome::Pulled(snapshot);
                }

                state.metadata.last_pull_at = advance(state.metadata.last_pull_at);
                state.stats.pulls_completed += 1;

                if let Err(e) = self.persist(&state.metadata) {
                    error!(error = %e, "failed to persist pull completion");
                    state.stats.last_error = Some(e.to_string());
                }

                info!(entities = snapshot.entity_count(), "pull completed");
                PullOutcome::Pulled(snapshot)
            }
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "pull failed");
                if state.epoch == epoch {
                    state.stats.pulls_failed += 1;
                    state.stats.last_error = Some(e.to_string());
                }
                PullOutcome::Failed(e)
            }
        }
    }

    /// Runs a push followed by a pull. The pull runs even if the push fails.
    pub async fn sync(&self, auth_token: &str, user_id: &str) -> SyncReport {
        let pushed = self.push(auth_token, user_id).await;
        let pulled = self.pull(auth_token).await;
        SyncReport { pushed, pulled }
    }

    /// Drops synced history beyond the configured limit.
    ///
    /// Returns the number of operations removed.
    pub fn compact(&self) -> SyncResult<usize> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let previous = state.metadata.log.clone();

        let removed = state.metadata.log.compact(self.config.history_limit);
        if removed == 0 {
            return Ok(0);
        }

        if let Err(e) = self.persist(&state.metadata) {
            error!(error = %e, "failed to persist compaction");
            state.metadata.log = previous;
            return Err(e);
        }

        state.stats.operations_compacted += removed as u64;
        debug!(removed, "compacted operation log");
        Ok(removed)
    }

    /// Returns the pending count and the age of both watermarks.
    pub fn status(&self) -> SyncStatus {
        let state = self.state.lock();
        let now = now_millis();
        let watermark = |at: u64| (at != 0).then_some(at);

        let last_push_at = watermark(state.metadata.last_push_at);
        let last_pull_at = watermark(state.metadata.last_pull_at);

        SyncStatus {
            pending_count: state.metadata.log.pending_count(),
            ms_since_last_push: last_push_at.map(|at| now.saturating_sub(at)),
            ms_since_last_pull: last_pull_at.map(|at| now.saturating_sub(at)),
            last_push_at,
            last_pull_at,
        }
    }

    /// Wipes all sync state, for sign-out.
    ///
    /// In-memory state is reset even if removing the durable record fails.
    /// Results of pushes and pulls still in flight are discarded.
    pub fn clear(&self) -> SyncResult<()> {
        let mut state = self.state.lock();
        let epoch = state.epoch.wrapping_add(1);
        *state = EngineState {
            epoch,
            ..EngineState::default()
        };

        self.store.remove(&self.config.metadata_key).map_err(|e| {
            error!(error = %e, "failed to remove sync metadata");
            SyncError::from(e)
        })?;

        info!("cleared sync metadata");
        Ok(())
    }

    /// Returns the unsynced operations in log order.
    pub fn pending_operations(&self) -> Vec<Operation> {
        self.state.lock().metadata.log.pending().cloned().collect()
    }

    /// Returns the full log, synced and unsynced.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().metadata.log.entries().to_vec()
    }

    /// Returns true if the entity has an unsynced local change.
    pub fn has_pending(&self, entity_type: EntityType, entity_id: &str) -> bool {
        self.state
            .lock()
            .metadata
            .log
            .pending_for(entity_type, entity_id)
            .is_some()
    }

    /// Returns the number of unsynced operations.
    pub fn pending_count(&self) -> usize {
        self.state.lock().metadata.log.pending_count()
    }

    /// Returns sync statistics.
    pub fn stats(&self) -> SyncStats {
        self.state.lock().stats.clone()
    }

    fn persist(&self, metadata: &SyncMetadata) -> SyncResult<()> {
        let bytes = metadata
            .encode()
            .map_err(|e| SyncError::Codec(e.to_string()))?;
        self.store.write(&self.config.metadata_key, &bytes)?;
        Ok(())
    }
}

fn load_metadata<S: MetadataStore>(store: &S, key: &str) -> SyncMetadata {
    match store.read(key) {
        Ok(None) => SyncMetadata::new(),
        Ok(Some(bytes)) => SyncMetadata::decode(&bytes).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding unreadable sync metadata");
            SyncMetadata::new()
        }),
        Err(e) => {
            warn!(key, error = %e, "failed to read sync metadata; starting empty");
            SyncMetadata::new()
        }
    }
}

fn response_snapshot(response: PullResponse) -> SyncResult<Snapshot> {
    match response {
        PullResponse {
            success: true,
            data: Some(snapshot),
            ..
        } => Ok(snapshot),
        PullResponse { success: true, .. } => {
            Err(SyncError::ServerError("pull response carried no data".into()))
        }
        PullResponse { error, .. } => Err(SyncError::ServerError(
            error.unwrap_or_else(|| "server reported failure".into()),
        )),
    }
}

fn invalid_operation(entity_type: EntityType, entity_id: &str, err: ProtocolError) -> SyncError {
    error!(%entity_type, entity_id, error = %err, "rejected invalid operation");
    SyncError::InvalidOperation(err)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Next value of a watermark: the current time, but always past `previous`.
fn advance(previous: u64) -> u64 {
    now_millis().max(previous.saturating_add(1))
}
