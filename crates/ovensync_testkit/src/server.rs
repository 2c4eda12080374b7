//! In-process sync server.
//!
//! Stands in for the remote sync endpoint and its document store. Every
//! collection is a map from entity id to document: create and update
//! upsert, delete removes.

use async_trait::async_trait;
use ovensync_engine::{SyncError, SyncResult, SyncTransport};
use ovensync_protocol::{EntityType, OperationKind, PullResponse, PushRequest, Snapshot};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A scripted failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The request never reaches the server.
    Network,
    /// The server answers with this HTTP status.
    Status(u16),
}

impl Failure {
    fn into_error(self) -> SyncError {
        match self {
            Failure::Network => SyncError::transport_retryable("connection refused"),
            Failure::Status(status) => SyncError::Rejected { status },
        }
    }
}

#[derive(Debug, Default)]
struct ServerState {
    online: bool,
    collections: HashMap<EntityType, BTreeMap<String, Value>>,
    settings: Map<String, Value>,
    pushes: Vec<(String, PushRequest)>,
    pull_tokens: Vec<String>,
    push_failures: Vec<Failure>,
    pull_failures: Vec<Failure>,
}

/// An in-memory sync server.
#[derive(Debug)]
pub struct MemoryServer {
    state: Mutex<ServerState>,
}

impl MemoryServer {
    /// Creates an empty, online server.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServerState {
                online: true,
                ..ServerState::default()
            }),
        }
    }

    /// Creates an empty server behind an `Arc`, ready to be shared with engines.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Switches the server on or off. An offline server fails with a
    /// network error without recording the request.
    pub fn set_online(&self, online: bool) {
        self.state.lock().online = online;
    }

    /// Fails the next `count` pushes with `failure`.
    pub fn fail_next_pushes(&self, count: usize, failure: Failure) {
        let mut state = self.state.lock();
        state.push_failures.extend(std::iter::repeat(failure).take(count));
    }

    /// Fails the next `count` pulls with `failure`.
    pub fn fail_next_pulls(&self, count: usize, failure: Failure) {
        let mut state = self.state.lock();
        state.pull_failures.extend(std::iter::repeat(failure).take(count));
    }

    /// Stores a document directly, as if another client had pushed it.
    pub fn seed(&self, entity_type: EntityType, id: &str, document: Value) {
        let document = with_id(id, document);
        self.state
            .lock()
            .collections
            .entry(entity_type)
            .or_default()
            .insert(id.to_string(), document);
    }

    /// Stores a top-level settings object served with every snapshot.
    pub fn set_setting(&self, key: &str, value: Value) {
        self.state.lock().settings.insert(key.to_string(), value);
    }

    /// Returns a stored document.
    pub fn document(&self, entity_type: EntityType, id: &str) -> Option<Value> {
        self.state
            .lock()
            .collections
            .get(&entity_type)
            .and_then(|c| c.get(id))
            .cloned()
    }

    /// Returns the number of documents in a collection.
    pub fn document_count(&self, entity_type: EntityType) -> usize {
        self.state
            .lock()
            .collections
            .get(&entity_type)
            .map_or(0, BTreeMap::len)
    }

    /// Returns every push request that reached the server, accepted or not.
    pub fn pushes(&self) -> Vec<PushRequest> {
        self.state
            .lock()
            .pushes
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Returns the number of pushes that reached the server.
    pub fn push_count(&self) -> usize {
        self.state.lock().pushes.len()
    }

    /// Returns the number of pulls that reached the server.
    pub fn pull_count(&self) -> usize {
        self.state.lock().pull_tokens.len()
    }

    /// Returns the auth tokens of every request that reached the server.
    pub fn tokens(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .pushes
            .iter()
            .map(|(token, _)| token.clone())
            .chain(state.pull_tokens.iter().cloned())
            .collect()
    }

    /// Builds the snapshot a pull would return.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        let collection = |entity_type: EntityType| -> Vec<Value> {
            state
                .collections
                .get(&entity_type)
                .map(|c| c.values().cloned().collect())
                .unwrap_or_default()
        };

        Snapshot {
            recipes: collection(EntityType::Recipe),
            orders: collection(EntityType::Order),
            customers: collection(EntityType::Customer),
            ingredients: collection(EntityType::Ingredient),
            inventory: collection(EntityType::Inventory),
            settings: state.settings.clone(),
        }
    }
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

fn with_id(id: &str, document: Value) -> Value {
    match document {
        Value::Object(mut fields) => {
            fields
                .entry("id")
                .or_insert_with(|| Value::String(id.to_string()));
            Value::Object(fields)
        }
        other => other,
    }
}

fn take_failure(failures: &mut Vec<Failure>) -> Option<Failure> {
    if failures.is_empty() {
        None
    } else {
        Some(failures.remove(0))
    }
}

#[async_trait]
impl SyncTransport for MemoryServer {
    async fn push(&self, auth_token: &str, request: &PushRequest) -> SyncResult<()> {
        let mut state = self.state.lock();
        if !state.online {
            return Err(Failure::Network.into_error());
        }
        if let Some(failure) = take_failure(&mut state.push_failures) {
            if failure != Failure::Network {
                state
                    .pushes
                    .push((auth_token.to_string(), request.clone()));
            }
            return Err(failure.into_error());
        }

        state
            .pushes
            .push((auth_token.to_string(), request.clone()));

        for entity_type in EntityType::ALL {
            let collection = state.collections.entry(entity_type).or_default();
            for item in request.group(entity_type) {
                match (item.action, &item.data) {
                    (OperationKind::Delete, _) => {
                        collection.remove(&item.id);
                    }
                    (_, Some(data)) => {
                        collection.insert(item.id.clone(), with_id(&item.id, data.clone()));
                    }
                    (_, None) => {
                        return Err(SyncError::Rejected { status: 400 });
                    }
                }
            }
        }

        Ok(())
    }

    async fn pull(&self, auth_token: &str) -> SyncResult<PullResponse> {
        {
            let mut state = self.state.lock();
            if !state.online {
                return Err(Failure::Network.into_error());
            }
            if let Some(failure) = take_failure(&mut state.pull_failures) {
                return Err(failure.into_error());
            }
            state.pull_tokens.push(auth_token.to_string());
        }

        Ok(PullResponse::success(self.snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovensync_protocol::{Mutation, Operation};
    use serde_json::json;

    fn request(ops: &[Operation]) -> PushRequest {
        PushRequest::from_operations("u1", ops, 0)
    }

    #[tokio::test]
    async fn push_upserts_and_deletes() {
        let server = MemoryServer::new();
        let create = Operation::new(
            EntityType::Recipe,
            "r1",
            Mutation::create(json!({"name": "Cake"})),
            1,
        );
        server.push("t", &request(&[create])).await.unwrap();
        assert_eq!(
            server.document(EntityType::Recipe, "r1"),
            Some(json!({"id": "r1", "name": "Cake"}))
        );

        let delete = Operation::new(EntityType::Recipe, "r1", Mutation::delete(), 2);
        server.push("t", &request(&[delete])).await.unwrap();
        assert_eq!(server.document_count(EntityType::Recipe), 0);
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let server = MemoryServer::new();
        server.fail_next_pushes(1, Failure::Status(503));
        server.fail_next_pushes(1, Failure::Network);

        let empty = request(&[]);
        assert!(matches!(
            server.push("t", &empty).await,
            Err(SyncError::Rejected { status: 503 })
        ));
        assert!(matches!(
            server.push("t", &empty).await,
            Err(SyncError::Transport { .. })
        ));
        assert!(server.push("t", &empty).await.is_ok());
        assert_eq!(server.push_count(), 2);
    }

    #[tokio::test]
    async fn pull_serves_seeded_documents_and_settings() {
        let server = MemoryServer::new();
        server.seed(EntityType::Order, "o1", json!({"total": 3}));
        server.set_setting("businessSettings", json!({"currency": "EUR"}));

        let response = server.pull("t").await.unwrap();
        let snapshot = response.data.unwrap();
        assert_eq!(snapshot.orders, vec![json!({"id": "o1", "total": 3})]);
        assert_eq!(snapshot.settings["businessSettings"]["currency"], "EUR");
        assert_eq!(server.tokens(), vec!["t".to_string()]);
    }

    #[tokio::test]
    async fn offline_server_fails_everything() {
        let server = MemoryServer::new();
        server.set_online(false);

        assert!(server.push("t", &request(&[])).await.is_err());
        assert!(server.pull("t").await.is_err());
        assert_eq!(server.push_count(), 0);
        assert_eq!(server.pull_count(), 0);
    }
}
