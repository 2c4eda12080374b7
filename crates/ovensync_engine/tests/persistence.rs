//! Restart and storage-recovery tests over a file-backed store.

use ovensync_engine::{EntityType, OperationKind, DEFAULT_METADATA_KEY};
use ovensync_storage::{FileStore, StorageError};
use ovensync_testkit::prelude::*;
use serde_json::json;

#[test]
fn pending_operations_survive_restart() {
    let server = MemoryServer::shared();
    let dir = temp_dir();

    let before = {
        let engine = engine_with_file_store(&server, &dir);
        engine
            .record(
                EntityType::Recipe,
                "r1",
                OperationKind::Create,
                Some(json!({"name": "Cake"})),
            )
            .unwrap();
        engine
            .record(EntityType::Order, "o1", OperationKind::Delete, None)
            .unwrap();
        engine.operations()
    };

    let engine = engine_with_file_store(&server, &dir);
    assert_eq!(engine.operations(), before);
    assert_eq!(engine.status().pending_count, 2);
}

#[tokio::test]
async fn push_completion_survives_restart() {
    let server = MemoryServer::shared();
    let dir = temp_dir();

    {
        let engine = engine_with_file_store(&server, &dir);
        engine
            .record(
                EntityType::Recipe,
                "r1",
                OperationKind::Create,
                Some(json!({"name": "Cake"})),
            )
            .unwrap();
        assert!(engine.push(TEST_TOKEN, TEST_USER).await.is_success());
        assert!(engine.pull(TEST_TOKEN).await.is_success());
    }

    let engine = engine_with_file_store(&server, &dir);
    let status = engine.status();
    assert_eq!(status.pending_count, 0);
    assert!(status.last_push_at.is_some());
    assert!(status.last_pull_at.is_some());
    assert!(engine.operations().iter().all(|op| op.synced));

    assert!(engine.push(TEST_TOKEN, TEST_USER).await.pushed() == 0);
    assert_eq!(server.push_count(), 1);
}

#[test]
fn store_is_exclusive_while_engine_is_open() {
    let server = MemoryServer::shared();
    let dir = temp_dir();
    let _engine = engine_with_file_store(&server, &dir);

    let second = FileStore::open(dir.path());
    assert!(matches!(second, Err(StorageError::Locked { .. })));
}

#[test]
fn corrupted_metadata_is_treated_as_absent() {
    let server = MemoryServer::shared();
    let dir = temp_dir();
    std::fs::write(dir.path().join(DEFAULT_METADATA_KEY), b"\x00\x01garbage").unwrap();

    let engine = engine_with_file_store(&server, &dir);
    assert!(engine.operations().is_empty());
    assert_eq!(engine.status().ms_since_last_push, None);

    engine
        .record(
            EntityType::Recipe,
            "r1",
            OperationKind::Create,
            Some(json!({"name": "Cake"})),
        )
        .unwrap();
    drop(engine);

    let engine = engine_with_file_store(&server, &dir);
    assert_eq!(engine.status().pending_count, 1);
}

#[test]
fn clear_removes_durable_state() {
    let server = MemoryServer::shared();
    let dir = temp_dir();

    {
        let engine = engine_with_file_store(&server, &dir);
        engine
            .record(
                EntityType::Customer,
                "c1",
                OperationKind::Create,
                Some(json!({"name": "Ann"})),
            )
            .unwrap();
        engine.clear().unwrap();
    }

    assert!(!dir.path().join(DEFAULT_METADATA_KEY).exists());
    let engine = engine_with_file_store(&server, &dir);
    assert!(engine.operations().is_empty());
}

#[test]
fn duplicate_pending_operations_are_repaired_on_load() {
    let server = MemoryServer::shared();
    let dir = temp_dir();
    let record = json!({
        "lastSyncTimestamp": 0,
        "lastPullTimestamp": 0,
        "pendingOperations": [
            {"id": "a", "entityType": "recipe", "entityId": "r1", "kind": "create",
             "payload": {"name": "Old"}, "recordedAt": 1, "synced": false},
            {"id": "b", "entityType": "recipe", "entityId": "r1", "kind": "update",
             "payload": {"name": "New"}, "recordedAt": 2, "synced": false}
        ]
    });
    std::fs::write(
        dir.path().join(DEFAULT_METADATA_KEY),
        serde_json::to_vec(&record).unwrap(),
    )
    .unwrap();

    let engine = engine_with_file_store(&server, &dir);
    let pending = engine.pending_operations();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "b");
}
