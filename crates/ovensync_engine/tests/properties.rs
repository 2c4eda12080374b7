//! Property tests for recording and pushing arbitrary edit sequences.

use ovensync_engine::{EntityType, OperationKind, SyncError};
use ovensync_testkit::prelude::*;
use proptest::prelude::*;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Applies a step to the model of what the server should finally hold.
fn apply(model: &mut HashMap<(EntityType, String), Option<Value>>, step: &RecordStep) {
    let key = (step.entity_type, step.entity_id.clone());
    match step.kind {
        OperationKind::Delete => {
            model.insert(key, None);
        }
        OperationKind::Create | OperationKind::Update => {
            model.insert(key, step.payload.clone());
        }
    }
}

fn with_id(id: &str, payload: Value) -> Value {
    let mut payload = payload;
    if let Value::Object(fields) = &mut payload {
        fields.insert("id".into(), Value::String(id.to_string()));
    }
    payload
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn at_most_one_pending_operation_per_entity(steps in record_steps_strategy(40)) {
        let server = MemoryServer::shared();
        let engine = engine_with_memory(&server);

        for step in &steps {
            let _ = engine.record(step.entity_type, &step.entity_id, step.kind, step.payload.clone());
        }

        let pending = engine.pending_operations();
        let entities: HashSet<_> = pending
            .iter()
            .map(|op| (op.entity_type, op.entity_id.clone()))
            .collect();
        prop_assert_eq!(entities.len(), pending.len());
        prop_assert!(pending.iter().all(|op| op.kind == OperationKind::Delete || op.payload.is_some()));
    }

    #[test]
    fn only_update_after_delete_is_rejected(steps in record_steps_strategy(40)) {
        let server = MemoryServer::shared();
        let engine = engine_with_memory(&server);

        for step in &steps {
            let pending_delete = engine
                .pending_operations()
                .iter()
                .any(|op| op.targets(step.entity_type, &step.entity_id) && op.kind == OperationKind::Delete);
            let result = engine.record(step.entity_type, &step.entity_id, step.kind, step.payload.clone());

            let expect_rejection = pending_delete && step.kind == OperationKind::Update;
            prop_assert_eq!(matches!(result, Err(SyncError::InvalidOperation(_))), expect_rejection);
        }
    }

    #[test]
    fn failed_push_leaves_log_verbatim(steps in record_steps_strategy(30)) {
        let server = MemoryServer::shared();
        let engine = engine_with_memory(&server);
        for step in &steps {
            let _ = engine.record(step.entity_type, &step.entity_id, step.kind, step.payload.clone());
        }
        let before = engine.operations();

        server.set_online(false);
        let outcome = runtime().block_on(engine.push(TEST_TOKEN, TEST_USER));

        prop_assert!(!outcome.is_success());
        prop_assert_eq!(engine.operations(), before);
    }

    #[test]
    fn server_converges_to_last_write(
        first in record_steps_strategy(25),
        second in record_steps_strategy(25),
    ) {
        let server = MemoryServer::shared();
        let engine = engine_with_memory(&server);
        let rt = runtime();
        let mut model = HashMap::new();

        for batch in [&first, &second] {
            for step in batch.iter() {
                let mut step = step.clone();
                // Entities the server already holds are edited, not created.
                if step.kind == OperationKind::Create
                    && server.document(step.entity_type, &step.entity_id).is_some()
                {
                    step.kind = OperationKind::Update;
                }
                let step = &step;
                let result = engine.record(step.entity_type, &step.entity_id, step.kind, step.payload.clone());
                if result.is_ok() {
                    apply(&mut model, step);
                }
            }
            rt.block_on(engine.push(TEST_TOKEN, TEST_USER));
            prop_assert_eq!(engine.status().pending_count, 0);
        }

        for ((entity_type, entity_id), expected) in model {
            let expected = expected.map(|payload| with_id(&entity_id, payload));
            prop_assert_eq!(server.document(entity_type, &entity_id), expected);
        }
    }
}
