//! Property-based test generators using proptest.
//!
//! Entity ids are drawn from a small pool so that generated sequences hit
//! the same entity repeatedly and exercise the merge rules.

use ovensync_protocol::{EntityType, OperationKind};
use proptest::prelude::*;
use serde_json::{json, Value};

/// One call to `SyncEngine::record`.
#[derive(Debug, Clone)]
pub struct RecordStep {
    /// Entity type.
    pub entity_type: EntityType,
    /// Entity id.
    pub entity_id: String,
    /// Operation kind.
    pub kind: OperationKind,
    /// Payload; always present for creates and updates.
    pub payload: Option<Value>,
}

/// Strategy for generating entity types.
pub fn entity_type_strategy() -> impl Strategy<Value = EntityType> {
    prop::sample::select(EntityType::ALL.to_vec())
}

/// Strategy for generating operation kinds.
pub fn operation_kind_strategy() -> impl Strategy<Value = OperationKind> {
    prop_oneof![
        Just(OperationKind::Create),
        Just(OperationKind::Update),
        Just(OperationKind::Delete),
    ]
}

/// Strategy for generating entity ids from a small pool.
pub fn entity_id_strategy() -> impl Strategy<Value = String> {
    (0u8..4).prop_map(|n| format!("e{n}"))
}

/// Strategy for generating entity payloads.
pub fn payload_strategy() -> impl Strategy<Value = Value> {
    (
        prop::string::string_regex("[A-Za-z ]{1,16}").expect("Invalid regex"),
        0u32..10_000,
    )
        .prop_map(|(name, quantity)| json!({ "name": name, "quantity": quantity }))
}

/// Strategy for generating a single valid record step.
pub fn record_step_strategy() -> impl Strategy<Value = RecordStep> {
    (
        entity_type_strategy(),
        entity_id_strategy(),
        operation_kind_strategy(),
        payload_strategy(),
    )
        .prop_map(|(entity_type, entity_id, kind, payload)| RecordStep {
            entity_type,
            entity_id,
            kind,
            payload: (kind != OperationKind::Delete).then_some(payload),
        })
}

/// Strategy for generating sequences of record steps.
pub fn record_steps_strategy(max_len: usize) -> impl Strategy<Value = Vec<RecordStep>> {
    prop::collection::vec(record_step_strategy(), 0..max_len)
}
