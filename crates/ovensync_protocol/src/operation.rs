//! Recorded operations.

use crate::entity::{EntityType, OperationKind};
use crate::error::{ProtocolError, ProtocolResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A single recorded mutation against one entity.
///
/// # Fields
///
/// - `id`: Unique operation identifier, regenerated whenever the operation
///   absorbs a newer change
/// - `entity_type` / `entity_id`: The affected entity
/// - `kind`: Create, update or delete
/// - `payload`: Full entity snapshot (absent for deletes)
/// - `recorded_at`: Client wall-clock milliseconds of the latest change
/// - `synced`: Whether a push has delivered this operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation ID.
    pub id: String,
    /// Entity type.
    pub entity_type: EntityType,
    /// Entity ID.
    pub entity_id: String,
    /// Operation kind.
    pub kind: OperationKind,
    /// Entity snapshot (for creates and updates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Recording time, Unix millis.
    pub recorded_at: u64,
    /// Delivered to the server.
    #[serde(default)]
    pub synced: bool,
}

impl Operation {
    /// Creates a new unsynced operation with a freshly generated ID.
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        mutation: Mutation,
        recorded_at: u64,
    ) -> Self {
        let entity_id = entity_id.into();
        Self {
            id: Self::generate_id(entity_type, &entity_id, recorded_at),
            entity_type,
            entity_id,
            kind: mutation.kind,
            payload: mutation.payload,
            recorded_at,
            synced: false,
        }
    }

    /// Builds an operation ID: `<type>_<entity>_<millis>_<random>`.
    ///
    /// The random suffix keeps IDs unique for repeated calls within the
    /// same millisecond.
    pub fn generate_id(entity_type: EntityType, entity_id: &str, now: u64) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        format!("{entity_type}_{entity_id}_{now}_{suffix}")
    }

    /// Returns true if this operation refers to the given entity.
    pub fn targets(&self, entity_type: EntityType, entity_id: &str) -> bool {
        self.entity_type == entity_type && self.entity_id == entity_id
    }
}

/// A validated change, ready to be recorded.
///
/// Creates and updates always carry a payload; deletes never do.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    kind: OperationKind,
    payload: Option<Value>,
}

impl Mutation {
    /// Validates a kind/payload pair.
    ///
    /// A payload given with a delete is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingPayload`] for a create or update
    /// without a payload.
    pub fn new(kind: OperationKind, payload: Option<Value>) -> ProtocolResult<Self> {
        match (kind.requires_payload(), payload) {
            (true, None) => Err(ProtocolError::MissingPayload { kind }),
            (true, Some(payload)) => Ok(Self {
                kind,
                payload: Some(payload),
            }),
            (false, _) => Ok(Self::delete()),
        }
    }

    /// A create carrying `payload`.
    pub fn create(payload: Value) -> Self {
        Self {
            kind: OperationKind::Create,
            payload: Some(payload),
        }
    }

    /// An update carrying `payload`.
    pub fn update(payload: Value) -> Self {
        Self {
            kind: OperationKind::Update,
            payload: Some(payload),
        }
    }

    /// A delete.
    pub fn delete() -> Self {
        Self {
            kind: OperationKind::Delete,
            payload: None,
        }
    }

    /// Returns the mutation kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub(crate) fn into_payload(self) -> Option<Value> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_ids_are_unique() {
        let a = Operation::generate_id(EntityType::Recipe, "r1", 1000);
        let b = Operation::generate_id(EntityType::Recipe, "r1", 1000);

        assert_ne!(a, b);
        assert!(a.starts_with("recipe_r1_1000_"));
        assert_eq!(a.len(), "recipe_r1_1000_".len() + ID_SUFFIX_LEN);
    }

    #[test]
    fn mutation_requires_payload() {
        assert!(matches!(
            Mutation::new(OperationKind::Create, None),
            Err(ProtocolError::MissingPayload {
                kind: OperationKind::Create
            })
        ));
        assert!(Mutation::new(OperationKind::Update, None).is_err());
        assert!(Mutation::new(OperationKind::Delete, None).is_ok());
    }

    #[test]
    fn delete_drops_payload() {
        let mutation = Mutation::new(OperationKind::Delete, Some(json!({"x": 1}))).unwrap();
        assert_eq!(mutation.payload(), None);
    }

    #[test]
    fn stored_layout_is_camel_case() {
        let op = Operation::new(
            EntityType::Order,
            "o1",
            Mutation::create(json!({"total": 12})),
            42,
        );
        let value = serde_json::to_value(&op).unwrap();

        assert_eq!(value["entityType"], "order");
        assert_eq!(value["entityId"], "o1");
        assert_eq!(value["kind"], "create");
        assert_eq!(value["recordedAt"], 42);
        assert_eq!(value["synced"], false);
    }

    #[test]
    fn delete_omits_payload_field() {
        let op = Operation::new(EntityType::Order, "o1", Mutation::delete(), 42);
        let value = serde_json::to_value(&op).unwrap();
        assert!(value.get("payload").is_none());
    }
}
