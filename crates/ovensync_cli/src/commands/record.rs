//! Record command implementation.

use super::CliEngine;
use ovensync_engine::{EntityType, OperationKind, RecordOutcome};
use serde_json::Value;
use tracing::info;

/// A parsed `record` invocation.
#[derive(Debug, PartialEq)]
pub struct Change {
    /// Entity type.
    pub entity_type: EntityType,
    /// Operation kind.
    pub kind: OperationKind,
    /// Entity snapshot.
    pub payload: Option<Value>,
}

/// Parses the textual arguments of the `record` command.
pub fn parse_change(
    entity_type: &str,
    kind: &str,
    data: Option<&str>,
) -> Result<Change, Box<dyn std::error::Error>> {
    let entity_type = entity_type.parse::<EntityType>()?;
    let kind = kind.parse::<OperationKind>()?;
    let payload = data
        .map(|d| serde_json::from_str::<Value>(d))
        .transpose()?;

    Ok(Change {
        entity_type,
        kind,
        payload,
    })
}

/// Runs the record command.
pub fn run(
    engine: &CliEngine,
    entity_type: &str,
    entity_id: &str,
    kind: &str,
    data: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let change = parse_change(entity_type, kind, data)?;
    info!("Recording {} {} {}", change.kind, change.entity_type, entity_id);

    let outcome = engine.record(change.entity_type, entity_id, change.kind, change.payload)?;

    let summary = match outcome {
        RecordOutcome::Appended => "queued",
        RecordOutcome::Merged => "merged into pending operation",
        RecordOutcome::Discarded => "cancelled pending create",
        RecordOutcome::Unchanged => "already pending",
    };
    println!("{} {}: {}", change.entity_type, entity_id, summary);
    println!("Pending operations: {}", engine.pending_count());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_create_with_payload() {
        let change = parse_change("recipe", "create", Some(r#"{"name":"Cake"}"#)).unwrap();
        assert_eq!(
            change,
            Change {
                entity_type: EntityType::Recipe,
                kind: OperationKind::Create,
                payload: Some(json!({"name": "Cake"})),
            }
        );
    }

    #[test]
    fn accepts_collection_names() {
        let change = parse_change("orders", "delete", None).unwrap();
        assert_eq!(change.entity_type, EntityType::Order);
        assert_eq!(change.payload, None);
    }

    #[test]
    fn rejects_unknown_names_and_bad_json() {
        assert!(parse_change("bagel", "create", None).is_err());
        assert!(parse_change("recipe", "upsert", None).is_err());
        assert!(parse_change("recipe", "create", Some("{oops")).is_err());
    }
}
