//! Merge reducer for pending operations.
//!
//! When a change is recorded for an entity that already has an unsynced
//! operation, the two collapse into at most one operation:
//!
//! | existing | incoming        | result                          |
//! |----------|-----------------|---------------------------------|
//! | create   | create / update | create with the new payload     |
//! | create   | delete          | removed (never reached server)  |
//! | update   | create / update | update with the new payload     |
//! | update   | delete          | delete                          |
//! | delete   | create          | update with the new payload     |
//! | delete   | update          | rejected                        |
//! | delete   | delete          | unchanged                       |
//!
//! A create that is part of an in-flight push counts as shipped: the
//! server may already hold the entity, so it is treated as an update.
//! A create after a pending delete is sent as an update for the same
//! reason; a later delete must still reach the server.

use crate::entity::OperationKind;
use crate::operation::Mutation;
use serde_json::Value;

/// Outcome of folding an incoming change into an existing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    /// Rewrite the existing operation.
    Replace {
        /// Resulting kind.
        kind: OperationKind,
        /// Resulting payload.
        payload: Option<Value>,
    },
    /// Drop the existing operation; nothing needs to be sent.
    Remove,
    /// Leave the existing operation as it is.
    Keep,
    /// The change is not allowed after a pending delete.
    Reject,
}

/// Folds `incoming` into an existing unsynced operation of kind `existing`.
///
/// `shipped` is true when the existing operation is part of a push that
/// has not completed yet.
pub fn merge(existing: OperationKind, incoming: Mutation, shipped: bool) -> MergeDecision {
    use OperationKind::{Create, Delete, Update};

    let existing = match existing {
        Create if shipped => Update,
        kind => kind,
    };

    match (existing, incoming.kind()) {
        (Create, Create | Update) => MergeDecision::Replace {
            kind: Create,
            payload: incoming.into_payload(),
        },
        (Create, Delete) => MergeDecision::Remove,
        (Update, Create | Update) => MergeDecision::Replace {
            kind: Update,
            payload: incoming.into_payload(),
        },
        (Update, Delete) => MergeDecision::Replace {
            kind: Delete,
            payload: None,
        },
        (Delete, Create) => MergeDecision::Replace {
            kind: Update,
            payload: incoming.into_payload(),
        },
        (Delete, Update) => MergeDecision::Reject,
        (Delete, Delete) => MergeDecision::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_then_update_stays_create() {
        let decision = merge(
            OperationKind::Create,
            Mutation::update(json!({"name": "v2"})),
            false,
        );
        assert_eq!(
            decision,
            MergeDecision::Replace {
                kind: OperationKind::Create,
                payload: Some(json!({"name": "v2"})),
            }
        );
    }

    #[test]
    fn create_then_delete_removes() {
        let decision = merge(OperationKind::Create, Mutation::delete(), false);
        assert_eq!(decision, MergeDecision::Remove);
    }

    #[test]
    fn shipped_create_then_delete_becomes_delete() {
        let decision = merge(OperationKind::Create, Mutation::delete(), true);
        assert_eq!(
            decision,
            MergeDecision::Replace {
                kind: OperationKind::Delete,
                payload: None,
            }
        );
    }

    #[test]
    fn update_then_update_replaces_payload() {
        let decision = merge(OperationKind::Update, Mutation::update(json!(2)), false);
        assert_eq!(
            decision,
            MergeDecision::Replace {
                kind: OperationKind::Update,
                payload: Some(json!(2)),
            }
        );
    }

    #[test]
    fn update_then_delete_becomes_delete() {
        let decision = merge(OperationKind::Update, Mutation::delete(), false);
        assert_eq!(
            decision,
            MergeDecision::Replace {
                kind: OperationKind::Delete,
                payload: None,
            }
        );
    }

    #[test]
    fn delete_is_terminal_for_updates() {
        assert_eq!(
            merge(OperationKind::Delete, Mutation::update(json!(1)), false),
            MergeDecision::Reject
        );
        assert_eq!(
            merge(OperationKind::Delete, Mutation::delete(), false),
            MergeDecision::Keep
        );
    }

    #[test]
    fn create_after_delete_reopens_as_update() {
        let decision = merge(OperationKind::Delete, Mutation::create(json!(3)), false);
        assert_eq!(
            decision,
            MergeDecision::Replace {
                kind: OperationKind::Update,
                payload: Some(json!(3)),
            }
        );
    }
}
