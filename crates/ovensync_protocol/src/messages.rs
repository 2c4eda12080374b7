//! Push and pull wire messages.

use crate::entity::{EntityType, OperationKind};
use crate::operation::Operation;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One operation as sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushItem {
    /// Operation kind.
    pub action: OperationKind,
    /// Entity ID.
    pub id: String,
    /// Entity snapshot (absent for deletes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&Operation> for PushItem {
    fn from(op: &Operation) -> Self {
        Self {
            action: op.kind,
            id: op.entity_id.clone(),
            data: op.payload.clone(),
        }
    }
}

/// Body of the push request.
///
/// Operations are grouped by entity type; each group keeps recording order.
/// All five groups are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    /// Account the operations belong to.
    pub user_id: String,
    /// Send time, ISO-8601 UTC.
    pub timestamp: String,
    /// Recipe operations.
    #[serde(default)]
    pub recipes: Vec<PushItem>,
    /// Order operations.
    #[serde(default)]
    pub orders: Vec<PushItem>,
    /// Customer operations.
    #[serde(default)]
    pub customers: Vec<PushItem>,
    /// Ingredient operations.
    #[serde(default)]
    pub ingredients: Vec<PushItem>,
    /// Inventory operations.
    #[serde(default)]
    pub inventory: Vec<PushItem>,
}

impl PushRequest {
    /// Builds a request from pending operations.
    ///
    /// `now` is Unix millis and becomes the ISO-8601 `timestamp`.
    pub fn from_operations<'a>(
        user_id: impl Into<String>,
        operations: impl IntoIterator<Item = &'a Operation>,
        now: u64,
    ) -> Self {
        let mut request = Self {
            user_id: user_id.into(),
            timestamp: iso_timestamp(now),
            recipes: Vec::new(),
            orders: Vec::new(),
            customers: Vec::new(),
            ingredients: Vec::new(),
            inventory: Vec::new(),
        };

        for op in operations {
            request.group_mut(op.entity_type).push(PushItem::from(op));
        }

        request
    }

    /// Returns the group for an entity type.
    pub fn group(&self, entity_type: EntityType) -> &[PushItem] {
        match entity_type {
            EntityType::Recipe => &self.recipes,
            EntityType::Order => &self.orders,
            EntityType::Customer => &self.customers,
            EntityType::Ingredient => &self.ingredients,
            EntityType::Inventory => &self.inventory,
        }
    }

    fn group_mut(&mut self, entity_type: EntityType) -> &mut Vec<PushItem> {
        match entity_type {
            EntityType::Recipe => &mut self.recipes,
            EntityType::Order => &mut self.orders,
            EntityType::Customer => &mut self.customers,
            EntityType::Ingredient => &mut self.ingredients,
            EntityType::Inventory => &mut self.inventory,
        }
    }

    /// Returns the total number of operations across groups.
    pub fn len(&self) -> usize {
        EntityType::ALL.iter().map(|t| self.group(*t).len()).sum()
    }

    /// Returns true if no group holds an operation.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn iso_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The server's full dataset.
///
/// The five entity collections are typed; every other top-level key
/// (business settings, preferences, ...) is kept verbatim in `settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All recipes.
    #[serde(default)]
    pub recipes: Vec<Value>,
    /// All orders.
    #[serde(default)]
    pub orders: Vec<Value>,
    /// All customers.
    #[serde(default)]
    pub customers: Vec<Value>,
    /// All ingredients.
    #[serde(default)]
    pub ingredients: Vec<Value>,
    /// All inventory records.
    #[serde(default)]
    pub inventory: Vec<Value>,
    /// Settings objects and any other keys.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl Snapshot {
    /// Returns the collection for an entity type.
    pub fn collection(&self, entity_type: EntityType) -> &[Value] {
        match entity_type {
            EntityType::Recipe => &self.recipes,
            EntityType::Order => &self.orders,
            EntityType::Customer => &self.customers,
            EntityType::Ingredient => &self.ingredients,
            EntityType::Inventory => &self.inventory,
        }
    }

    /// Returns the total number of entities across collections.
    pub fn entity_count(&self) -> usize {
        EntityType::ALL
            .iter()
            .map(|t| self.collection(*t).len())
            .sum()
    }
}

/// Body of the pull response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// Whether the server produced a snapshot.
    pub success: bool,
    /// The snapshot, present on success.
    #[serde(default)]
    pub data: Option<Snapshot>,
    /// Server-provided failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PullResponse {
    /// Creates a successful response.
    pub fn success(snapshot: Snapshot) -> Self {
        Self {
            success: true,
            data: Some(snapshot),
            error: None,
        }
    }

    /// Creates a failed response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Mutation;
    use serde_json::json;

    #[test]
    fn push_request_groups_by_type() {
        let ops = vec![
            Operation::new(EntityType::Recipe, "r1", Mutation::create(json!({"n": 1})), 1),
            Operation::new(EntityType::Order, "o1", Mutation::delete(), 2),
            Operation::new(EntityType::Recipe, "r2", Mutation::update(json!({"n": 2})), 3),
        ];

        let request = PushRequest::from_operations("user-1", &ops, 0);

        assert_eq!(request.len(), 3);
        let recipe_ids: Vec<&str> = request.recipes.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(recipe_ids, vec!["r1", "r2"]);
        assert_eq!(request.orders[0].action, OperationKind::Delete);
        assert!(request.customers.is_empty());
    }

    #[test]
    fn push_request_wire_shape() {
        let ops = vec![
            Operation::new(EntityType::Inventory, "i1", Mutation::update(json!({"qty": 4})), 1),
            Operation::new(EntityType::Customer, "c1", Mutation::delete(), 2),
        ];
        let request = PushRequest::from_operations("u", &ops, 1_700_000_000_000);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "userId": "u",
                "timestamp": "2023-11-14T22:13:20.000Z",
                "recipes": [],
                "orders": [],
                "customers": [{"action": "delete", "id": "c1"}],
                "ingredients": [],
                "inventory": [{"action": "update", "id": "i1", "data": {"qty": 4}}]
            })
        );
    }

    #[test]
    fn snapshot_keeps_settings() {
        let body = json!({
            "success": true,
            "data": {
                "recipes": [{"id": "r1"}],
                "orders": [],
                "customers": [],
                "ingredients": [{"id": "flour"}],
                "inventory": [],
                "businessSettings": {"currency": "EUR"}
            }
        });

        let response: PullResponse = serde_json::from_value(body).unwrap();
        let snapshot = response.data.unwrap();

        assert!(response.success);
        assert_eq!(snapshot.entity_count(), 2);
        assert_eq!(snapshot.collection(EntityType::Ingredient).len(), 1);
        assert_eq!(snapshot.settings["businessSettings"]["currency"], "EUR");
    }

    #[test]
    fn failed_pull_has_no_data() {
        let response: PullResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
    }
}
