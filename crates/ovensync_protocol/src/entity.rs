//! Entity types and operation kinds.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of entity types the engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A recipe.
    Recipe,
    /// A customer order.
    Order,
    /// A customer.
    Customer,
    /// An ingredient definition.
    Ingredient,
    /// An inventory record.
    Inventory,
}

impl EntityType {
    /// All entity types, in wire group order.
    pub const ALL: [EntityType; 5] = [
        EntityType::Recipe,
        EntityType::Order,
        EntityType::Customer,
        EntityType::Ingredient,
        EntityType::Inventory,
    ];

    /// Returns the singular name used in stored operations.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Recipe => "recipe",
            EntityType::Order => "order",
            EntityType::Customer => "customer",
            EntityType::Ingredient => "ingredient",
            EntityType::Inventory => "inventory",
        }
    }

    /// Returns the collection key used in push and pull bodies.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityType::Recipe => "recipes",
            EntityType::Order => "orders",
            EntityType::Customer => "customers",
            EntityType::Ingredient => "ingredients",
            EntityType::Inventory => "inventory",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s || t.collection() == s)
            .ok_or_else(|| ProtocolError::UnknownEntityType(s.to_string()))
    }
}

/// Kind of recorded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Entity was created locally.
    Create,
    /// Entity was modified locally.
    Update,
    /// Entity was deleted locally.
    Delete,
}

impl OperationKind {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// Returns true if operations of this kind carry an entity snapshot.
    pub fn requires_payload(&self) -> bool {
        !matches!(self, OperationKind::Delete)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(OperationKind::Create),
            "update" => Ok(OperationKind::Update),
            "delete" => Ok(OperationKind::Delete),
            other => Err(ProtocolError::UnknownOperationKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_names() {
        assert_eq!(EntityType::Recipe.as_str(), "recipe");
        assert_eq!(EntityType::Recipe.collection(), "recipes");
        assert_eq!(EntityType::Inventory.collection(), "inventory");
    }

    #[test]
    fn entity_type_parse() {
        assert_eq!("order".parse::<EntityType>().unwrap(), EntityType::Order);
        assert_eq!(
            "ingredients".parse::<EntityType>().unwrap(),
            EntityType::Ingredient
        );
        assert!(matches!(
            "supplier".parse::<EntityType>(),
            Err(ProtocolError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn entity_type_serde() {
        let json = serde_json::to_string(&EntityType::Customer).unwrap();
        assert_eq!(json, "\"customer\"");
        let back: EntityType = serde_json::from_str("\"inventory\"").unwrap();
        assert_eq!(back, EntityType::Inventory);
    }

    #[test]
    fn operation_kind_payload_rules() {
        assert!(OperationKind::Create.requires_payload());
        assert!(OperationKind::Update.requires_payload());
        assert!(!OperationKind::Delete.requires_payload());
    }

    #[test]
    fn operation_kind_parse() {
        assert_eq!(
            "delete".parse::<OperationKind>().unwrap(),
            OperationKind::Delete
        );
        assert!("upsert".parse::<OperationKind>().is_err());
    }
}
