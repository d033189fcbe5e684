//! Field-level change records

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ActionType, EntityType};

/// Kind of mutation applied to a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(ChangeType::Create),
            "update" => Some(ChangeType::Update),
            "delete" => Some(ChangeType::Delete),
            _ => None,
        }
    }

    /// Change type implied by the activity that bundles the change
    pub fn for_action(action: &ActionType) -> Self {
        match action {
            ActionType::Create => ChangeType::Create,
            ActionType::Delete => ChangeType::Delete,
            _ => ChangeType::Update,
        }
    }

    /// The action type a change of this kind is filtered under
    pub fn as_action(&self) -> ActionType {
        match self {
            ChangeType::Create => ActionType::Create,
            ChangeType::Update => ActionType::Update,
            ChangeType::Delete => ActionType::Delete,
        }
    }
}

/// A stored field change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub field_name: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub change_type: ChangeType,
    pub user_id: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(default)]
    pub change_set_id: Option<Uuid>,
}

/// Payload for appending a change record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewChange {
    pub entity_type: EntityType,
    #[validate(length(min = 1, message = "entity_id is required"))]
    pub entity_id: String,
    #[validate(length(min = 1, message = "field_name is required"))]
    pub field_name: String,
    #[serde(default)]
    pub old_value: Option<serde_json::Value>,
    #[serde(default)]
    pub new_value: Option<serde_json::Value>,
    pub change_type: ChangeType,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub change_set_id: Option<Uuid>,
}

impl NewChange {
    pub fn into_record(self, id: Uuid, timestamp: DateTime<FixedOffset>) -> ChangeRecord {
        ChangeRecord {
            id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            field_name: self.field_name,
            old_value: self.old_value,
            new_value: self.new_value,
            change_type: self.change_type,
            user_id: self.user_id,
            timestamp: self.timestamp.unwrap_or(timestamp),
            change_set_id: self.change_set_id,
        }
    }
}

/// Before/after values of one field, submitted together with an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FieldChange {
    #[validate(length(min = 1, message = "field_name is required"))]
    pub field_name: String,
    #[serde(default)]
    pub old_value: Option<serde_json::Value>,
    #[serde(default)]
    pub new_value: Option<serde_json::Value>,
}

impl FieldChange {
    pub fn new(
        field_name: impl Into<String>,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            old_value,
            new_value,
        }
    }
}
