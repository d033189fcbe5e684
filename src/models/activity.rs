//! Activity records
//!
//! An activity is an immutable fact that an actor performed an action on a
//! domain entity at a point in time.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Category of the domain object an activity refers to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Survey,
    Species,
    Site,
    Project,
    Volunteer,
    Report,
    User,
    Permission,
    Campaign,
    Form,
    Contact,
    /// Entity type not known to this build, kept verbatim
    Other(String),
}

impl EntityType {
    /// Entity types that always appear in per-entity counts
    pub const TRACKED: [EntityType; 6] = [
        EntityType::Survey,
        EntityType::Species,
        EntityType::Site,
        EntityType::Project,
        EntityType::Volunteer,
        EntityType::Report,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Survey => "survey",
            EntityType::Species => "species",
            EntityType::Site => "site",
            EntityType::Project => "project",
            EntityType::Volunteer => "volunteer",
            EntityType::Report => "report",
            EntityType::User => "user",
            EntityType::Permission => "permission",
            EntityType::Campaign => "campaign",
            EntityType::Form => "form",
            EntityType::Contact => "contact",
            EntityType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "survey" => EntityType::Survey,
            "species" => EntityType::Species,
            "site" => EntityType::Site,
            "project" => EntityType::Project,
            "volunteer" => EntityType::Volunteer,
            "report" => EntityType::Report,
            "user" => EntityType::User,
            "permission" => EntityType::Permission,
            "campaign" => EntityType::Campaign,
            "form" => EntityType::Form,
            "contact" => EntityType::Contact,
            other => EntityType::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EntityType::Other(_))
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        EntityType::parse(&s)
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of operation an actor performed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    View,
    Export,
    Import,
    Login,
    Logout,
    LoginFailed,
    PermissionModified,
    /// Action type not known to this build, kept verbatim
    Other(String),
}

impl ActionType {
    /// Action types that always appear in per-action counts
    pub const TRACKED: [ActionType; 6] = [
        ActionType::Create,
        ActionType::Update,
        ActionType::Delete,
        ActionType::View,
        ActionType::Export,
        ActionType::Import,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::View => "view",
            ActionType::Export => "export",
            ActionType::Import => "import",
            ActionType::Login => "login",
            ActionType::Logout => "logout",
            ActionType::LoginFailed => "login_failed",
            ActionType::PermissionModified => "permission_modified",
            ActionType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "create" => ActionType::Create,
            "update" => ActionType::Update,
            "delete" => ActionType::Delete,
            "view" => ActionType::View,
            "export" => ActionType::Export,
            "import" => ActionType::Import,
            "login" => ActionType::Login,
            "logout" => ActionType::Logout,
            "login_failed" => ActionType::LoginFailed,
            "permission_modified" => ActionType::PermissionModified,
            other => ActionType::Other(other.to_string()),
        }
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        ActionType::parse(&s)
    }
}

impl From<ActionType> for String {
    fn from(t: ActionType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual emphasis of an activity; has no effect on storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

/// Action-specific details with a known shape
///
/// Unknown keys reject the typed form so the map is kept whole as
/// [`ActivityMetadata::Open`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum TypedMetadata {
    Export {
        record_count: u64,
        format: String,
    },
    Import {
        record_count: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accuracy_m: Option<f64>,
    },
    PermissionDiff {
        #[serde(default)]
        granted: Vec<String>,
        #[serde(default)]
        revoked: Vec<String>,
    },
    LoginAttempt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attempts: Option<u32>,
    },
}

/// Metadata bag attached to an activity
///
/// Known shapes deserialize into [`TypedMetadata`] (selected by the `kind`
/// field); anything else is kept as an open JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityMetadata {
    Typed(TypedMetadata),
    Open(serde_json::Map<String, serde_json::Value>),
}

impl Default for ActivityMetadata {
    fn default() -> Self {
        ActivityMetadata::Open(serde_json::Map::new())
    }
}

impl ActivityMetadata {
    pub fn is_empty(&self) -> bool {
        matches!(self, ActivityMetadata::Open(map) if map.is_empty())
    }
}

/// A stored activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub entity_name: String,
    pub action_type: ActionType,
    pub description: String,
    #[serde(default)]
    pub metadata: ActivityMetadata,
    pub user_id: Option<String>,
    pub user_display_name: Option<String>,
    pub user_role: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub success: bool,
    /// Shared with the change records written alongside this activity
    #[serde(default)]
    pub change_set_id: Option<Uuid>,
}

/// Payload for appending an activity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewActivity {
    pub entity_type: EntityType,
    #[validate(length(min = 1, message = "entity_id is required"))]
    pub entity_id: String,
    #[validate(length(min = 1, message = "entity_name is required"))]
    pub entity_name: String,
    pub action_type: ActionType,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    pub metadata: ActivityMetadata,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_display_name: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
    /// Defaults to the time of append
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub change_set_id: Option<Uuid>,
}

fn default_success() -> bool {
    true
}

impl NewActivity {
    /// Minimal successful activity performed by `user_id`
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: impl Into<String>,
        action_type: ActionType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            entity_name: entity_name.into(),
            action_type,
            description: description.into(),
            metadata: ActivityMetadata::default(),
            user_id: None,
            user_display_name: None,
            user_role: None,
            timestamp: None,
            ip_address: None,
            user_agent: None,
            severity: Severity::Low,
            success: true,
            change_set_id: None,
        }
    }

    pub fn by_user(mut self, user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.user_display_name = Some(display_name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.user_role = Some(role.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, metadata: ActivityMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Materialize the stored record once the store has chosen an id and time
    pub fn into_record(self, id: Uuid, timestamp: DateTime<FixedOffset>) -> ActivityRecord {
        ActivityRecord {
            id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            entity_name: self.entity_name,
            action_type: self.action_type,
            description: self.description,
            metadata: self.metadata,
            user_id: self.user_id,
            user_display_name: self.user_display_name,
            user_role: self.user_role,
            timestamp: self.timestamp.unwrap_or(timestamp),
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            severity: self.severity,
            success: self.success,
            change_set_id: self.change_set_id,
        }
    }
}
