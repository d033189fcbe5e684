//! Filter specification shared by the timeline, audit log and export views

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ActionType, ActivityRecord, ChangeRecord, EntityType};

/// Common view over activity and change records used by the query engine
pub trait AuditEntry {
    fn timestamp(&self) -> DateTime<FixedOffset>;

    /// Calendar day in the offset the record was written with
    fn local_date(&self) -> NaiveDate {
        self.timestamp().date_naive()
    }

    fn user_id(&self) -> Option<&str>;

    fn entity_type(&self) -> &EntityType;

    fn entity_id(&self) -> &str;

    fn matches_action(&self, action: &ActionType) -> bool;

    /// `needle` is already lowercased
    fn matches_text(&self, needle: &str) -> bool;
}

impl AuditEntry for ActivityRecord {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn matches_action(&self, action: &ActionType) -> bool {
        &self.action_type == action
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
            || self.entity_name.to_lowercase().contains(needle)
    }
}

impl AuditEntry for ChangeRecord {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn matches_action(&self, action: &ActionType) -> bool {
        &self.change_type.as_action() == action
    }

    fn matches_text(&self, needle: &str) -> bool {
        let value_matches = |value: &Option<serde_json::Value>| match value {
            Some(serde_json::Value::String(s)) => s.to_lowercase().contains(needle),
            Some(other) => other.to_string().to_lowercase().contains(needle),
            None => false,
        };

        self.field_name.to_lowercase().contains(needle)
            || self.entity_id.to_lowercase().contains(needle)
            || value_matches(&self.old_value)
            || value_matches(&self.new_value)
    }
}

/// Inclusive calendar-day bounds; a missing bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let start = self.start.unwrap_or(NaiveDate::MIN);
        let end = self.end.unwrap_or(NaiveDate::MAX);
        start <= date && date <= end
    }
}

/// Either every value (`"all"`) or one exact value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T> Selector<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Selector::All => None,
            Selector::Only(v) => Some(v),
        }
    }
}

impl<T: From<String>> Selector<T> {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Selector::All
        } else {
            Selector::Only(T::from(raw.to_string()))
        }
    }
}

impl<T: Serialize> Serialize for Selector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selector::All => serializer.serialize_str("all"),
            Selector::Only(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: From<String>> Deserialize<'de> for Selector<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Selector::parse(&raw))
    }
}

/// Conjunction of optional predicates over audit records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilter {
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub entity_type: Selector<EntityType>,
    #[serde(default)]
    pub action_type: Selector<ActionType>,
    #[serde(default)]
    pub search_text: Option<String>,
}

impl ActivityFilter {
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = DateRange::new(start, end);
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn for_entity(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Selector::Only(entity_type);
        self
    }

    pub fn for_action(mut self, action_type: ActionType) -> Self {
        self.action_type = Selector::Only(action_type);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// True when no predicate restricts the result
    pub fn is_unrestricted(&self) -> bool {
        !self.date_range.is_bounded()
            && self.effective_user().is_none()
            && self.entity_type.is_all()
            && self.action_type.is_all()
            && self.effective_search().is_none()
    }

    fn effective_user(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Lowercased search needle, ignoring blank input
    pub fn effective_search(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `entry` satisfies every predicate of this filter
    pub fn matches<E: AuditEntry>(&self, entry: &E) -> bool {
        self.matches_with(entry, self.effective_search().as_deref())
    }

    pub(crate) fn matches_with<E: AuditEntry>(&self, entry: &E, needle: Option<&str>) -> bool {
        if self.date_range.is_bounded() && !self.date_range.contains(entry.local_date()) {
            return false;
        }
        if let Some(user) = self.effective_user() {
            if entry.user_id() != Some(user) {
                return false;
            }
        }
        if let Selector::Only(ref entity_type) = self.entity_type {
            if entry.entity_type() != entity_type {
                return false;
            }
        }
        if let Selector::Only(ref action_type) = self.action_type {
            if !entry.matches_action(action_type) {
                return false;
            }
        }
        if let Some(needle) = needle {
            if !entry.matches_text(needle) {
                return false;
            }
        }
        true
    }
}
