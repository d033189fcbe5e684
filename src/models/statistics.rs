//! Aggregates derived from a set of audit records

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{ActionType, ActivityRecord, EntityType};

/// One day of the dense recent-activity series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub date: NaiveDate,
    pub count: usize,
}

/// Records of one calendar day, as rendered by the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup<T> {
    pub date: NaiveDate,
    pub records: Vec<T>,
}

pub type TimelineDay = DayGroup<ActivityRecord>;

/// Summary cards and charts of the timeline view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStatistics {
    pub generated_at: DateTime<FixedOffset>,
    pub total_activities: usize,
    pub total_changes: usize,
    pub today: usize,
    pub high_severity: usize,
    pub failed: usize,
    /// Distinct identified actors; records without a user are not counted
    pub unique_users: usize,
    pub by_action_type: BTreeMap<ActionType, usize>,
    pub by_entity_type: BTreeMap<EntityType, usize>,
    pub by_user: BTreeMap<String, usize>,
    pub trend: Vec<TrendBucket>,
}
