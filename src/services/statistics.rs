//! Statistics aggregator
//!
//! Exact counts over an already loaded (usually filtered) record set. Nothing
//! here performs I/O.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};

use crate::models::{
    ActionType, ActivityRecord, AuditEntry, ChangeRecord, EntityType, Severity,
    TimelineStatistics, TrendBucket,
};

/// Default number of days covered by [`recent_trend`]
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 7;

/// Key used for records without an actor
pub const SYSTEM_USER: &str = "system";

/// Count of activities per action type
///
/// Every tracked action type is present (zero when absent); other action
/// types appear under their own key when they occur.
pub fn count_by_action_type(records: &[ActivityRecord]) -> BTreeMap<ActionType, usize> {
    let mut counts: BTreeMap<ActionType, usize> =
        ActionType::TRACKED.into_iter().map(|a| (a, 0)).collect();
    for record in records {
        *counts.entry(record.action_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Count of records per entity type, tracked types always present
pub fn count_by_entity_type<T: AuditEntry>(records: &[T]) -> BTreeMap<EntityType, usize> {
    let mut counts: BTreeMap<EntityType, usize> =
        EntityType::TRACKED.into_iter().map(|e| (e, 0)).collect();
    for record in records {
        *counts.entry(record.entity_type().clone()).or_insert(0) += 1;
    }
    counts
}

/// Count of records per actor, `"system"` for records without one
pub fn count_by_user<T: AuditEntry>(records: &[T]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let user = record
            .user_id()
            .filter(|u| !u.is_empty())
            .unwrap_or(SYSTEM_USER);
        *counts.entry(user.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Dense per-day counts for the `window_days` days ending at `now`'s date
///
/// Always returns exactly `window_days` buckets in ascending date order.
pub fn recent_trend<T: AuditEntry>(
    records: &[T],
    window_days: u32,
    now: DateTime<FixedOffset>,
) -> Vec<TrendBucket> {
    if window_days == 0 {
        return Vec::new();
    }

    let last = now.date_naive();
    let first = last - Duration::days(i64::from(window_days) - 1);

    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for record in records {
        let date = record.local_date();
        if date >= first && date <= last {
            *per_day.entry(date).or_insert(0) += 1;
        }
    }

    first
        .iter_days()
        .take(window_days as usize)
        .map(|date| TrendBucket {
            date,
            count: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Summary cards, breakdowns and trend for one view
pub fn summarize(
    activities: &[ActivityRecord],
    changes: &[ChangeRecord],
    now: DateTime<FixedOffset>,
    window_days: u32,
) -> TimelineStatistics {
    let today = now.date_naive();
    let unique_users: HashSet<&str> = activities
        .iter()
        .filter_map(|a| a.user_id.as_deref().filter(|u| !u.is_empty()))
        .collect();

    TimelineStatistics {
        generated_at: now,
        total_activities: activities.len(),
        total_changes: changes.len(),
        today: activities.iter().filter(|a| a.local_date() == today).count(),
        high_severity: activities
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count(),
        failed: activities.iter().filter(|a| !a.success).count(),
        unique_users: unique_users.len(),
        by_action_type: count_by_action_type(activities),
        by_entity_type: count_by_entity_type(activities),
        by_user: count_by_user(activities),
        trend: recent_trend(activities, window_days, now),
    }
}
