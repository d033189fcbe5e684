//! Query and filter engine
//!
//! Pure functions over an already loaded record set. Filtering is stable: the
//! output keeps the relative order of the input.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::models::{
    ActivityFilter, ActivityRecord, AuditEntry, ChangeRecord, DayGroup, EntityType,
};

/// Records matching every predicate of `filter`, in input order
pub fn filter<T>(records: &[T], filter: &ActivityFilter) -> Vec<T>
where
    T: AuditEntry + Clone,
{
    if filter.is_unrestricted() {
        return records.to_vec();
    }

    let needle = filter.effective_search();
    records
        .iter()
        .filter(|record| filter.matches_with(*record, needle.as_deref()))
        .cloned()
        .collect()
}

/// Group records by calendar day, days in first-seen order
pub fn group_by_day<T>(records: &[T]) -> Vec<DayGroup<T>>
where
    T: AuditEntry + Clone,
{
    let mut groups: Vec<DayGroup<T>> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for record in records {
        let date = record.local_date();
        match index.get(&date) {
            Some(&i) => groups[i].records.push(record.clone()),
            None => {
                index.insert(date, groups.len());
                groups.push(DayGroup {
                    date,
                    records: vec![record.clone()],
                });
            }
        }
    }

    groups
}

/// Stable sort by timestamp, most recent first
pub fn sort_newest_first<T: AuditEntry>(records: &mut [T]) {
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

/// One page of `records`
pub fn paginate<T: Clone>(records: &[T], offset: usize, limit: usize) -> Vec<T> {
    records.iter().skip(offset).take(limit).cloned().collect()
}

/// Change records written together with `activity`
///
/// A shared change set id is authoritative. Without one, changes of the same
/// entity recorded within `window` of the activity are considered related.
pub fn correlate_changes(
    activity: &ActivityRecord,
    changes: &[ChangeRecord],
    window: Duration,
) -> Vec<ChangeRecord> {
    if let Some(change_set_id) = activity.change_set_id {
        let linked: Vec<ChangeRecord> = changes
            .iter()
            .filter(|c| c.change_set_id == Some(change_set_id))
            .cloned()
            .collect();
        if !linked.is_empty() {
            return linked;
        }
    }

    changes
        .iter()
        .filter(|c| {
            c.entity_type == activity.entity_type
                && c.entity_id == activity.entity_id
                && (c.timestamp - activity.timestamp).abs() <= window
        })
        .cloned()
        .collect()
}

/// Every record of one entity, newest first
pub fn entity_history<T>(records: &[T], entity_type: &EntityType, entity_id: &str) -> Vec<T>
where
    T: AuditEntry + Clone,
{
    let mut history: Vec<T> = records
        .iter()
        .filter(|r| r.entity_type() == entity_type && r.entity_id() == entity_id)
        .cloned()
        .collect();
    sort_newest_first(&mut history);
    history
}
