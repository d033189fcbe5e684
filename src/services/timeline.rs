//! Timeline repository
//!
//! Holds the point-in-time snapshot of both audit collections that the
//! timeline, audit log and summary views query. The snapshot is replaced
//! only by an explicit, fully successful [`TimelineRepository::refresh`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    ActivityFilter, ActivityRecord, ChangeRecord, EntityType, TimelineDay, TimelineStatistics,
};
use crate::services::query;
use crate::services::statistics;
use crate::services::store::{local_now, EventStore};
use crate::utils::AuditError;

/// Immutable view of the store at `loaded_at`, records newest first
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    pub activities: Vec<ActivityRecord>,
    pub changes: Vec<ChangeRecord>,
    pub loaded_at: Option<DateTime<FixedOffset>>,
    /// Refresh that produced this snapshot; later refreshes have higher values
    generation: u64,
}

impl TimelineSnapshot {
    fn empty() -> Self {
        Self {
            activities: Vec::new(),
            changes: Vec::new(),
            loaded_at: None,
            generation: 0,
        }
    }

    fn summary(&self) -> Option<RefreshSummary> {
        self.loaded_at.map(|loaded_at| RefreshSummary {
            activities: self.activities.len(),
            changes: self.changes.len(),
            loaded_at,
        })
    }
}

/// Outcome of a refresh
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RefreshSummary {
    pub activities: usize,
    pub changes: usize,
    pub loaded_at: DateTime<FixedOffset>,
}

/// All records of a single entity
#[derive(Debug, Clone, Serialize)]
pub struct EntityHistory {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub activities: Vec<ActivityRecord>,
    pub changes: Vec<ChangeRecord>,
}

pub struct TimelineRepository {
    store: Arc<dyn EventStore>,
    snapshot: RwLock<Arc<TimelineSnapshot>>,
    next_generation: AtomicU64,
    correlation_window: Duration,
}

impl TimelineRepository {
    pub fn new(store: Arc<dyn EventStore>, correlation_window: Duration) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(TimelineSnapshot::empty())),
            next_generation: AtomicU64::new(1),
            correlation_window,
        }
    }

    /// Reload both collections from the store
    ///
    /// On failure the previous snapshot stays in place. When refreshes
    /// overlap, a read that started earlier never replaces one that started
    /// later.
    pub async fn refresh(&self) -> Result<RefreshSummary, AuditError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let (activities, changes) =
            tokio::join!(self.store.list_activities(), self.store.list_changes());

        let (mut activities, mut changes) = match (activities, changes) {
            (Ok(a), Ok(c)) => (a, c),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Timeline refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };

        query::sort_newest_first(&mut activities);
        query::sort_newest_first(&mut changes);

        Ok(self.install(generation, activities, changes).await)
    }

    async fn install(
        &self,
        generation: u64,
        activities: Vec<ActivityRecord>,
        changes: Vec<ChangeRecord>,
    ) -> RefreshSummary {
        let loaded_at = local_now();
        let mut current = self.snapshot.write().await;
        if current.generation > generation {
            debug!(
                generation,
                installed = current.generation,
                "Discarding refresh overtaken by a newer one"
            );
            if let Some(summary) = current.summary() {
                return summary;
            }
        }

        let summary = RefreshSummary {
            activities: activities.len(),
            changes: changes.len(),
            loaded_at,
        };
        *current = Arc::new(TimelineSnapshot {
            activities,
            changes,
            loaded_at: Some(loaded_at),
            generation,
        });

        info!(
            activities = summary.activities,
            changes = summary.changes,
            "Timeline snapshot refreshed"
        );
        summary
    }

    pub async fn snapshot(&self) -> Arc<TimelineSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Filtered activities, newest first
    pub async fn activities(&self, filter: &ActivityFilter) -> Vec<ActivityRecord> {
        let snapshot = self.snapshot().await;
        query::filter(&snapshot.activities, filter)
    }

    /// Filtered change records, newest first
    pub async fn changes(&self, filter: &ActivityFilter) -> Vec<ChangeRecord> {
        let snapshot = self.snapshot().await;
        query::filter(&snapshot.changes, filter)
    }

    /// Filtered activities grouped by calendar day
    pub async fn timeline(&self, filter: &ActivityFilter) -> Vec<TimelineDay> {
        let activities = self.activities(filter).await;
        query::group_by_day(&activities)
    }

    /// Statistics over the filtered view
    pub async fn statistics(
        &self,
        filter: &ActivityFilter,
        now: DateTime<FixedOffset>,
        window_days: u32,
    ) -> TimelineStatistics {
        let snapshot = self.snapshot().await;
        let activities = query::filter(&snapshot.activities, filter);
        let changes = query::filter(&snapshot.changes, filter);
        statistics::summarize(&activities, &changes, now, window_days)
    }

    pub async fn find_activity(&self, id: Uuid) -> Option<ActivityRecord> {
        let snapshot = self.snapshot().await;
        snapshot.activities.iter().find(|a| a.id == id).cloned()
    }

    /// Change records written together with the given activity
    pub async fn changes_for_activity(&self, activity: &ActivityRecord) -> Vec<ChangeRecord> {
        let snapshot = self.snapshot().await;
        query::correlate_changes(activity, &snapshot.changes, self.correlation_window)
    }

    pub async fn entity_history(&self, entity_type: EntityType, entity_id: &str) -> EntityHistory {
        let snapshot = self.snapshot().await;
        EntityHistory {
            activities: query::entity_history(&snapshot.activities, &entity_type, entity_id),
            changes: query::entity_history(&snapshot.changes, &entity_type, entity_id),
            entity_id: entity_id.to_string(),
            entity_type,
        }
    }
}
