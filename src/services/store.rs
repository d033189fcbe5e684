//! Event store contract and the in-process backend
//!
//! Audit collections are append-only: the contract exposes no update or
//! delete operation for either collection.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ActivityRecord, ChangeRecord, NewActivity, NewChange};
use crate::utils::AuditError;

/// Names of the audit collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Activities,
    Changes,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Activities => "activity_records",
            Collection::Changes => "change_records",
        }
    }
}

/// Durable append-only storage of audit records
///
/// Implementations assign ids and never validate business rules; callers
/// validate before appending.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append_activity(&self, activity: NewActivity) -> Result<ActivityRecord, AuditError>;

    async fn append_change(&self, change: NewChange) -> Result<ChangeRecord, AuditError>;

    /// All activities, in no particular order
    async fn list_activities(&self) -> Result<Vec<ActivityRecord>, AuditError>;

    /// All change records, in no particular order
    async fn list_changes(&self) -> Result<Vec<ChangeRecord>, AuditError>;
}

/// Current wall-clock time in the local offset
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// In-memory event store
///
/// Backs demos and tests. `set_unavailable(true)` makes every call fail with
/// a storage error, which is how tests exercise outage handling.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    activities: RwLock<Vec<ActivityRecord>>,
    changes: RwLock<Vec<ChangeRecord>>,
    unavailable: AtomicBool,
    reject_activities: AtomicBool,
    reject_changes: AtomicBool,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reject writes to the activity collection only
    pub fn set_reject_activities(&self, reject: bool) {
        self.reject_activities.store(reject, Ordering::SeqCst);
    }

    /// Reject writes to the change collection only
    pub fn set_reject_changes(&self, reject: bool) {
        self.reject_changes.store(reject, Ordering::SeqCst);
    }

    fn check_available(&self, collection: Collection) -> Result<(), AuditError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuditError::storage(format!(
                "{} backend is unreachable",
                collection.as_str()
            )));
        }
        Ok(())
    }

    pub async fn activity_count(&self) -> usize {
        self.activities.read().await.len()
    }

    pub async fn change_count(&self) -> usize {
        self.changes.read().await.len()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append_activity(&self, activity: NewActivity) -> Result<ActivityRecord, AuditError> {
        self.check_available(Collection::Activities)?;
        if self.reject_activities.load(Ordering::SeqCst) {
            return Err(AuditError::storage("activity_records rejected the write"));
        }
        let record = activity.into_record(Uuid::new_v4(), local_now());
        self.activities.write().await.push(record.clone());
        Ok(record)
    }

    async fn append_change(&self, change: NewChange) -> Result<ChangeRecord, AuditError> {
        self.check_available(Collection::Changes)?;
        if self.reject_changes.load(Ordering::SeqCst) {
            return Err(AuditError::storage("change_records rejected the write"));
        }
        let record = change.into_record(Uuid::new_v4(), local_now());
        self.changes.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_activities(&self) -> Result<Vec<ActivityRecord>, AuditError> {
        self.check_available(Collection::Activities)?;
        Ok(self.activities.read().await.clone())
    }

    async fn list_changes(&self) -> Result<Vec<ChangeRecord>, AuditError> {
        self.check_available(Collection::Changes)?;
        Ok(self.changes.read().await.clone())
    }
}
