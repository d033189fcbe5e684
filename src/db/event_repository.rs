//! SQLite-backed event store

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{
    ActionType, ActivityMetadata, ActivityRecord, ChangeRecord, ChangeType, EntityType,
    NewActivity, NewChange, Severity,
};
use crate::services::store::{local_now, Collection, EventStore};
use crate::utils::AuditError;

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: String,
    entity_type: String,
    entity_id: String,
    entity_name: String,
    action_type: String,
    description: String,
    metadata: String,
    user_id: Option<String>,
    user_display_name: Option<String>,
    user_role: Option<String>,
    timestamp: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    severity: String,
    success: bool,
    change_set_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ChangeRow {
    id: String,
    entity_type: String,
    entity_id: String,
    field_name: String,
    old_value: Option<String>,
    new_value: Option<String>,
    change_type: String,
    user_id: Option<String>,
    timestamp: String,
    change_set_id: Option<String>,
}

/// Append-only store over the `activity_records` and `change_records` tables
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: DbPool,
}

impl SqliteEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn append_activity(&self, activity: NewActivity) -> Result<ActivityRecord, AuditError> {
        let record = activity.into_record(Uuid::new_v4(), local_now());
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| AuditError::storage(format!("Failed to encode metadata: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO activity_records (
                id, entity_type, entity_id, entity_name, action_type, description, metadata,
                user_id, user_display_name, user_role, timestamp, ip_address, user_agent,
                severity, success, change_set_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.entity_type.as_str())
        .bind(&record.entity_id)
        .bind(&record.entity_name)
        .bind(record.action_type.as_str())
        .bind(&record.description)
        .bind(&metadata)
        .bind(record.user_id.as_deref())
        .bind(record.user_display_name.as_deref())
        .bind(record.user_role.as_deref())
        .bind(record.timestamp.to_rfc3339())
        .bind(record.ip_address.as_deref())
        .bind(record.user_agent.as_deref())
        .bind(record.severity.as_str())
        .bind(record.success)
        .bind(record.change_set_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn append_change(&self, change: NewChange) -> Result<ChangeRecord, AuditError> {
        let record = change.into_record(Uuid::new_v4(), local_now());

        sqlx::query(
            r#"
            INSERT INTO change_records (
                id, entity_type, entity_id, field_name, old_value, new_value,
                change_type, user_id, timestamp, change_set_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.entity_type.as_str())
        .bind(&record.entity_id)
        .bind(&record.field_name)
        .bind(record.old_value.as_ref().map(|v| v.to_string()))
        .bind(record.new_value.as_ref().map(|v| v.to_string()))
        .bind(record.change_type.as_str())
        .bind(record.user_id.as_deref())
        .bind(record.timestamp.to_rfc3339())
        .bind(record.change_set_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_activities(&self) -> Result<Vec<ActivityRecord>, AuditError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, entity_type, entity_id, entity_name, action_type, description, metadata,
                   user_id, user_display_name, user_role, timestamp, ip_address, user_agent,
                   severity, success, change_set_id
            FROM activity_records
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(row_to_activity).collect())
    }

    async fn list_changes(&self) -> Result<Vec<ChangeRecord>, AuditError> {
        let rows = sqlx::query_as::<_, ChangeRow>(
            r#"
            SELECT id, entity_type, entity_id, field_name, old_value, new_value,
                   change_type, user_id, timestamp, change_set_id
            FROM change_records
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(row_to_change).collect())
    }
}

fn parse_db_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt);
    }
    // SQLite CURRENT_TIMESTAMP format, always UTC
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).fixed_offset())
}

fn parse_json_value(raw: Option<String>) -> Option<serde_json::Value> {
    raw.map(|s| serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)))
}

fn skip_row(collection: Collection, id: &str, reason: &str) {
    warn!(
        collection = collection.as_str(),
        id = %id,
        "Skipping unreadable audit row: {}",
        reason
    );
}

fn row_to_activity(row: ActivityRow) -> Option<ActivityRecord> {
    let Ok(id) = Uuid::parse_str(&row.id) else {
        skip_row(Collection::Activities, &row.id, "invalid id");
        return None;
    };
    let Some(timestamp) = parse_db_timestamp(&row.timestamp) else {
        skip_row(Collection::Activities, &row.id, "invalid timestamp");
        return None;
    };

    let metadata = match serde_json::from_str::<ActivityMetadata>(&row.metadata) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(id = %row.id, error = %e, "Unreadable activity metadata, using empty metadata");
            ActivityMetadata::default()
        }
    };

    Some(ActivityRecord {
        id,
        entity_type: EntityType::parse(&row.entity_type),
        entity_id: row.entity_id,
        entity_name: row.entity_name,
        action_type: ActionType::parse(&row.action_type),
        description: row.description,
        metadata,
        user_id: row.user_id,
        user_display_name: row.user_display_name,
        user_role: row.user_role,
        timestamp,
        ip_address: row.ip_address,
        user_agent: row.user_agent,
        severity: Severity::parse(&row.severity).unwrap_or_default(),
        success: row.success,
        change_set_id: row
            .change_set_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok()),
    })
}

fn row_to_change(row: ChangeRow) -> Option<ChangeRecord> {
    let Ok(id) = Uuid::parse_str(&row.id) else {
        skip_row(Collection::Changes, &row.id, "invalid id");
        return None;
    };
    let Some(timestamp) = parse_db_timestamp(&row.timestamp) else {
        skip_row(Collection::Changes, &row.id, "invalid timestamp");
        return None;
    };
    let Some(change_type) = ChangeType::parse(&row.change_type) else {
        skip_row(Collection::Changes, &row.id, "invalid change_type");
        return None;
    };

    Some(ChangeRecord {
        id,
        entity_type: EntityType::parse(&row.entity_type),
        entity_id: row.entity_id,
        field_name: row.field_name,
        old_value: parse_json_value(row.old_value),
        new_value: parse_json_value(row.new_value),
        change_type,
        user_id: row.user_id,
        timestamp,
        change_set_id: row
            .change_set_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok()),
    })
}
