//! Activity logger
//!
//! Entry point for producers (survey tools, CRM forms, permission editors)
//! that need to leave an audit trail. Only missing required fields reject a
//! record; unusual content is logged and stored as given.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::{ActivityRecord, ChangeRecord, ChangeType, FieldChange, NewActivity, NewChange};
use crate::services::store::{local_now, EventStore};
use crate::utils::validation::{validate_field_name, validate_ip_address, validate_role_name};
use crate::utils::{AuditError, MissingWrite, PartialAuditWriteWarning};

/// Result of a paired activity/change write
#[derive(Debug, Clone, Serialize)]
pub struct LoggedActivity {
    pub change_set_id: Uuid,
    /// `None` when the activity write failed but some changes were kept
    pub activity: Option<ActivityRecord>,
    pub changes: Vec<ChangeRecord>,
    pub warnings: Vec<PartialAuditWriteWarning>,
}

impl LoggedActivity {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn EventStore>,
}

impl ActivityLogger {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Validate and append one activity
    pub async fn log(&self, activity: NewActivity) -> Result<ActivityRecord, AuditError> {
        validate_activity(&activity)?;
        let record = self.store.append_activity(activity).await?;
        debug!(
            activity_id = %record.id,
            entity_type = %record.entity_type,
            action_type = %record.action_type,
            "Activity logged"
        );
        Ok(record)
    }

    /// Validate and append one change record
    pub async fn log_change(&self, change: NewChange) -> Result<ChangeRecord, AuditError> {
        validate_change(&change)?;
        let record = self.store.append_change(change).await?;
        debug!(change_id = %record.id, field = %record.field_name, "Change logged");
        Ok(record)
    }

    /// Append an activity and one change record per modified field
    ///
    /// The writes are independent. Validation failures abort before anything
    /// is written; a storage failure is returned only when every write
    /// failed, otherwise the lost halves are reported as warnings.
    pub async fn log_with_changes(
        &self,
        mut activity: NewActivity,
        fields: Vec<FieldChange>,
    ) -> Result<LoggedActivity, AuditError> {
        validate_activity(&activity)?;
        for field in &fields {
            validate_field_change(field)?;
        }

        let change_set_id = activity.change_set_id.unwrap_or_else(Uuid::new_v4);
        let timestamp = activity.timestamp.unwrap_or_else(local_now);
        activity.change_set_id = Some(change_set_id);
        activity.timestamp = Some(timestamp);

        let change_type = ChangeType::for_action(&activity.action_type);
        let pending: Vec<NewChange> = fields
            .into_iter()
            .map(|field| NewChange {
                entity_type: activity.entity_type.clone(),
                entity_id: activity.entity_id.clone(),
                field_name: field.field_name,
                old_value: field.old_value,
                new_value: field.new_value,
                change_type,
                user_id: activity.user_id.clone(),
                timestamp: Some(timestamp),
                change_set_id: Some(change_set_id),
            })
            .collect();
        let attempted = 1 + pending.len();

        let mut warnings = Vec::new();
        let mut first_error: Option<AuditError> = None;

        let activity = match self.store.append_activity(activity).await {
            Ok(record) => Some(record),
            Err(e) => {
                warnings.push(PartialAuditWriteWarning {
                    change_set_id,
                    missing: MissingWrite::Activity,
                    field_name: None,
                    reason: e.to_string(),
                });
                first_error.get_or_insert(e);
                None
            }
        };

        let mut changes = Vec::with_capacity(pending.len());
        for change in pending {
            let field_name = change.field_name.clone();
            match self.store.append_change(change).await {
                Ok(record) => changes.push(record),
                Err(e) => {
                    warnings.push(PartialAuditWriteWarning {
                        change_set_id,
                        missing: MissingWrite::Change,
                        field_name: Some(field_name),
                        reason: e.to_string(),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }

        if warnings.len() == attempted {
            if let Some(err) = first_error {
                return Err(err);
            }
        }

        for warning in &warnings {
            warn!(
                change_set_id = %warning.change_set_id,
                missing = ?warning.missing,
                "Partial audit write: {}",
                warning
            );
        }

        Ok(LoggedActivity {
            change_set_id,
            activity,
            changes,
            warnings,
        })
    }
}

fn validate_activity(activity: &NewActivity) -> Result<(), AuditError> {
    activity.validate()?;
    if let Some(ref ip) = activity.ip_address {
        if !validate_ip_address(ip) {
            warn!(
                entity_id = %activity.entity_id,
                ip_address = %ip,
                "Activity carries an unparseable IP address"
            );
        }
    }
    if let Some(ref role) = activity.user_role {
        if !validate_role_name(role) {
            warn!(
                entity_id = %activity.entity_id,
                user_role = %role,
                "Activity carries an unusual role name"
            );
        }
    }
    Ok(())
}

fn validate_change(change: &NewChange) -> Result<(), AuditError> {
    change.validate()?;
    note_field_name(&change.field_name);
    Ok(())
}

fn validate_field_change(field: &FieldChange) -> Result<(), AuditError> {
    field.validate()?;
    note_field_name(&field.field_name);
    Ok(())
}

/// Content checks never reject an audit record, they only flag it
fn note_field_name(field_name: &str) {
    if !validate_field_name(field_name) {
        debug!(field = %field_name, "Field name is not a dotted identifier path");
    }
}
