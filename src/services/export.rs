//! Snapshot export
//!
//! Renders a filtered view, the filter that produced it and its statistics
//! into a self-describing document for offline analysis.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

use crate::models::{
    ActivityFilter, ActivityRecord, ChangeRecord, ExportDocument, OutputFormat, RecordCounts,
    TimelineStatistics,
};

pub struct ExportService;

impl ExportService {
    /// Build the export document for a view
    pub fn build_document(
        activities: &[ActivityRecord],
        changes: &[ChangeRecord],
        filter: &ActivityFilter,
        statistics: &TimelineStatistics,
        exported_at: DateTime<FixedOffset>,
    ) -> ExportDocument {
        ExportDocument {
            exported_at,
            filter: filter.clone(),
            record_counts: RecordCounts {
                activities: activities.len(),
                changes: changes.len(),
            },
            statistics: statistics.clone(),
            activities: activities.to_vec(),
            changes: changes.to_vec(),
        }
    }

    /// Serialize a view in the requested format
    pub fn export_snapshot(
        activities: &[ActivityRecord],
        changes: &[ChangeRecord],
        filter: &ActivityFilter,
        statistics: &TimelineStatistics,
        exported_at: DateTime<FixedOffset>,
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        let document =
            Self::build_document(activities, changes, filter, statistics, exported_at);

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_vec_pretty(&document)
                    .context("Failed to serialize export to JSON")?;
                Ok(json)
            }
            OutputFormat::Csv => {
                let csv = Self::export_to_csv(&document)?;
                Ok(csv.into_bytes())
            }
        }
    }

    /// Suggested attachment name for an export
    pub fn file_name(exported_at: DateTime<FixedOffset>, format: OutputFormat) -> String {
        format!(
            "audit_export_{}.{}",
            exported_at.format("%Y%m%d_%H%M%S"),
            format.file_extension()
        )
    }

    fn export_to_csv(document: &ExportDocument) -> Result<String> {
        let mut csv = String::new();
        let filter = &document.filter;

        csv.push_str("Audit Log Export\n");
        csv.push_str(&format!("Exported At,{}\n\n", document.exported_at.to_rfc3339()));

        // Enough of the filter to rebuild the same view
        csv.push_str("Filter\n");
        csv.push_str("Field,Value\n");
        csv.push_str(&format!(
            "Start Date,{}\n",
            filter.date_range.start.map(|d| d.to_string()).unwrap_or_default()
        ));
        csv.push_str(&format!(
            "End Date,{}\n",
            filter.date_range.end.map(|d| d.to_string()).unwrap_or_default()
        ));
        csv.push_str(&format!(
            "User,{}\n",
            escape_csv(filter.user_id.as_deref().unwrap_or(""))
        ));
        csv.push_str(&format!(
            "Entity Type,{}\n",
            escape_csv(filter.entity_type.as_option().map(|e| e.as_str()).unwrap_or("all"))
        ));
        csv.push_str(&format!(
            "Action Type,{}\n",
            escape_csv(filter.action_type.as_option().map(|a| a.as_str()).unwrap_or("all"))
        ));
        csv.push_str(&format!(
            "Search,{}\n\n",
            escape_csv(filter.search_text.as_deref().unwrap_or(""))
        ));

        let stats = &document.statistics;
        csv.push_str("Summary\n");
        csv.push_str("Metric,Value\n");
        csv.push_str(&format!("Total Activities,{}\n", stats.total_activities));
        csv.push_str(&format!("Total Changes,{}\n", stats.total_changes));
        csv.push_str(&format!("Today,{}\n", stats.today));
        csv.push_str(&format!("High Severity,{}\n", stats.high_severity));
        csv.push_str(&format!("Failed,{}\n", stats.failed));
        csv.push_str(&format!("Unique Users,{}\n", stats.unique_users));
        for (action, count) in &stats.by_action_type {
            csv.push_str(&format!("Action: {},{}\n", escape_csv(action.as_str()), count));
        }
        for (entity, count) in &stats.by_entity_type {
            csv.push_str(&format!("Entity: {},{}\n", escape_csv(entity.as_str()), count));
        }

        csv.push_str("\nTrend\n");
        csv.push_str("Date,Count\n");
        for bucket in &stats.trend {
            csv.push_str(&format!("{},{}\n", bucket.date, bucket.count));
        }

        csv.push_str("\nActivities\n");
        csv.push_str(
            "Id,Timestamp,Entity Type,Entity Id,Entity Name,Action,Description,User,Role,Severity,Success\n",
        );
        for a in &document.activities {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                a.id,
                a.timestamp.to_rfc3339(),
                escape_csv(a.entity_type.as_str()),
                escape_csv(&a.entity_id),
                escape_csv(&a.entity_name),
                escape_csv(a.action_type.as_str()),
                escape_csv(&a.description),
                escape_csv(a.user_display_name.as_deref().or(a.user_id.as_deref()).unwrap_or("")),
                escape_csv(a.user_role.as_deref().unwrap_or("")),
                a.severity.as_str(),
                a.success
            ));
        }

        csv.push_str("\nChanges\n");
        csv.push_str("Id,Timestamp,Entity Type,Entity Id,Field,Old Value,New Value,Change Type,User\n");
        for c in &document.changes {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                c.id,
                c.timestamp.to_rfc3339(),
                escape_csv(c.entity_type.as_str()),
                escape_csv(&c.entity_id),
                escape_csv(&c.field_name),
                escape_csv(&value_cell(&c.old_value)),
                escape_csv(&value_cell(&c.new_value)),
                c.change_type.as_str(),
                escape_csv(c.user_id.as_deref().unwrap_or(""))
            ));
        }

        Ok(csv)
    }
}

fn value_cell(value: &Option<serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
