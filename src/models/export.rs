//! Export documents

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{ActivityFilter, ActivityRecord, ChangeRecord, TimelineStatistics};

/// Output formats for snapshot exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Csv => "text/csv",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub activities: usize,
    pub changes: usize,
}

/// Self-describing snapshot of a filtered view
///
/// Carries the filter that produced it so the same view can be rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<FixedOffset>,
    pub filter: ActivityFilter,
    pub record_counts: RecordCounts,
    pub statistics: TimelineStatistics,
    pub activities: Vec<ActivityRecord>,
    pub changes: Vec<ChangeRecord>,
}

/// Body of an export request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub filter: ActivityFilter,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub window_days: Option<u32>,
}
