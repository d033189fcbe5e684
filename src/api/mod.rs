//! API routes and handlers
//!
//! Read endpoints query the timeline snapshot; write endpoints go through the
//! activity logger. Neither collection has update or delete routes.

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    models::{ActivityFilter, DateRange, Selector},
    utils::{AppError, AppResult},
    AppState,
};

mod activities;
mod changes;
mod entities;
mod export;
mod health;
mod snapshot;
mod statistics;

pub use health::*;

/// Full application router, mounted under `/api/v1`
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes())
        .with_state(state)
}

/// API routes relative to the version prefix
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .nest("/activities", activities::routes())
        .nest("/changes", changes::routes())
        .nest("/entities", entities::routes())
        .route("/statistics", get(statistics::get_statistics))
        .route("/export", post(export::export_view))
        .route("/refresh", post(snapshot::refresh))
}

/// Filter and paging parameters shared by the list endpoints
///
/// Every field is optional; `"all"` or an empty value disables the
/// corresponding predicate.
#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub user_id: Option<String>,
    pub entity_type: Option<String>,
    pub action_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub window_days: Option<u32>,
}

impl AuditQuery {
    pub fn to_filter(&self) -> AppResult<ActivityFilter> {
        Ok(ActivityFilter {
            date_range: DateRange::new(
                parse_date("start", self.start.as_deref())?,
                parse_date("end", self.end.as_deref())?,
            ),
            user_id: non_empty(self.user_id.as_deref()),
            entity_type: self
                .entity_type
                .as_deref()
                .map(Selector::parse)
                .unwrap_or_default(),
            action_type: self
                .action_type
                .as_deref()
                .map(Selector::parse)
                .unwrap_or_default(),
            search_text: non_empty(self.search.as_deref()),
        })
    }
}

fn parse_date(name: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("{} must be a YYYY-MM-DD date, got '{}'", name, s))),
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// One page of a newest-first list
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Reload the snapshot after a write when configured to
async fn refresh_after_write(state: &AppState) {
    if !state.config.audit.refresh_on_write {
        return;
    }
    if let Err(e) = state.timeline.refresh().await {
        warn!("Snapshot refresh after write failed: {}", e);
    }
}
