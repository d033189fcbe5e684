//! Summary statistics endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use super::AuditQuery;
use crate::{
    config::MAX_TREND_WINDOW_DAYS,
    models::TimelineStatistics,
    services::local_now,
    utils::{AppError, AppResult},
    AppState,
};

/// Resolve the requested trend window against the configured default
pub(super) fn window_days(state: &AppState, requested: Option<u32>) -> AppResult<u32> {
    let days = requested.unwrap_or(state.config.audit.trend_window_days);
    if days == 0 || days > MAX_TREND_WINDOW_DAYS {
        return Err(AppError::bad_request(format!(
            "window_days must be between 1 and {}",
            MAX_TREND_WINDOW_DAYS
        )));
    }
    Ok(days)
}

pub async fn get_statistics(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<TimelineStatistics>> {
    let filter = params.to_filter()?;
    let days = window_days(&state, params.window_days)?;

    let stats = state.timeline.statistics(&filter, local_now(), days).await;
    Ok(Json(stats))
}
