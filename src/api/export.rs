//! Export endpoint

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use super::statistics::window_days;
use crate::{
    models::ExportRequest,
    services::{local_now, query, statistics, ExportService},
    utils::AppResult,
    AppState,
};

/// Render the filtered view as a downloadable document
pub async fn export_view(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> AppResult<Response> {
    let days = window_days(&state, request.window_days)?;
    let now = local_now();

    let snapshot = state.timeline.snapshot().await;
    let activities = query::filter(&snapshot.activities, &request.filter);
    let changes = query::filter(&snapshot.changes, &request.filter);
    let stats = statistics::summarize(&activities, &changes, now, days);

    let body = ExportService::export_snapshot(
        &activities,
        &changes,
        &request.filter,
        &stats,
        now,
        request.format,
    )?;

    info!(
        format = request.format.as_str(),
        activities = activities.len(),
        changes = changes.len(),
        "Exported audit view"
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        ExportService::file_name(now, request.format)
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, request.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
