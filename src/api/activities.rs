//! Activity endpoints: audit log list, timeline and writes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{refresh_after_write, AuditQuery, Page};
use crate::{
    models::{ActivityRecord, ChangeRecord, FieldChange, NewActivity, TimelineDay},
    services::{query, LoggedActivity},
    utils::{AppError, AppResult},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route("/timeline", get(get_timeline))
        .route("/{id}/changes", get(get_activity_changes))
}

/// Body of `POST /activities`
#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub activity: NewActivity,
    #[serde(default)]
    pub changes: Vec<FieldChange>,
}

async fn list_activities(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<Page<ActivityRecord>>> {
    let filter = params.to_filter()?;
    let limit = state.config.audit.page_size(params.limit);
    let offset = params.offset.unwrap_or(0);

    let records = state.timeline.activities(&filter).await;

    Ok(Json(Page {
        total: records.len(),
        items: query::paginate(&records, offset, limit),
        limit,
        offset,
    }))
}

async fn get_timeline(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<Vec<TimelineDay>>> {
    let filter = params.to_filter()?;
    Ok(Json(state.timeline.timeline(&filter).await))
}

async fn get_activity_changes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ChangeRecord>>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::bad_request(format!("Invalid activity id: {}", id)))?;

    let activity = state
        .timeline
        .find_activity(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("Activity {} not found", id)))?;

    Ok(Json(state.timeline.changes_for_activity(&activity).await))
}

async fn create_activity(
    State(state): State<AppState>,
    Json(request): Json<CreateActivityRequest>,
) -> AppResult<(StatusCode, Json<LoggedActivity>)> {
    let logged = state
        .logger
        .log_with_changes(request.activity, request.changes)
        .await?;

    refresh_after_write(&state).await;

    Ok((StatusCode::CREATED, Json(logged)))
}
