//! Field-level change record endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::{refresh_after_write, AuditQuery, Page};
use crate::{
    models::{ChangeRecord, NewChange},
    services::query,
    utils::AppResult,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_changes).post(create_change))
}

async fn list_changes(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<Page<ChangeRecord>>> {
    let filter = params.to_filter()?;
    let limit = state.config.audit.page_size(params.limit);
    let offset = params.offset.unwrap_or(0);

    let records = state.timeline.changes(&filter).await;

    Ok(Json(Page {
        total: records.len(),
        items: query::paginate(&records, offset, limit),
        limit,
        offset,
    }))
}

async fn create_change(
    State(state): State<AppState>,
    Json(change): Json<NewChange>,
) -> AppResult<(StatusCode, Json<ChangeRecord>)> {
    let record = state.logger.log_change(change).await?;
    refresh_after_write(&state).await;
    Ok((StatusCode::CREATED, Json(record)))
}
