//! Snapshot refresh endpoint

use axum::{extract::State, Json};

use crate::{services::RefreshSummary, utils::AppResult, AppState};

/// Reload both collections; on failure the previous snapshot keeps serving
pub async fn refresh(State(state): State<AppState>) -> AppResult<Json<RefreshSummary>> {
    let summary = state.timeline.refresh().await?;
    Ok(Json(summary))
}
