//! Per-entity history

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{models::EntityType, services::EntityHistory, utils::{AppError, AppResult}, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/{entity_type}/{entity_id}/history", get(get_entity_history))
}

async fn get_entity_history(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> AppResult<Json<EntityHistory>> {
    if entity_type.trim().is_empty() || entity_id.trim().is_empty() {
        return Err(AppError::bad_request("entity_type and entity_id are required"));
    }

    let history = state
        .timeline
        .entity_history(EntityType::parse(&entity_type), &entity_id)
        .await;

    Ok(Json(history))
}
