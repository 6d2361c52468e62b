//! Agent listing handlers

use axum::extract::{Path, State};
use axum::Json;
use logwarden_core::AgentRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/servers
pub async fn list_servers(State(state): State<AppState>) -> Json<Vec<AgentRecord>> {
    Json(state.registry.read().await.list())
}

/// GET /api/servers/:server_id
pub async fn get_server(
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<Json<AgentRecord>, ApiError> {
    state
        .registry
        .read()
        .await
        .get(&server_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown server: {server_id}")))
}
