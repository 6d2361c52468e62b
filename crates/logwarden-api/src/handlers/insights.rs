//! Insight listing handler

use axum::extract::State;
use axum::Json;
use logwarden_core::Insight;

use crate::state::AppState;

/// GET /api/insights
pub async fn list_insights(State(state): State<AppState>) -> Json<Vec<Insight>> {
    Json(state.store.read().await.insights().to_vec())
}
