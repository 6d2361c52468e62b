//! Fleet-wide counter summary

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_errors: u64,
    pub total_success: u64,
    pub total_warnings: u64,
    pub total_servers: usize,
    pub online_servers: usize,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSummary> {
    let registry = state.registry.read().await;
    let (total_errors, total_warnings, total_success) = registry.totals();
    Json(StatsSummary {
        total_errors,
        total_success,
        total_warnings,
        total_servers: registry.len(),
        online_servers: registry.online_count(),
    })
}
