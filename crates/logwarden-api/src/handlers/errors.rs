//! Stored error query handler

use axum::extract::{Query, State};
use axum::Json;
use logwarden_core::StoredError;
use serde::Deserialize;

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ErrorsQuery {
    pub limit: Option<usize>,
    pub q: Option<String>,
}

/// GET /api/errors?limit=N&q=...
///
/// `q` goes through the cue-based search; without it the most recent
/// records are returned. `limit` defaults to 50 and is capped at 100.
pub async fn list_errors(
    State(state): State<AppState>,
    Query(query): Query<ErrorsQuery>,
) -> Json<Vec<StoredError>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let store = state.store.read().await;

    let mut results = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => store.search(q),
        _ => store.recent_errors(limit),
    };
    results.truncate(limit);
    Json(results)
}
