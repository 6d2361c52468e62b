//! Liveness endpoint

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sysinfo::System;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime: u64,
    /// Resident memory of this process in bytes.
    pub memory: u64,
    pub servers: usize,
    pub errors: usize,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: state.uptime_secs(),
        memory: process_memory(),
        servers: state.registry.read().await.len(),
        errors: state.store.read().await.len(),
    })
}

fn process_memory() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return 0;
    }
    system.process(pid).map(|process| process.memory()).unwrap_or(0)
}
