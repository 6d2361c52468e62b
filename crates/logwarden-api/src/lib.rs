//! logwarden-api - HTTP layer of the central server
//!
//! Three surfaces share one [`AppState`]:
//! - the read-only REST API for polling dashboards (`create_router`),
//! - the dashboard push channel (`dashboard_router`), a WebSocket
//!   fan-out of `{type, data}` frames,
//! - the agent ingestion hub (`agent_router`), the WebSocket endpoint
//!   agents stream `register` / `error` / `stats` frames to.
//!
//! # Usage
//!
//! ```ignore
//! use logwarden_api::{create_router, AppState};
//!
//! let state = AppState::new(StoreConfig::default());
//! let rest = create_router(state.clone());
//! let push = logwarden_api::dashboard_router(state.clone());
//! let hub = logwarden_api::agent_router(state);
//! ```

pub mod broadcast;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod registry;
pub mod state;

pub use broadcast::{dashboard_router, Broadcaster};
pub use error::ApiError;
pub use hub::agent_router;
pub use registry::AgentRegistry;
pub use state::AppState;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the REST router. Purely read-only; every mutation enters the
/// system through the agent hub.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/servers", get(handlers::servers::list_servers))
        .route("/api/servers/:server_id", get(handlers::servers::get_server))
        .route("/api/errors", get(handlers::errors::list_errors))
        .route("/api/stats", get(handlers::stats::get_stats))
        .route("/api/insights", get(handlers::insights::list_insights))
        .route("/api/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
