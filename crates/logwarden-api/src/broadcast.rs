//! Dashboard push channel
//!
//! Best-effort WebSocket fan-out. Frames are serialized once and shared
//! through a `tokio::sync::broadcast` channel; slow subscribers that lag
//! behind simply skip the frames they missed.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use logwarden_core::DashboardMessage;
use tokio::sync::broadcast;

use crate::state::AppState;

/// Handle to the push channel. Cheap to clone; publishing with no
/// subscribers connected is a no-op.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<String>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Serialize and fan out one frame to all connected dashboards.
    pub fn publish(&self, message: &DashboardMessage) {
        match serde_json::to_string(message) {
            Ok(text) => {
                let _ = self.tx.send(text);
            }
            Err(error) => tracing::error!(%error, "failed to serialize dashboard frame"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

/// Router for the dashboard push port (one WebSocket route at `/`).
pub fn dashboard_router(state: AppState) -> Router {
    Router::new().route("/", get(dashboard_ws)).with_state(state)
}

async fn dashboard_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_dashboard_socket(socket, state))
}

async fn handle_dashboard_socket(mut socket: WebSocket, state: AppState) {
    // Subscribe before snapshotting so frames published while the
    // snapshots are in flight are not lost.
    let mut updates = state.broadcaster.subscribe();

    let snapshots = {
        let registry = state.registry.read().await;
        let store = state.store.read().await;
        [
            DashboardMessage::Servers(registry.list()),
            DashboardMessage::Errors(store.recent_errors(50)),
            DashboardMessage::Insights(store.insights().to_vec()),
        ]
    };
    for frame in snapshots {
        let Ok(text) = serde_json::to_string(&frame) else {
            continue;
        };
        if socket.send(Message::Text(text)).await.is_err() {
            return;
        }
    }
    tracing::debug!("dashboard subscriber connected");

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "dashboard subscriber lagged, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                // Dashboards only listen; anything but close is ignored.
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    tracing::debug!(%error, "dashboard socket error");
                    break;
                }
            },
        }
    }
    tracing::debug!("dashboard subscriber disconnected");
}
