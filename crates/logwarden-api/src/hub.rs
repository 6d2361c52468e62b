//! Agent ingestion hub
//!
//! Accepts the persistent WebSocket links agents open and routes their
//! `{type, data}` frames. Malformed frames are logged and ignored, never
//! grounds for disconnecting the agent. When a link closes for any
//! reason, the owning agent record flips to offline and the new agent
//! list is broadcast.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use logwarden_core::{AgentMessage, DashboardMessage};

use crate::state::AppState;

/// Router for the agent transport port (one WebSocket route at `/`).
pub fn agent_router(state: AppState) -> Router {
    Router::new().route("/", get(agent_ws)).with_state(state)
}

async fn agent_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_agent_socket(socket, state))
}

async fn handle_agent_socket(mut socket: WebSocket, state: AppState) {
    // Which agent this connection carries, learned from its register
    // frame. Kept here instead of a reverse map on the record so the
    // close path has no back reference to chase.
    let mut server_id: Option<String> = None;

    while let Some(message) = socket.recv().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<AgentMessage>(&text) {
                Ok(frame) => dispatch(&state, &mut server_id, frame).await,
                Err(error) => {
                    tracing::warn!(%error, "ignoring malformed agent frame");
                }
            },
            Ok(Message::Close(_)) => break,
            // Ping/pong are answered by the protocol layer; binary
            // frames are not part of the contract.
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(%error, "agent socket error");
                break;
            }
        }
    }

    if let Some(id) = server_id {
        state.registry.write().await.mark_offline(&id);
        let servers = state.registry.read().await.list();
        state.broadcaster.publish(&DashboardMessage::Servers(servers));
        tracing::info!(server_id = %id, "agent disconnected");
    }
}

async fn dispatch(state: &AppState, server_id: &mut Option<String>, frame: AgentMessage) {
    match frame {
        AgentMessage::Register(data) => {
            tracing::info!(
                server_id = %data.server_id,
                server_name = %data.server_name,
                files = data.log_files.len(),
                "agent registered"
            );
            *server_id = Some(data.server_id.clone());
            state.registry.write().await.register(data);
            let servers = state.registry.read().await.list();
            state.broadcaster.publish(&DashboardMessage::Servers(servers));
        }

        AgentMessage::Error(report) => {
            let reporting_agent = report.server_id.clone();
            // One write lock spans ingest and both snapshots, so the
            // broadcast never shows a half-applied update.
            let (stored, recent, insights) = {
                let mut store = state.store.write().await;
                let stored = store.add_error(report);
                let recent = store.recent_errors(50);
                let insights = store.insights().to_vec();
                (stored, recent, insights)
            };
            state.registry.write().await.record_error(&reporting_agent);

            tracing::debug!(
                server_id = %reporting_agent,
                category = %stored.category,
                count = stored.count,
                "error ingested"
            );
            state.broadcaster.publish(&DashboardMessage::NewError(stored));
            state.broadcaster.publish(&DashboardMessage::Errors(recent));
            state
                .broadcaster
                .publish(&DashboardMessage::Insights(insights));
        }

        AgentMessage::Stats(data) => {
            state.registry.write().await.merge_stats(&data);
            let servers = state.registry.read().await.list();
            state.broadcaster.publish(&DashboardMessage::Servers(servers));
        }
    }
}
