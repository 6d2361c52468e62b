//! Test support for the logwarden integration suite
//!
//! Spawns the real REST, dashboard-push and agent-hub listeners
//! in-process on ephemeral ports.

use std::net::SocketAddr;

use logwarden_api::{agent_router, create_router, dashboard_router, AppState};
use logwarden_store::StoreConfig;
use tokio::net::TcpListener;

/// A full in-process server: three listeners sharing one state.
pub struct TestServer {
    pub rest_addr: SocketAddr,
    pub push_addr: SocketAddr,
    pub hub_addr: SocketAddr,
    pub state: AppState,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let state = AppState::new(StoreConfig::default());

        let rest_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let push_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let hub_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let rest_addr = rest_listener.local_addr().unwrap();
        let push_addr = push_listener.local_addr().unwrap();
        let hub_addr = hub_listener.local_addr().unwrap();

        let rest = create_router(state.clone());
        let push = dashboard_router(state.clone());
        let hub = agent_router(state.clone());

        tokio::spawn(async move { axum::serve(rest_listener, rest).await.unwrap() });
        tokio::spawn(async move { axum::serve(push_listener, push).await.unwrap() });
        tokio::spawn(async move { axum::serve(hub_listener, hub).await.unwrap() });

        Self {
            rest_addr,
            push_addr,
            hub_addr,
            state,
        }
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("http://{}{}", self.rest_addr, path)
    }

    pub fn push_url(&self) -> String {
        format!("ws://{}/", self.push_addr)
    }

    pub fn hub_url(&self) -> String {
        format!("ws://{}/", self.hub_addr)
    }
}
