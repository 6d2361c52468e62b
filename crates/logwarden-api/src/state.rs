//! Shared application state

use std::sync::Arc;
use std::time::Instant;

use logwarden_store::{MemoryStore, StoreConfig};
use tokio::sync::RwLock;

use crate::broadcast::Broadcaster;
use crate::registry::AgentRegistry;

/// State shared by the REST handlers, the dashboard broadcaster and the
/// agent hub.
///
/// The store and the registry each sit behind a single `RwLock`; the hub
/// holds the store's write lock across ingest plus the pattern/insight
/// recomputation, which keeps every REST or broadcast snapshot
/// consistent.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<MemoryStore>>,
    pub registry: Arc<RwLock<AgentRegistry>>,
    pub broadcaster: Broadcaster,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new(config))),
            registry: Arc::new(RwLock::new(AgentRegistry::default())),
            broadcaster: Broadcaster::new(256),
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
