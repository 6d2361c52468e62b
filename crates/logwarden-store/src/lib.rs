//! logwarden-store - Volatile error store for the central server
//!
//! Holds the deduplicated error list, the pattern table and the derived
//! insight list. The store itself is a plain owned value; the server
//! wraps it in one `Arc<RwLock<_>>` so ingest (merge + pattern update +
//! insight regeneration) is atomic with respect to REST and broadcast
//! readers.

mod analysis;
mod insights;
mod search;
mod store;

pub use store::{MemoryStore, StoreConfig};
