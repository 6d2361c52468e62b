//! logwarden-core - Core types for the logwarden monitoring pipeline
//!
//! This crate defines the data model shared by agents and the server
//! (events, agent records, stored errors, insights) and the JSON wire
//! frames exchanged over the agent and dashboard transports.

pub mod models;
pub mod protocol;

pub use models::*;
pub use protocol::{AgentMessage, DashboardMessage, RegisterData, StatsData};
