//! Agent identity and server-side agent records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host facts an agent reports when it registers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub hostname: String,
    /// Operating system family (linux, macos, windows, ...).
    pub platform: String,
    pub arch: String,
    pub runtime_version: String,
    /// Total memory in bytes.
    pub memory: u64,
}

/// Liveness of an agent as tracked by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Offline,
}

/// Cumulative line counters an agent reports in its stats frames.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCounters {
    pub errors: u64,
    pub warnings: u64,
    pub success: u64,
    pub total_lines: u64,
}

/// Server-side record of a registered agent.
///
/// Records survive disconnects: the status flips to offline and the
/// counters are preserved. The live transport handle is owned by the
/// ingestion hub, never by this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub server_id: String,
    pub server_name: String,
    pub platform: PlatformInfo,
    pub log_files: Vec<String>,
    pub status: AgentStatus,
    pub error_count: u64,
    pub warning_count: u64,
    pub success_count: u64,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}
