//! JSON wire frames
//!
//! Both transports speak text frames of the shape `{ "type": ..., "data": ... }`.
//! Agents send `register` / `error` / `stats` frames to the ingestion hub;
//! the server pushes `servers` / `errors` / `newError` / `insights` frames
//! to dashboard subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AgentRecord, ErrorReport, Insight, LineCounters, PlatformInfo, StoredError};

/// Payload of the `register` frame an agent sends right after connecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub server_id: String,
    pub server_name: String,
    pub log_files: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub platform: PlatformInfo,
}

/// Payload of the periodic `stats` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub server_id: String,
    pub stats: LineCounters,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the agent started.
    pub uptime: u64,
    /// Process resident memory in bytes.
    pub memory: u64,
}

/// Frames sent from an agent to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AgentMessage {
    Register(RegisterData),
    Error(ErrorReport),
    Stats(StatsData),
}

/// Frames broadcast from the server to dashboard subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum DashboardMessage {
    /// Full agent list, sent on any agent state change.
    Servers(Vec<AgentRecord>),
    /// Most-recent errors snapshot.
    Errors(Vec<StoredError>),
    /// A single freshly ingested (or merged) error.
    NewError(StoredError),
    /// Current insight list.
    Insights(Vec<Insight>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ParserKind, SemanticFlags};

    #[test]
    fn register_frame_uses_wire_field_names() {
        let data = RegisterData {
            server_id: "web-01".into(),
            server_name: "web-01".into(),
            log_files: vec!["/var/log/syslog".into()],
            timestamp: Utc::now(),
            version: "0.1.0".into(),
            platform: PlatformInfo {
                hostname: "web-01".into(),
                platform: "linux".into(),
                arch: "x86_64".into(),
                runtime_version: "0.1.0".into(),
                memory: 1024,
            },
        };
        let value = serde_json::to_value(AgentMessage::Register(data)).unwrap();
        assert_eq!(value["type"], "register");
        assert_eq!(value["data"]["serverId"], "web-01");
        assert_eq!(value["data"]["platform"]["runtimeVersion"], "0.1.0");
    }

    #[test]
    fn error_frame_round_trips() {
        let report = ErrorReport {
            server_id: "a".into(),
            server_name: "a".into(),
            log_file: "/var/log/app.log".into(),
            line_number: 12,
            timestamp: Utc::now(),
            error_message: "Database connection failed".into(),
            parser: ParserKind::Generic,
            urgency: 10,
            semantics: SemanticFlags {
                has_database: true,
                ..Default::default()
            },
        };
        let text = serde_json::to_string(&AgentMessage::Error(report)).unwrap();
        assert!(text.contains("\"errorMessage\""));
        assert!(text.contains("\"hasDatabase\":true"));
        let back: AgentMessage = serde_json::from_str(&text).unwrap();
        match back {
            AgentMessage::Error(r) => assert_eq!(r.urgency, 10),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn new_error_frame_tag_is_camel_case() {
        let report = StoredError {
            id: "x".into(),
            server_id: "a".into(),
            server_name: "a".into(),
            log_file: "f".into(),
            line_number: 0,
            timestamp: Utc::now(),
            error_message: "m".into(),
            parser: ParserKind::Fallback,
            urgency: 5,
            semantics: SemanticFlags::default(),
            severity: crate::models::Severity::High,
            category: "General".into(),
            count: 1,
            first_seen: Utc::now(),
            last_seen: Utc::now(),
            trend: crate::models::Trend::New,
        };
        let value = serde_json::to_value(DashboardMessage::NewError(report)).unwrap();
        assert_eq!(value["type"], "newError");
        assert_eq!(value["data"]["severity"], "high");
    }
}
