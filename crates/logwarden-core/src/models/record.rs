//! Stored error records and the error report wire payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{ParserKind, SemanticFlags};

/// Severity bucket derived from the raw message on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Rolling classification of how often a normalized message recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    New,
    Stable,
    Increasing,
    Decreasing,
}

/// One high-urgency error as reported by an agent (the `error` frame
/// payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub server_id: String,
    pub server_name: String,
    pub log_file: String,
    /// Coarse position hint (file size / 100), advisory only.
    pub line_number: u64,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    pub parser: ParserKind,
    pub urgency: u8,
    pub semantics: SemanticFlags,
}

/// A deduplicated error held by the in-memory store.
///
/// Identity is the fingerprint (server id, log file, normalized
/// message); repeat occurrences merge into the existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredError {
    pub id: String,
    pub server_id: String,
    pub server_name: String,
    pub log_file: String,
    pub line_number: u64,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    pub parser: ParserKind,
    pub urgency: u8,
    pub semantics: SemanticFlags,
    pub severity: Severity,
    pub category: String,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub trend: Trend,
}
