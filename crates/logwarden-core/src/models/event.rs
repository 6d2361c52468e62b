//! Parsed log event model

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized log level carried by every parsed event.
///
/// Raw level tokens from the many formats in the wild (FATAL, CRIT, W,
/// NOTICE, ...) are folded into these four via [`LogLevel::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Fold a raw level token into a normalized level.
    ///
    /// Unrecognized tokens are treated as INFO-equivalent for counting
    /// purposes. Normalization is idempotent: feeding the output string
    /// back in yields the same level.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "ERROR" | "E" | "ERR" | "FATAL" | "CRITICAL" | "CRIT" => Self::Error,
            "WARN" | "W" | "WARNING" => Self::Warn,
            "INFO" | "NOTICE" | "LOG" => Self::Info,
            "DEBUG" | "TRACE" | "VERBOSE" => Self::Debug,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which parser produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Nginx,
    Apache,
    Json,
    Syslog,
    Generic,
    Fallback,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nginx => "nginx",
            Self::Apache => "apache",
            Self::Json => "json",
            Self::Syslog => "syslog",
            Self::Generic => "generic",
            Self::Fallback => "fallback",
        }
    }
}

/// Declared format of a watched log file.
///
/// `Auto` routes each line through content-based detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Nginx,
    Apache,
    Json,
    Syslog,
    #[default]
    Auto,
}

impl LogFormat {
    /// Parse a config-file format string; unknown strings fall back to auto.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nginx" => Self::Nginx,
            "apache" => Self::Apache,
            "json" => Self::Json,
            "syslog" => Self::Syslog,
            _ => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nginx => "nginx",
            Self::Apache => "apache",
            Self::Json => "json",
            Self::Syslog => "syslog",
            Self::Auto => "auto",
        }
    }
}

/// A log file an agent monitors, with its declared format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedFile {
    pub path: PathBuf,
    #[serde(default)]
    pub format: LogFormat,
}

impl WatchedFile {
    pub fn new(path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

/// Boolean feature vector extracted from a message body.
///
/// Feeds urgency scoring on the agent and is carried upstream so the
/// server can reuse it without re-scanning the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SemanticFlags {
    pub has_ip_address: bool,
    pub has_url: bool,
    pub has_status_code: bool,
    pub has_timestamp: bool,
    pub has_database: bool,
    pub has_network: bool,
    pub has_auth: bool,
    pub has_memory: bool,
    pub has_security: bool,
}

/// A single structured event produced by the parser from one raw line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Event time; "now" when the line carried no parseable timestamp.
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Trimmed message body.
    pub message: String,
    pub original_line: String,
    pub parser: ParserKind,
    /// Parser-specific extras (service, hostname, pid, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub semantics: SemanticFlags,
    /// Heuristic urgency in [0, 10].
    pub urgency: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_normalize_folds_aliases() {
        assert_eq!(LogLevel::normalize("fatal"), LogLevel::Error);
        assert_eq!(LogLevel::normalize("CRIT"), LogLevel::Error);
        assert_eq!(LogLevel::normalize("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::normalize("notice"), LogLevel::Info);
        assert_eq!(LogLevel::normalize("trace"), LogLevel::Debug);
        assert_eq!(LogLevel::normalize("whatever"), LogLevel::Info);
    }

    #[test]
    fn level_normalize_is_idempotent() {
        for raw in ["error", "W", "NOTICE", "verbose", "unknown"] {
            let once = LogLevel::normalize(raw);
            assert_eq!(LogLevel::normalize(once.as_str()), once);
        }
    }

    #[test]
    fn format_from_name_defaults_to_auto() {
        assert_eq!(LogFormat::from_name("nginx"), LogFormat::Nginx);
        assert_eq!(LogFormat::from_name("SYSLOG"), LogFormat::Syslog);
        assert_eq!(LogFormat::from_name("weird"), LogFormat::Auto);
    }
}
