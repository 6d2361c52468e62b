//! TOML configuration for the agent

use std::path::PathBuf;

use logwarden_core::{LogFormat, WatchedFile};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// One `[[log_files]]` entry. A missing format means "infer from the
/// path, else auto".
#[derive(Debug, Clone, Deserialize)]
pub struct LogFileConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<String>,
}

/// Reconnect tuning. The delay doubles per attempt and is capped at
/// 60 seconds; `max_attempts` below zero means retry forever.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// WebSocket URL of the server's agent port.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Stable agent identity; generated from the hostname when absent.
    #[serde(default)]
    pub server_id: Option<String>,
    /// Display name; defaults to the hostname.
    #[serde(default)]
    pub server_name: Option<String>,
    /// Files to tail. Empty triggers auto-discovery of the well-known
    /// system log locations.
    #[serde(default)]
    pub log_files: Vec<LogFileConfig>,
    /// Minimum urgency an ERROR event needs to be forwarded.
    #[serde(default = "default_urgency_threshold")]
    pub urgency_threshold: u8,
    /// Emit a stats frame every N processed lines.
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
    /// File metadata poll cadence.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay before retrying a file that failed to stat or read.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            server_id: None,
            server_name: None,
            log_files: Vec::new(),
            urgency_threshold: default_urgency_threshold(),
            stats_interval: default_stats_interval(),
            poll_interval_ms: default_poll_interval_ms(),
            retry_delay_secs: default_retry_delay_secs(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// The configured files with their formats resolved.
    pub fn watched_files(&self) -> Vec<WatchedFile> {
        self.log_files
            .iter()
            .map(|entry| {
                let format = match &entry.format {
                    Some(name) => LogFormat::from_name(name),
                    None => crate::discovery::format_for_path(&entry.path),
                };
                WatchedFile::new(entry.path.clone(), format)
            })
            .collect()
    }
}

fn default_server_url() -> String {
    "ws://127.0.0.1:8080".to_string()
}

fn default_urgency_threshold() -> u8 {
    5
}

fn default_stats_interval() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> i64 {
    -1
}
