//! Per-format line extractors
//!
//! Each extractor returns `None` when the line does not match its shape;
//! the dispatcher then falls through to the generic patterns. Regexes are
//! compiled once in `OnceLock` statics.

use std::sync::OnceLock;

use logwarden_core::ParserKind;
use regex::Regex;
use serde_json::{Map, Value};

/// Raw capture output of one format extractor, before level
/// normalization and timestamp parsing.
pub(crate) struct RawParts {
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub message: String,
    pub parser: ParserKind,
    pub metadata: Map<String, Value>,
}

impl RawParts {
    fn new(parser: ParserKind, message: String) -> Self {
        Self {
            timestamp: None,
            level: None,
            message,
            parser,
            metadata: Map::new(),
        }
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("format regex must compile"))
}

/// `Mon  1 10:30:15 host service...` prefix check used by auto routing.
pub(crate) fn looks_like_syslog(line: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\w{3}\s+\d{1,2} \d{2}:\d{2}:\d{2} \S+ \S+").is_match(line)
}

/// Generic patterns, tried in order:
/// `[ts] LEVEL: body`, `iso-ts LEVEL: body`, `LEVEL: body`.
pub(crate) fn parse_generic(line: &str) -> Option<RawParts> {
    static BRACKETED: OnceLock<Regex> = OnceLock::new();
    static ISO_FIRST: OnceLock<Regex> = OnceLock::new();
    static LEVEL_FIRST: OnceLock<Regex> = OnceLock::new();

    let bracketed = regex(&BRACKETED, r"^\[([^\]]+)\]\s*([A-Za-z]+)[:\s]+(.*)$");
    if let Some(caps) = bracketed.captures(line) {
        let mut parts = RawParts::new(ParserKind::Generic, caps[3].to_string());
        parts.timestamp = Some(caps[1].to_string());
        parts.level = Some(caps[2].to_string());
        return Some(parts);
    }

    let iso_first = regex(
        &ISO_FIRST,
        r"^(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?Z?)\s+([A-Za-z]+)[:\s]*(.*)$",
    );
    if let Some(caps) = iso_first.captures(line) {
        let mut parts = RawParts::new(ParserKind::Generic, caps[3].to_string());
        parts.timestamp = Some(caps[1].to_string());
        parts.level = Some(caps[2].to_string());
        return Some(parts);
    }

    let level_first = regex(
        &LEVEL_FIRST,
        r"(?i)^(ERROR|ERR|FATAL|CRITICAL|CRIT|WARNING|WARN|INFO|NOTICE|DEBUG|TRACE|VERBOSE)[:\s]+(.*)$",
    );
    if let Some(caps) = level_first.captures(line) {
        let mut parts = RawParts::new(ParserKind::Generic, caps[2].to_string());
        parts.level = Some(caps[1].to_string());
        return Some(parts);
    }

    None
}

/// Structured JSON lines. Accepts the common field aliases for
/// timestamp, level and message; any remaining fields are kept as
/// metadata.
pub(crate) fn parse_json(line: &str) -> Option<RawParts> {
    let value: Value = serde_json::from_str(line.trim()).ok()?;
    let object = value.as_object()?;

    let timestamp = pick_string(object, &["timestamp", "time", "@timestamp"]);
    let level = pick_string(object, &["level", "severity"]);
    let message = pick_string(object, &["message", "msg", "text"]).unwrap_or_default();

    const CONSUMED: &[&str] = &[
        "timestamp",
        "time",
        "@timestamp",
        "level",
        "severity",
        "message",
        "msg",
        "text",
    ];
    let metadata: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| !CONSUMED.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(RawParts {
        timestamp,
        level,
        message,
        parser: ParserKind::Json,
        metadata,
    })
}

fn pick_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        object.get(*key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    })
}

/// nginx error log: `2025/08/01 10:30:15 [error] pid#tid: (*conn )body`.
pub(crate) fn parse_nginx(line: &str) -> Option<RawParts> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &RE,
        r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}) \[(\w+)\] (\d+)#(\d+): (?:\*(\d+) )?(.*)$",
    );
    let caps = re.captures(line)?;

    let mut parts = RawParts::new(ParserKind::Nginx, caps[6].to_string());
    parts.timestamp = Some(caps[1].to_string());
    parts.level = Some(caps[2].to_string());
    parts.metadata.insert("pid".into(), Value::from(&caps[3]));
    parts.metadata.insert("tid".into(), Value::from(&caps[4]));
    if let Some(conn) = caps.get(5) {
        parts
            .metadata
            .insert("connection".into(), Value::from(conn.as_str()));
    }
    Some(parts)
}

/// Apache error log: `[ts] [module:level] ([pid N] )([client addr] )body`.
/// The level token may carry a module prefix (`ssl:warn`); only the part
/// after the last colon is the level.
pub(crate) fn parse_apache(line: &str) -> Option<RawParts> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &RE,
        r"^\[([^\]]+)\] \[([^\]]+)\] (?:\[pid (\d+)\] )?(?:\[client ([^\]]+)\] )?(.*)$",
    );
    let caps = re.captures(line)?;

    let level_token = caps[2].rsplit(':').next().unwrap_or(&caps[2]).to_string();

    let mut parts = RawParts::new(ParserKind::Apache, caps[5].to_string());
    parts.timestamp = Some(caps[1].to_string());
    parts.level = Some(level_token);
    if let Some(pid) = caps.get(3) {
        parts
            .metadata
            .insert("pid".into(), Value::from(pid.as_str()));
    }
    if let Some(client) = caps.get(4) {
        parts
            .metadata
            .insert("client".into(), Value::from(client.as_str()));
    }
    Some(parts)
}

/// BSD syslog: `Mon  1 10:30:15 host service[pid]: body`. Syslog lines
/// carry no level token; the caller infers one from the body.
pub(crate) fn parse_syslog(line: &str) -> Option<RawParts> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &RE,
        r"^(\w{3}\s+\d{1,2} \d{2}:\d{2}:\d{2}) (\S+) ([^:\[\s]+)(?:\[(\d+)\])?: (.*)$",
    );
    let caps = re.captures(line)?;

    let mut parts = RawParts::new(ParserKind::Syslog, caps[5].to_string());
    parts.timestamp = Some(caps[1].to_string());
    parts
        .metadata
        .insert("hostname".into(), Value::from(&caps[2]));
    parts
        .metadata
        .insert("service".into(), Value::from(&caps[3]));
    if let Some(pid) = caps.get(4) {
        parts
            .metadata
            .insert("pid".into(), Value::from(pid.as_str()));
    }
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_bracketed_captures_all_fields() {
        let parts = parse_generic("[2025-08-01 10:30:15] WARN: slow request").unwrap();
        assert_eq!(parts.timestamp.as_deref(), Some("2025-08-01 10:30:15"));
        assert_eq!(parts.level.as_deref(), Some("WARN"));
        assert_eq!(parts.message, "slow request");
    }

    #[test]
    fn generic_iso_prefix() {
        let parts = parse_generic("2025-08-01T10:30:15Z ERROR out of disk").unwrap();
        assert_eq!(parts.level.as_deref(), Some("ERROR"));
        assert_eq!(parts.message, "out of disk");
    }

    #[test]
    fn generic_rejects_plain_prose() {
        assert!(parse_generic("the service started normally").is_none());
    }

    #[test]
    fn json_aliases() {
        let parts = parse_json(r#"{"time":"2025-08-01T10:30:15Z","severity":"err","text":"boom"}"#)
            .unwrap();
        assert_eq!(parts.timestamp.as_deref(), Some("2025-08-01T10:30:15Z"));
        assert_eq!(parts.level.as_deref(), Some("err"));
        assert_eq!(parts.message, "boom");
    }

    #[test]
    fn json_non_object_is_rejected() {
        assert!(parse_json("[1, 2, 3]").is_none());
        assert!(parse_json("42").is_none());
    }

    #[test]
    fn nginx_without_connection_id() {
        let parts =
            parse_nginx("2025/08/01 10:30:15 [warn] 7#0: worker exiting").unwrap();
        assert_eq!(parts.level.as_deref(), Some("warn"));
        assert_eq!(parts.message, "worker exiting");
        assert!(parts.metadata.get("connection").is_none());
    }

    #[test]
    fn apache_minimal_form() {
        let parts = parse_apache("[Fri Aug 01 10:30:15 2025] [error] mod_rewrite failure").unwrap();
        assert_eq!(parts.level.as_deref(), Some("error"));
        assert_eq!(parts.message, "mod_rewrite failure");
    }

    #[test]
    fn syslog_without_pid() {
        let parts = parse_syslog("Aug 21 03:14:00 db-02 cron: job finished").unwrap();
        assert_eq!(parts.metadata["service"], "cron");
        assert!(parts.metadata.get("pid").is_none());
        assert_eq!(parts.message, "job finished");
    }

    #[test]
    fn syslog_prefix_detection() {
        assert!(looks_like_syslog("Aug  1 10:30:15 web-01 sshd[1]: msg"));
        assert!(!looks_like_syslog("2025-08-01 10:30:15 INFO ok"));
    }
}
