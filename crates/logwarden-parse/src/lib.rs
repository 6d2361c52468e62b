//! logwarden-parse - Smart log line parser
//!
//! Turns one raw log line into a structured [`LogEvent`]: format
//! detection, field extraction, level normalization, semantic feature
//! flags and an urgency score. `parse` is a total function; a line no
//! parser understands still yields a fallback event with level inferred
//! from its content.

mod formats;
mod semantics;
mod timestamp;
mod urgency;

pub use semantics::extract_semantics;
pub use timestamp::parse_timestamp;
pub use urgency::score_urgency;

use chrono::Utc;
use logwarden_core::{LogEvent, LogFormat, LogLevel, ParserKind};

use formats::RawParts;

/// Parse a single line according to the file's declared format.
///
/// A declared format that fails to match falls through to the generic
/// parser; a line the generic patterns also miss produces a fallback
/// event whose level is inferred from keywords in the line.
pub fn parse(line: &str, format: LogFormat) -> LogEvent {
    let parts = match format {
        LogFormat::Auto => dispatch_auto(line),
        LogFormat::Json => formats::parse_json(line).or_else(|| formats::parse_generic(line)),
        LogFormat::Nginx => formats::parse_nginx(line).or_else(|| formats::parse_generic(line)),
        LogFormat::Apache => formats::parse_apache(line).or_else(|| formats::parse_generic(line)),
        LogFormat::Syslog => formats::parse_syslog(line).or_else(|| formats::parse_generic(line)),
    };

    match parts {
        Some(parts) => finish(line, parts),
        None => fallback(line),
    }
}

/// Content-based routing for `auto` files.
fn dispatch_auto(line: &str) -> Option<RawParts> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('{') {
        if let Some(parts) = formats::parse_json(line) {
            return Some(parts);
        }
    } else if line.contains("nginx") {
        if let Some(parts) = formats::parse_nginx(line) {
            return Some(parts);
        }
    } else if line.contains("apache") {
        if let Some(parts) = formats::parse_apache(line) {
            return Some(parts);
        }
    } else if formats::looks_like_syslog(line) {
        if let Some(parts) = formats::parse_syslog(line) {
            return Some(parts);
        }
    }
    formats::parse_generic(line)
}

fn finish(line: &str, parts: RawParts) -> LogEvent {
    let timestamp = parts
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    let level = match parts.level.as_deref() {
        Some(token) => LogLevel::normalize(token),
        None => detect_level_from_content(&parts.message),
    };

    let message = parts.message.trim().to_string();
    let semantics = extract_semantics(&message);
    let urgency = score_urgency(level, &semantics, line);

    LogEvent {
        timestamp,
        level,
        message,
        original_line: line.to_string(),
        parser: parts.parser,
        metadata: parts.metadata,
        semantics,
        urgency,
    }
}

fn fallback(line: &str) -> LogEvent {
    let message = line.trim().to_string();
    let level = detect_level_from_content(&message);
    let semantics = extract_semantics(&message);
    let urgency = score_urgency(level, &semantics, line);

    LogEvent {
        timestamp: Utc::now(),
        level,
        message,
        original_line: line.to_string(),
        parser: ParserKind::Fallback,
        metadata: serde_json::Map::new(),
        semantics,
        urgency,
    }
}

/// Infer a level from keywords when a line carries no level token.
pub fn detect_level_from_content(text: &str) -> LogLevel {
    const ERROR_WORDS: &[&str] = &[
        "error", "exception", "failed", "failure", "timeout", "refused", "denied", "fatal",
        "critical", "panic", "abort",
    ];
    const WARN_WORDS: &[&str] = &["warning", "warn", "deprecated", "retry", "fallback", "slow"];

    let lower = text.to_lowercase();
    if ERROR_WORDS.iter().any(|w| lower.contains(w)) {
        LogLevel::Error
    } else if WARN_WORDS.iter().any(|w| lower.contains(w)) {
        LogLevel::Warn
    } else {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_generic_line() {
        let event = parse(
            "[2025-08-01 10:30:15] ERROR: Database connection failed",
            LogFormat::Auto,
        );
        assert_eq!(event.parser, ParserKind::Generic);
        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.message, "Database connection failed");
        assert_eq!(event.urgency, 10);
        assert!(event.semantics.has_database);
        assert_eq!(
            event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2025-08-01 10:30:15"
        );
    }

    #[test]
    fn json_line_round_trip() {
        let event = parse(
            r#"{"timestamp":"2025-08-01T10:30:15Z","level":"error","message":"API timeout"}"#,
            LogFormat::Auto,
        );
        assert_eq!(event.parser, ParserKind::Json);
        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.message, "API timeout");
    }

    #[test]
    fn json_extra_fields_land_in_metadata() {
        let event = parse(
            r#"{"level":"warn","msg":"slow query","service":"billing","traceId":"abc"}"#,
            LogFormat::Json,
        );
        assert_eq!(event.level, LogLevel::Warn);
        assert_eq!(event.message, "slow query");
        assert_eq!(event.metadata["service"], "billing");
        assert_eq!(event.metadata["traceId"], "abc");
    }

    #[test]
    fn invalid_json_falls_through_to_generic() {
        let event = parse("{not json at all", LogFormat::Json);
        assert!(matches!(
            event.parser,
            ParserKind::Generic | ParserKind::Fallback
        ));
        assert_eq!(event.message, "{not json at all");
    }

    #[test]
    fn nginx_error_line() {
        let event = parse(
            "2025/08/01 10:30:15 [error] 1234#5678: *42 connect() failed (111: Connection refused) while connecting to upstream",
            LogFormat::Nginx,
        );
        assert_eq!(event.parser, ParserKind::Nginx);
        assert_eq!(event.level, LogLevel::Error);
        assert!(event.message.starts_with("connect() failed"));
        assert_eq!(event.metadata["pid"], "1234");
    }

    #[test]
    fn apache_error_line() {
        let event = parse(
            "[Fri Aug 01 10:30:15.123456 2025] [ssl:warn] [pid 70] [client 10.0.0.5:443] certificate expires soon",
            LogFormat::Apache,
        );
        assert_eq!(event.parser, ParserKind::Apache);
        assert_eq!(event.level, LogLevel::Warn);
        assert_eq!(event.message, "certificate expires soon");
        assert_eq!(event.metadata["client"], "10.0.0.5:443");
    }

    #[test]
    fn syslog_line_level_comes_from_body() {
        let event = parse(
            "Aug  1 10:30:15 web-01 sshd[4242]: Failed password for root from 10.0.0.9",
            LogFormat::Auto,
        );
        assert_eq!(event.parser, ParserKind::Syslog);
        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.metadata["service"], "sshd");
        assert_eq!(event.metadata["hostname"], "web-01");
    }

    #[test]
    fn bare_level_prefix() {
        let event = parse("WARN: disk usage at 91%", LogFormat::Auto);
        assert_eq!(event.parser, ParserKind::Generic);
        assert_eq!(event.level, LogLevel::Warn);
        assert_eq!(event.message, "disk usage at 91%");
    }

    #[test]
    fn unparseable_line_uses_fallback() {
        let event = parse("something odd happened here", LogFormat::Auto);
        assert_eq!(event.parser, ParserKind::Fallback);
        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.message, "something odd happened here");
    }

    #[test]
    fn fallback_infers_error_level() {
        let event = parse("connection refused by peer", LogFormat::Auto);
        assert_eq!(event.parser, ParserKind::Fallback);
        assert_eq!(event.level, LogLevel::Error);
    }

    #[test]
    fn critical_auth_line_scores_high() {
        let event = parse("CRITICAL: Authentication system failed", LogFormat::Auto);
        assert_eq!(event.level, LogLevel::Error);
        assert!(event.semantics.has_auth);
        assert!(event.urgency >= 8);
    }

    #[test]
    fn urgency_never_exceeds_ten() {
        let event = parse(
            "FATAL: security breach, database timeout, out of memory, login failed",
            LogFormat::Auto,
        );
        assert_eq!(event.urgency, 10);
    }

    #[test]
    fn parse_is_total_on_junk() {
        for line in ["", "   ", "\u{0}\u{1}", "]][[", "{\"level\":"] {
            let event = parse(line, LogFormat::Auto);
            assert!(event.urgency <= 10);
        }
    }
}
