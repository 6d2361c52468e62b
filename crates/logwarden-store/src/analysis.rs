//! Message normalization, categorization and severity
//!
//! All three are pure functions of the message text, so two occurrences
//! of the same message always land in the same fingerprint, category and
//! severity bucket.

use std::sync::OnceLock;

use logwarden_core::Severity;
use regex::Regex;

/// Collapse the volatile parts of a message into stable placeholders.
///
/// Lowercases and trims, then replaces UUIDs, ISO-ish timestamps and bare
/// integers with `uuid` / `timestamp` / `number`. UUIDs go first so their
/// all-digit groups are not eaten by the integer rule; timestamps go
/// before integers for the same reason. Placeholders are lowercase so the
/// function is idempotent.
pub fn normalize_message(message: &str) -> String {
    static UUID: OnceLock<Regex> = OnceLock::new();
    static TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    static INTEGER: OnceLock<Regex> = OnceLock::new();

    let uuid = UUID.get_or_init(|| {
        Regex::new(r"[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}")
            .expect("uuid regex")
    });
    let timestamp = TIMESTAMP.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}[t ]\d{2}:\d{2}:\d{2}(\.\d{3})?z?").expect("timestamp regex")
    });
    let integer = INTEGER.get_or_init(|| Regex::new(r"\b\d+\b").expect("integer regex"));

    let lowered = message.to_lowercase();
    let trimmed = lowered.trim();
    let step = uuid.replace_all(trimmed, "uuid");
    let step = timestamp.replace_all(&step, "timestamp");
    integer.replace_all(&step, "number").into_owned()
}

/// Ordered category table; first match wins, fallback is "General".
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Database Connectivity",
        &["connection", "timeout", "database", "db", "mysql", "postgres", "mongo"],
    ),
    (
        "Authentication",
        &["auth", "login", "password", "token", "permission", "unauthorized", "401", "403"],
    ),
    (
        "Network Issues",
        &["network", "dns", "host", "unreachable", "connection refused", "timeout"],
    ),
    (
        "File System",
        &["file", "directory", "permission denied", "disk", "space", "io error"],
    ),
    (
        "Memory Issues",
        &["memory", "oom", "heap", "stack overflow", "out of memory"],
    ),
    (
        "Data Processing",
        &["json", "parse", "format", "invalid", "malformed", "corrupt"],
    ),
    (
        "Resource Management",
        &["queue", "pool", "limit", "capacity", "overflow", "resource"],
    ),
    (
        "Configuration",
        &["config", "setting", "parameter", "missing", "invalid config"],
    ),
    (
        "API Issues",
        &["api", "endpoint", "route", "404", "500", "service unavailable"],
    ),
    (
        "Security",
        &["security", "attack", "breach", "suspicious", "blocked", "firewall"],
    ),
];

/// Deterministic category for a raw message.
pub fn categorize(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    for (name, keywords) in CATEGORIES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return name;
        }
    }
    "General"
}

/// Severity bucket derived from the raw message, keyword tiers from
/// worst to mildest.
pub fn severity_of(message: &str) -> Severity {
    const CRITICAL: &[&str] = &["fatal", "critical", "emergency", "panic", "severe"];
    const HIGH: &[&str] = &["error", "fail", "exception", "timeout", "refused", "denied"];
    const MEDIUM: &[&str] = &["warn", "warning", "deprecated", "retry"];

    let lower = message.to_lowercase();
    if CRITICAL.iter().any(|kw| lower.contains(kw)) {
        Severity::Critical
    } else if HIGH.iter().any(|kw| lower.contains(kw)) {
        Severity::High
    } else if MEDIUM.iter().any(|kw| lower.contains(kw)) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_volatile_tokens() {
        assert_eq!(
            normalize_message("Request 4812 failed at 2025-08-01T10:30:15Z"),
            "request number failed at timestamp"
        );
    }

    #[test]
    fn normalize_handles_uuids_before_integers() {
        let out = normalize_message("session 1234abcd-1234-4321-aaaa-123456789012 expired");
        assert_eq!(out, "session uuid expired");
    }

    #[test]
    fn normalize_is_idempotent() {
        for msg in [
            "Request 4812 failed at 2025-08-01T10:30:15Z",
            "session 1234abcd-1234-4321-aaaa-123456789012 expired",
            "  Plain text message  ",
            "counts 1 2 3",
        ] {
            let once = normalize_message(msg);
            assert_eq!(normalize_message(&once), once);
        }
    }

    #[test]
    fn same_message_same_key_despite_noise() {
        let a = normalize_message("worker 17 timed out at 2025-08-01 10:30:15");
        let b = normalize_message("worker 99 timed out at 2025-08-02 11:45:00");
        assert_eq!(a, b);
    }

    #[test]
    fn categorize_first_match_wins() {
        // "timeout" appears in both Database Connectivity and Network
        // Issues; the earlier category takes it.
        assert_eq!(categorize("request timeout"), "Database Connectivity");
        assert_eq!(categorize("dns resolution broken"), "Network Issues");
        assert_eq!(categorize("login rejected"), "Authentication");
        assert_eq!(categorize("could not parse payload"), "Data Processing");
        assert_eq!(categorize("everything is weird"), "General");
    }

    #[test]
    fn categorize_is_deterministic() {
        let msg = "mysql connection dropped";
        assert_eq!(categorize(msg), categorize(msg));
        assert_eq!(categorize(msg), "Database Connectivity");
    }

    #[test]
    fn severity_tiers() {
        assert_eq!(severity_of("FATAL disk crash"), Severity::Critical);
        assert_eq!(severity_of("panic: index out of range"), Severity::Critical);
        assert_eq!(severity_of("request failed"), Severity::High);
        assert_eq!(severity_of("connection refused"), Severity::High);
        assert_eq!(severity_of("deprecated API used"), Severity::Medium);
        assert_eq!(severity_of("service listening on 8080"), Severity::Low);
    }

    #[test]
    fn severity_is_total_over_weird_input() {
        for msg in ["", " ", "ümläuts", "\u{0}"] {
            let s = severity_of(msg);
            assert!(matches!(
                s,
                Severity::Critical | Severity::High | Severity::Medium | Severity::Low
            ));
        }
    }
}
