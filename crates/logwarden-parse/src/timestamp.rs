//! Timestamp parsing ladder
//!
//! Accepts the formats the supported log families actually emit.
//! Year-less syslog stamps get the current UTC year injected, so entries
//! from a previous year land on the wrong date across a year boundary
//! (best-effort, same trade-off as classic log viewers).

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;

/// Try to parse one raw timestamp string. Returns `None` when no known
/// shape matches; the caller substitutes "now".
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // RFC 3339 / ISO 8601 with explicit offset.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.into());
    }

    // ISO-ish without timezone. Separator variants are normalized first:
    // nginx uses `/`, ISO uses `T`, log4j uses comma milliseconds.
    let normalized = trimmed
        .trim_end_matches('Z')
        .replace('T', " ")
        .replace('/', "-")
        .replace(',', ".");
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }

    // Apache long form: `Fri Aug 01 10:30:15.123456 2025`.
    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, "%a %b %d %H:%M:%S%.f %Y") {
        return Some(ndt.and_utc());
    }

    // Year-less BSD syslog: `Aug  1 10:30:15`.
    static SYSLOG: OnceLock<Regex> = OnceLock::new();
    let syslog = SYSLOG.get_or_init(|| {
        Regex::new(r"^\w{3}\s+\d{1,2} \d{2}:\d{2}:\d{2}$").expect("syslog timestamp regex")
    });
    if syslog.is_match(trimmed) {
        let with_year = format!("{} {}", Utc::now().year(), trimmed);
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&with_year, "%Y %b %e %H:%M:%S") {
            return Some(ndt.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted(raw: &str) -> String {
        parse_timestamp(raw)
            .unwrap_or_else(|| panic!("should parse: {raw:?}"))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    #[test]
    fn rfc3339_with_offset() {
        assert_eq!(formatted("2025-08-01T10:30:15+02:00"), "2025-08-01 08:30:15");
    }

    #[test]
    fn iso_space_separated() {
        assert_eq!(formatted("2025-08-01 10:30:15"), "2025-08-01 10:30:15");
        assert_eq!(formatted("2025-08-01 10:30:15.123"), "2025-08-01 10:30:15");
        assert_eq!(formatted("2025-08-01 10:30:15Z"), "2025-08-01 10:30:15");
    }

    #[test]
    fn nginx_slash_form() {
        assert_eq!(formatted("2025/08/01 10:30:15"), "2025-08-01 10:30:15");
    }

    #[test]
    fn apache_long_form() {
        assert_eq!(
            formatted("Fri Aug 01 10:30:15.123456 2025"),
            "2025-08-01 10:30:15"
        );
        assert_eq!(formatted("Fri Aug 01 10:30:15 2025"), "2025-08-01 10:30:15");
    }

    #[test]
    fn syslog_yearless_gets_current_year() {
        let ts = parse_timestamp("Aug  1 10:30:15").expect("syslog stamp should parse");
        assert_eq!(ts.year(), Utc::now().year());
        assert_eq!(ts.format("%m-%d %H:%M:%S").to_string(), "08-01 10:30:15");
    }

    #[test]
    fn garbage_yields_none() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
