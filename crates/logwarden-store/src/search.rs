//! Cue-based search over stored errors
//!
//! A query is scanned for a small fixed set of cue tokens; every cue
//! that matches contributes one filter and the filters are AND-combined.
//! The free-text fallback fires only when *no* cue matched, so a query
//! like "database random-token" returns every Database Connectivity
//! error regardless of the extra token. That asymmetry is intentional
//! and kept for dashboard compatibility.

use std::sync::OnceLock;

use logwarden_core::{Severity, StoredError, Trend};
use regex::Regex;

const MAX_RESULTS: usize = 100;
const DEFAULT_RESULTS: usize = 50;

type Filter = Box<dyn Fn(&StoredError) -> bool>;

/// Search `records` (already most-recent-first) with the free-text
/// query `query`. An empty query returns the most recent 50 records.
pub(crate) fn search_errors<'a, I>(records: I, query: &str) -> Vec<StoredError>
where
    I: Iterator<Item = &'a StoredError>,
{
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return records.take(DEFAULT_RESULTS).cloned().collect();
    }

    let lower = trimmed.to_lowercase();
    let filters = cue_filters(&lower);

    if filters.is_empty() {
        // No cue matched: plain substring search.
        return records
            .filter(|record| {
                record.error_message.to_lowercase().contains(&lower)
                    || record.server_name.to_lowercase().contains(&lower)
                    || record.category.to_lowercase().contains(&lower)
            })
            .take(MAX_RESULTS)
            .cloned()
            .collect();
    }

    records
        .filter(|record| filters.iter().all(|filter| filter(record)))
        .take(MAX_RESULTS)
        .cloned()
        .collect()
}

fn cue_filters(query_lower: &str) -> Vec<Filter> {
    let mut filters: Vec<Filter> = Vec::new();

    if query_lower.contains("critical") || query_lower.contains("urgent") {
        filters.push(Box::new(|record| record.severity == Severity::Critical));
    }
    if query_lower.contains("database") || query_lower.contains("db") {
        filters.push(Box::new(|record| record.category == "Database Connectivity"));
    }
    if query_lower.contains("timeout") {
        filters.push(Box::new(|record| {
            record.error_message.to_lowercase().contains("timeout")
        }));
    }
    if query_lower.contains("new") || query_lower.contains("recent") {
        filters.push(Box::new(|record| {
            matches!(record.trend, Trend::New | Trend::Increasing)
        }));
    }

    static SERVER_CUE: OnceLock<Regex> = OnceLock::new();
    let server_cue =
        SERVER_CUE.get_or_init(|| Regex::new(r"server[- ]?(\w+)").expect("server cue regex"));
    if let Some(caps) = server_cue.captures(query_lower) {
        let needle = caps[1].to_string();
        filters.push(Box::new(move |record| {
            record.server_id.to_lowercase().contains(&needle)
                || record.server_name.to_lowercase().contains(&needle)
        }));
    }

    filters
}
