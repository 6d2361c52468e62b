//! The in-memory error store

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use logwarden_core::{ErrorReport, Insight, StoredError, Trend};
use uuid::Uuid;

use crate::analysis::{categorize, normalize_message, severity_of};
use crate::insights;
use crate::search;

/// How far back an occurrence still counts as "recent" for trend and
/// anomaly windows.
pub(crate) const RECENT_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound on stored error records; oldest are trimmed.
    pub max_errors: usize,
    /// Upper bound on pattern-table keys; the least recently seen key is
    /// evicted when the table is full.
    pub pattern_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let max_errors = 1000;
        Self {
            max_errors,
            pattern_capacity: max_errors * 4,
        }
    }
}

impl StoreConfig {
    pub fn with_max_errors(max_errors: usize) -> Self {
        Self {
            max_errors,
            pattern_capacity: max_errors.saturating_mul(4),
        }
    }
}

/// Aggregate row in the pattern table, keyed by normalized message.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub count: u64,
    pub servers: HashSet<String>,
    pub last_seen: DateTime<Utc>,
}

/// One stored record plus its precomputed fingerprint key.
#[derive(Debug, Clone)]
struct Entry {
    key: String,
    record: StoredError,
}

/// Deduplicating, bounded error store.
///
/// The record list is kept most-recent-first; record identity is the
/// fingerprint (server id, log file, normalized message). Insights are
/// regenerated and replaced wholesale on every ingest.
#[derive(Debug)]
pub struct MemoryStore {
    config: StoreConfig,
    entries: Vec<Entry>,
    patterns: HashMap<String, PatternEntry>,
    insights: Vec<Insight>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            patterns: HashMap::new(),
            insights: Vec::new(),
        }
    }

    /// Ingest one reported error.
    ///
    /// Idempotent under the fingerprint: a repeat occurrence merges into
    /// the existing record (count, last seen, trend) instead of creating
    /// a new one. Both branches update the pattern table and regenerate
    /// the insight list. Returns a snapshot of the affected record.
    pub fn add_error(&mut self, report: ErrorReport) -> StoredError {
        let now = Utc::now();
        let key = normalize_message(&report.error_message);

        self.touch_pattern(&key, &report.server_id, now);

        let existing = self.entries.iter().position(|entry| {
            entry.key == key
                && entry.record.server_id == report.server_id
                && entry.record.log_file == report.log_file
        });

        let snapshot = match existing {
            Some(index) => {
                {
                    let record = &mut self.entries[index].record;
                    record.count += 1;
                    record.last_seen = now;
                    record.line_number = report.line_number;
                }
                let record_id = self.entries[index].record.id.clone();
                let trend = self.recurrence_trend(&key, &record_id, now);
                self.entries[index].record.trend = trend;
                self.entries[index].record.clone()
            }
            None => {
                let record = StoredError {
                    id: Uuid::new_v4().to_string(),
                    server_id: report.server_id,
                    server_name: report.server_name,
                    log_file: report.log_file,
                    line_number: report.line_number,
                    timestamp: report.timestamp,
                    error_message: report.error_message.clone(),
                    parser: report.parser,
                    urgency: report.urgency,
                    semantics: report.semantics,
                    severity: severity_of(&report.error_message),
                    category: categorize(&report.error_message).to_string(),
                    count: 1,
                    first_seen: now,
                    last_seen: now,
                    trend: Trend::New,
                };
                let snapshot = record.clone();
                self.entries.insert(
                    0,
                    Entry {
                        key: key.clone(),
                        record,
                    },
                );
                self.entries.truncate(self.config.max_errors);
                snapshot
            }
        };

        self.insights = insights::generate(self);
        snapshot
    }

    /// Trend of a merged record: count the *other* records sharing its
    /// normalized message with activity inside the recent window.
    fn recurrence_trend(&self, key: &str, record_id: &str, now: DateTime<Utc>) -> Trend {
        let cutoff = now - Duration::minutes(RECENT_WINDOW_MINUTES);
        let recurring = self
            .entries
            .iter()
            .filter(|entry| {
                entry.key == key && entry.record.id != record_id && entry.record.last_seen >= cutoff
            })
            .count();

        if recurring == 0 {
            Trend::New
        } else if recurring > 5 {
            Trend::Increasing
        } else if recurring < 2 {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    fn touch_pattern(&mut self, key: &str, server_id: &str, now: DateTime<Utc>) {
        if !self.patterns.contains_key(key) && self.patterns.len() >= self.config.pattern_capacity {
            if let Some(victim) = self
                .patterns
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(key, _)| key.clone())
            {
                self.patterns.remove(&victim);
            }
        }

        let entry = self.patterns.entry(key.to_string()).or_insert(PatternEntry {
            count: 0,
            servers: HashSet::new(),
            last_seen: now,
        });
        entry.count += 1;
        entry.servers.insert(server_id.to_string());
        entry.last_seen = now;
    }

    /// Most recent records, newest first.
    pub fn recent_errors(&self, limit: usize) -> Vec<StoredError> {
        self.entries
            .iter()
            .take(limit)
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Cue-based search over the stored records; see [`search`].
    pub fn search(&self, query: &str) -> Vec<StoredError> {
        search::search_errors(self.records(), query)
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &StoredError> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub(crate) fn patterns(&self) -> &HashMap<String, PatternEntry> {
        &self.patterns
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use logwarden_core::{InsightKind, ParserKind, SemanticFlags, Severity};

    fn report(server: &str, file: &str, message: &str) -> ErrorReport {
        ErrorReport {
            server_id: server.to_string(),
            server_name: server.to_string(),
            log_file: file.to_string(),
            line_number: 1,
            timestamp: Utc::now(),
            error_message: message.to_string(),
            parser: ParserKind::Generic,
            urgency: 8,
            semantics: SemanticFlags::default(),
        }
    }

    #[test]
    fn first_occurrence_creates_a_new_record() {
        let mut store = MemoryStore::default();
        let stored = store.add_error(report("a", "app.log", "Database connection failed"));
        assert_eq!(stored.count, 1);
        assert_eq!(stored.trend, Trend::New);
        assert_eq!(stored.category, "Database Connectivity");
        assert_eq!(stored.severity, Severity::High);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn repeat_occurrences_merge_by_fingerprint() {
        let mut store = MemoryStore::default();
        store.add_error(report("a", "app.log", "worker 1 timed out"));
        store.add_error(report("a", "app.log", "worker 2 timed out"));
        let stored = store.add_error(report("a", "app.log", "worker 3 timed out"));
        assert_eq!(store.len(), 1, "numbers normalize into one fingerprint");
        assert_eq!(stored.count, 3);
        assert!(stored.first_seen <= stored.last_seen);
    }

    #[test]
    fn fingerprint_includes_server_and_file() {
        let mut store = MemoryStore::default();
        store.add_error(report("a", "app.log", "disk full"));
        store.add_error(report("b", "app.log", "disk full"));
        store.add_error(report("a", "other.log", "disk full"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn no_two_records_share_a_fingerprint() {
        let mut store = MemoryStore::default();
        for server in ["a", "b"] {
            for n in 0..4 {
                store.add_error(report(server, "app.log", &format!("request {n} failed")));
            }
        }
        let mut fingerprints = std::collections::HashSet::new();
        for record in store.records() {
            let key = (
                record.server_id.clone(),
                record.log_file.clone(),
                normalize_message(&record.error_message),
            );
            assert!(fingerprints.insert(key), "duplicate fingerprint in store");
        }
    }

    #[test]
    fn capacity_trims_oldest_records() {
        let mut store = MemoryStore::new(StoreConfig::with_max_errors(5));
        for n in 0..8 {
            // Distinct words so normalization does not merge them.
            store.add_error(report("a", "app.log", &format!("oops{} happened", "x".repeat(n + 1))));
        }
        assert_eq!(store.len(), 5);
        // Most recent first: the newest message survives at the front.
        let newest = store.recent_errors(1);
        assert!(newest[0].error_message.contains(&"x".repeat(8)));
    }

    #[test]
    fn merged_record_is_mutated_not_reinserted() {
        let mut store = MemoryStore::default();
        let first = store.add_error(report("a", "app.log", "cache miss storm"));
        let second = store.add_error(report("a", "app.log", "cache miss storm"));
        assert_eq!(first.id, second.id);
        assert_eq!(second.count, 2);
    }

    #[test]
    fn cross_server_pattern_insight_appears() {
        let mut store = MemoryStore::default();
        for server in ["a", "b"] {
            for _ in 0..6 {
                store.add_error(report(server, "app.log", "replica sync failed"));
            }
        }
        // Two records (fingerprint includes server), one shared pattern.
        assert_eq!(store.len(), 2);
        let pattern = store
            .insights()
            .iter()
            .find(|insight| insight.kind == InsightKind::Pattern)
            .expect("pattern insight expected");
        // 12 occurrences: min(95, 60 + 2 * 12) = 84.
        assert_eq!(pattern.confidence, 84);
        assert!(pattern.pattern.is_some());
    }

    #[test]
    fn database_recommendation_appears_after_four_errors() {
        let mut store = MemoryStore::default();
        for n in 0..4 {
            store.add_error(report(
                &format!("srv{n}"),
                "db.log",
                &format!("mysql replica {} lagging", "x".repeat(n + 1)),
            ));
        }
        assert!(store
            .insights()
            .iter()
            .any(|insight| insight.kind == InsightKind::Recommendation));
    }

    #[test]
    fn insights_are_replaced_not_accumulated() {
        let mut store = MemoryStore::default();
        for server in ["a", "b"] {
            for _ in 0..6 {
                store.add_error(report(server, "app.log", "replica sync failed"));
            }
        }
        let after_pattern = store.insights().len();
        store.add_error(report("c", "other.log", "unrelated hiccup"));
        // Regenerated from scratch; the pattern insight is still derivable
        // so the list stays small and bounded.
        assert!(store.insights().len() <= 5);
        assert!(after_pattern <= 5);
    }

    #[test]
    fn pattern_table_capacity_is_enforced() {
        let mut store = MemoryStore::new(StoreConfig {
            max_errors: 4,
            pattern_capacity: 4,
        });
        for n in 0..10 {
            store.add_error(report("a", "app.log", &format!("kind{} broke", "y".repeat(n + 1))));
        }
        assert!(store.patterns().len() <= 4);
    }
}
