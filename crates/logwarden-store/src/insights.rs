//! Insight generation
//!
//! Runs on every ingest and rebuilds the whole list from the current
//! store contents; only the five highest-confidence insights survive.

use chrono::{Duration, Utc};
use logwarden_core::{Insight, InsightKind};

use crate::store::{MemoryStore, RECENT_WINDOW_MINUTES};

const MAX_INSIGHTS: usize = 5;

pub(crate) fn generate(store: &MemoryStore) -> Vec<Insight> {
    let mut produced = Vec::new();

    cross_server_patterns(store, &mut produced);
    recent_category_anomaly(store, &mut produced);
    database_recommendation(store, &mut produced);

    // Highest confidence first; stable sort keeps production order on ties.
    produced.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    produced.truncate(MAX_INSIGHTS);
    produced
}

/// A normalized message seen often and on more than one server.
fn cross_server_patterns(store: &MemoryStore, out: &mut Vec<Insight>) {
    for (key, entry) in store.patterns() {
        if entry.count > 5 && entry.servers.len() > 1 {
            let confidence = (60 + 2 * entry.count).min(95) as u8;
            out.push(Insight {
                kind: InsightKind::Pattern,
                title: "Cross-server error pattern detected".to_string(),
                description: format!(
                    "\"{}\" occurred {} times across {} servers",
                    key,
                    entry.count,
                    entry.servers.len()
                ),
                confidence,
                pattern: Some(key.clone()),
            });
        }
    }
}

/// One category dominating the last hour of activity.
fn recent_category_anomaly(store: &MemoryStore, out: &mut Vec<Insight>) {
    let cutoff = Utc::now() - Duration::minutes(RECENT_WINDOW_MINUTES);
    let recent: Vec<_> = store
        .records()
        .filter(|record| record.last_seen >= cutoff)
        .collect();
    if recent.len() <= 10 {
        return;
    }

    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for record in &recent {
        *counts.entry(record.category.as_str()).or_default() += 1;
    }
    let Some((category, count)) = counts.into_iter().max_by_key(|(_, count)| *count) else {
        return;
    };
    if count <= 3 {
        return;
    }

    let share = count * 100 / recent.len();
    out.push(Insight {
        kind: InsightKind::Anomaly,
        title: format!("Spike in {category} errors"),
        description: format!(
            "{count} of the last {} errors ({share}%) are {category}",
            recent.len()
        ),
        confidence: 85,
        pattern: None,
    });
}

/// Standing advice once database trouble accumulates.
fn database_recommendation(store: &MemoryStore, out: &mut Vec<Insight>) {
    let database_errors = store
        .records()
        .filter(|record| record.category == "Database Connectivity")
        .count();
    if database_errors > 3 {
        out.push(Insight {
            kind: InsightKind::Recommendation,
            title: "Review database connectivity".to_string(),
            description: format!(
                "{database_errors} stored errors point at database connectivity; \
                 check connection pool limits and database health"
            ),
            confidence: 78,
            pattern: None,
        });
    }
}
