//! Semantic feature extraction

use std::sync::OnceLock;

use logwarden_core::SemanticFlags;
use regex::Regex;

struct FeatureSet {
    ip: Regex,
    url: Regex,
    status_code: Regex,
    timestamp: Regex,
    database: Regex,
    network: Regex,
    auth: Regex,
    memory: Regex,
    security: Regex,
}

fn features() -> &'static FeatureSet {
    static FEATURES: OnceLock<FeatureSet> = OnceLock::new();
    FEATURES.get_or_init(|| {
        fn re(pattern: &str) -> Regex {
            Regex::new(pattern).expect("semantic feature regex must compile")
        }
        FeatureSet {
            ip: re(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b"),
            url: re(r"(?i)https?://\S+"),
            // 4xx and 5xx only; 2xx/3xx are not error signals.
            status_code: re(r"\b[45]\d{2}\b"),
            timestamp: re(r"\d{4}-\d{2}-\d{2}|\d{2}:\d{2}:\d{2}"),
            database: re(r"(?i)\b(database|db|sql|mysql|postgres|postgresql|mongodb|mongo|redis)\b"),
            network: re(r"(?i)(\b(network|socket|dns|tcp|udp|unreachable)\b|connection refused)"),
            auth: re(r"(?i)(auth|login|password|token|unauthorized|permission|credential|forbidden)"),
            memory: re(r"(?i)(memory|\boom\b|heap|stack overflow|allocation)"),
            security: re(r"(?i)(security|attack|breach|injection|malicious|suspicious|exploit|firewall)"),
        }
    })
}

/// Scan a message body and set each feature flag that matches.
pub fn extract_semantics(message: &str) -> SemanticFlags {
    let f = features();
    SemanticFlags {
        has_ip_address: f.ip.is_match(message),
        has_url: f.url.is_match(message),
        has_status_code: f.status_code.is_match(message),
        has_timestamp: f.timestamp.is_match(message),
        has_database: f.database.is_match(message),
        has_network: f.network.is_match(message),
        has_auth: f.auth.is_match(message),
        has_memory: f.memory.is_match(message),
        has_security: f.security.is_match(message),
    }
}
