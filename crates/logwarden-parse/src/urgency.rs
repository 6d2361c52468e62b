//! Urgency scoring
//!
//! Combines the normalized level, the semantic feature flags and a few
//! high-signal keywords from the original line into an integer score in
//! [0, 10]. Agents only forward errors whose score clears a configured
//! threshold, so this is the noise gate for the whole pipeline.

use logwarden_core::{LogLevel, SemanticFlags};

/// Score one event. The keyword boosts scan the original line, not the
/// extracted message, so format prefixes still count.
pub fn score_urgency(level: LogLevel, semantics: &SemanticFlags, original_line: &str) -> u8 {
    let mut score: i32 = match level {
        LogLevel::Error => 8,
        LogLevel::Warn => 4,
        LogLevel::Info => 1,
        LogLevel::Debug => 0,
    };

    if semantics.has_database {
        score += 2;
    }
    if semantics.has_network {
        score += 1;
    }
    if semantics.has_auth {
        score += 3;
    }
    if semantics.has_security {
        score += 5;
    }
    if semantics.has_memory {
        score += 2;
    }
    if semantics.has_status_code {
        score += 1;
    }

    let lower = original_line.to_lowercase();
    if lower.contains("critical") || lower.contains("fatal") {
        score += 3;
    }
    if lower.contains("timeout") {
        score += 2;
    }
    if lower.contains("failed") || lower.contains("failure") {
        score += 2;
    }

    score.clamp(0, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_semantics;

    #[test]
    fn level_bases() {
        let none = SemanticFlags::default();
        assert_eq!(score_urgency(LogLevel::Error, &none, "x"), 8);
        assert_eq!(score_urgency(LogLevel::Warn, &none, "x"), 4);
        assert_eq!(score_urgency(LogLevel::Info, &none, "x"), 1);
        assert_eq!(score_urgency(LogLevel::Debug, &none, "x"), 0);
    }

    #[test]
    fn semantic_boosts_stack() {
        let line = "auth token rejected by security module";
        let flags = extract_semantics(line);
        assert!(flags.has_auth && flags.has_security);
        // WARN 4 + auth 3 + security 5 = 12, clamped.
        assert_eq!(score_urgency(LogLevel::Warn, &flags, line), 10);
    }

    #[test]
    fn keyword_boosts_read_the_original_line() {
        let flags = SemanticFlags::default();
        assert_eq!(score_urgency(LogLevel::Info, &flags, "request timeout"), 3);
        assert_eq!(score_urgency(LogLevel::Info, &flags, "job failed"), 3);
        assert_eq!(score_urgency(LogLevel::Info, &flags, "fatal condition"), 4);
    }

    #[test]
    fn score_is_clamped_to_ten() {
        let line = "FATAL security breach: database timeout, auth failure, out of memory";
        let flags = extract_semantics(line);
        assert_eq!(score_urgency(LogLevel::Error, &flags, line), 10);
    }
}
