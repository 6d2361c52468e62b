//! Derived insight model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Pattern,
    Anomaly,
    Recommendation,
}

/// A derived fact about the stored error corpus.
///
/// The insight list is replaced wholesale on every ingest; entries are
/// never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    /// Confidence in [0, 100].
    pub confidence: u8,
    /// Normalized message key, present on pattern insights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
