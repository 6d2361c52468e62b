//! Shared model types

mod agent;
mod event;
mod insight;
mod record;

pub use agent::{AgentRecord, AgentStatus, LineCounters, PlatformInfo};
pub use event::{LogEvent, LogFormat, LogLevel, ParserKind, SemanticFlags, WatchedFile};
pub use insight::{Insight, InsightKind};
pub use record::{ErrorReport, Severity, StoredError, Trend};
