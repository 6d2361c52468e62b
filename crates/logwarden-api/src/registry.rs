//! Server-side registry of known agents
//!
//! Records are created on first `register` and kept across disconnects;
//! only the status flips. The registry never holds transport handles:
//! each hub connection task remembers which agent it carries and reports
//! the close itself.

use std::collections::HashMap;

use chrono::Utc;
use logwarden_core::{AgentRecord, AgentStatus, RegisterData, StatsData};

#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentRecord>,
}

impl AgentRegistry {
    /// Create or revive a record from a `register` frame. Counters and
    /// the original registration time survive reconnects; identity
    /// fields are refreshed from the new frame.
    pub fn register(&mut self, data: RegisterData) {
        let now = Utc::now();
        match self.agents.get_mut(&data.server_id) {
            Some(record) => {
                record.server_name = data.server_name;
                record.platform = data.platform;
                record.log_files = data.log_files;
                record.status = AgentStatus::Online;
                record.last_seen = now;
            }
            None => {
                self.agents.insert(
                    data.server_id.clone(),
                    AgentRecord {
                        server_id: data.server_id,
                        server_name: data.server_name,
                        platform: data.platform,
                        log_files: data.log_files,
                        status: AgentStatus::Online,
                        error_count: 0,
                        warning_count: 0,
                        success_count: 0,
                        registered_at: now,
                        last_seen: now,
                    },
                );
            }
        }
    }

    pub fn mark_offline(&mut self, server_id: &str) {
        if let Some(record) = self.agents.get_mut(server_id) {
            record.status = AgentStatus::Offline;
            record.last_seen = Utc::now();
        }
    }

    /// Bump the error counter when the hub routes an error frame.
    pub fn record_error(&mut self, server_id: &str) {
        if let Some(record) = self.agents.get_mut(server_id) {
            record.error_count += 1;
            record.last_seen = Utc::now();
        }
    }

    /// Adopt the cumulative counters from a `stats` frame.
    pub fn merge_stats(&mut self, data: &StatsData) {
        if let Some(record) = self.agents.get_mut(&data.server_id) {
            record.error_count = data.stats.errors;
            record.warning_count = data.stats.warnings;
            record.success_count = data.stats.success;
            record.last_seen = Utc::now();
        }
    }

    pub fn get(&self, server_id: &str) -> Option<AgentRecord> {
        self.agents.get(server_id).cloned()
    }

    /// Snapshot of every record, oldest registration first.
    pub fn list(&self) -> Vec<AgentRecord> {
        let mut records: Vec<AgentRecord> = self.agents.values().cloned().collect();
        records.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));
        records
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn online_count(&self) -> usize {
        self.agents
            .values()
            .filter(|record| record.status == AgentStatus::Online)
            .count()
    }

    /// Summed counters across all agents: (errors, warnings, success).
    pub fn totals(&self) -> (u64, u64, u64) {
        self.agents.values().fold((0, 0, 0), |acc, record| {
            (
                acc.0 + record.error_count,
                acc.1 + record.warning_count,
                acc.2 + record.success_count,
            )
        })
    }
}
