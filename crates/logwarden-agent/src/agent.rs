//! Agent core: the per-line pipeline
//!
//! Wires the tailers to the server link. Every delivered line is
//! parsed, counted by level, and forwarded as an `error` frame when it
//! is an ERROR whose urgency clears the configured threshold. Every N
//! processed lines a cumulative `stats` frame goes out. Outbound frames
//! are handed to the connection through a bounded channel with
//! `try_send`, so a down link never stalls a tailer.

use std::time::{Duration, Instant};

use chrono::Utc;
use logwarden_core::{
    AgentMessage, ErrorReport, LineCounters, LogLevel, RegisterData, StatsData, WatchedFile,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::connection::{run_connection, ReconnectOptions};
use crate::discovery::discover_log_files;
use crate::platform;
use crate::tailer::{spawn_tailer, TailedLine, TailerOptions};

const LINE_CHANNEL_CAPACITY: usize = 1024;
const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

/// Run the agent until the token is cancelled.
pub async fn run_agent(config: AgentConfig, cancel: CancellationToken) {
    let files = resolve_files(&config);
    if files.is_empty() {
        tracing::warn!("no log files configured or discovered; nothing to monitor");
    }

    let hostname = platform::hostname();
    let server_name = config.server_name.clone().unwrap_or_else(|| hostname.clone());
    let server_id = config.server_id.clone().unwrap_or_else(|| {
        format!("{}-{}", hostname, &Uuid::new_v4().to_string()[..8])
    });

    let register = RegisterData {
        server_id: server_id.clone(),
        server_name: server_name.clone(),
        log_files: files
            .iter()
            .map(|file| file.path.display().to_string())
            .collect(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        platform: platform::platform_info(),
    };

    tracing::info!(
        server_id = %server_id,
        server_name = %server_name,
        files = files.len(),
        url = %config.server_url,
        "agent starting"
    );

    let (line_tx, mut line_rx) = mpsc::channel::<TailedLine>(LINE_CHANNEL_CAPACITY);
    let (out_tx, out_rx) = mpsc::channel::<AgentMessage>(OUTBOUND_CHANNEL_CAPACITY);

    let tailer_options = TailerOptions {
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        retry_delay: Duration::from_secs(config.retry_delay_secs),
    };
    for file in files {
        spawn_tailer(file, tailer_options.clone(), line_tx.clone(), cancel.clone());
    }
    // Hold one sender so the pipeline stays up (and the agent stays
    // registered) even when there are no tailers.
    let _line_sender = line_tx;

    let connection = tokio::spawn(run_connection(
        config.server_url.clone(),
        register,
        out_rx,
        ReconnectOptions::from_config(&config.reconnect),
        cancel.clone(),
    ));

    let mut counters = LineCounters::default();
    let started = Instant::now();
    let stats_interval = config.stats_interval.max(1);

    loop {
        let tailed = tokio::select! {
            _ = cancel.cancelled() => break,
            tailed = line_rx.recv() => match tailed {
                Some(tailed) => tailed,
                None => break,
            },
        };

        let event = logwarden_parse::parse(&tailed.line, tailed.file.format);
        counters.total_lines += 1;
        match event.level {
            LogLevel::Error => counters.errors += 1,
            LogLevel::Warn => counters.warnings += 1,
            LogLevel::Info | LogLevel::Debug => counters.success += 1,
        }

        if event.level == LogLevel::Error && event.urgency >= config.urgency_threshold {
            let report = ErrorReport {
                server_id: server_id.clone(),
                server_name: server_name.clone(),
                log_file: tailed.file.path.display().to_string(),
                line_number: tailed.line_number,
                timestamp: event.timestamp,
                error_message: event.message,
                parser: event.parser,
                urgency: event.urgency,
                semantics: event.semantics,
            };
            forward(&out_tx, AgentMessage::Error(report));
        }

        if counters.total_lines % stats_interval == 0 {
            let stats = StatsData {
                server_id: server_id.clone(),
                stats: counters,
                timestamp: Utc::now(),
                uptime: started.elapsed().as_secs(),
                memory: platform::process_memory(),
            };
            forward(&out_tx, AgentMessage::Stats(stats));
        }
    }

    cancel.cancel();
    let _ = connection.await;
    tracing::info!("agent stopped");
}

/// Frames are droppable: errors are at-most-once and stats frames are
/// cumulative, so the next one resynchronizes the server.
fn forward(out_tx: &mpsc::Sender<AgentMessage>, frame: AgentMessage) {
    if let Err(error) = out_tx.try_send(frame) {
        tracing::debug!(%error, "outbound frame dropped");
    }
}

fn resolve_files(config: &AgentConfig) -> Vec<WatchedFile> {
    if config.log_files.is_empty() {
        discover_log_files()
    } else {
        config.watched_files()
    }
}
