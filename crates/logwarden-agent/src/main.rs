//! logwarden-agent - Host monitoring agent
//!
//! Tails log files and streams high-urgency errors to a logwarden
//! server.
//!
//! Usage:
//!   logwarden-agent [OPTIONS] [config.toml]
//!
//! With no config file the agent auto-discovers the well-known system
//! log locations and connects to ws://127.0.0.1:8080.

use logwarden_agent::{run_agent, AgentConfig};
use logwarden_agent::config::LogFileConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Args {
    config_path: Option<String>,
    server_url: Option<String>,
    server_id: Option<String>,
    server_name: Option<String>,
    files: Vec<LogFileConfig>,
    urgency_threshold: Option<u8>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        server_url: None,
        server_id: None,
        server_name: None,
        files: Vec::new(),
        urgency_threshold: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--server-url" | "-s" => {
                result.server_url = Some(take_value(&args, &mut i, "--server-url")?);
            }
            "--id" => {
                result.server_id = Some(take_value(&args, &mut i, "--id")?);
            }
            "--name" => {
                result.server_name = Some(take_value(&args, &mut i, "--name")?);
            }
            "--file" | "-f" => {
                let value = take_value(&args, &mut i, "--file")?;
                // "path" or "path:format"
                let (path, format) = match value.rsplit_once(':') {
                    Some((path, format)) if !format.contains('/') => {
                        (path.to_string(), Some(format.to_string()))
                    }
                    _ => (value, None),
                };
                result.files.push(LogFileConfig {
                    path: path.into(),
                    format,
                });
            }
            "--urgency-threshold" => {
                result.urgency_threshold =
                    Some(take_value(&args, &mut i, "--urgency-threshold")?.parse()?);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            other => {
                anyhow::bail!("Unknown argument: {other}");
            }
        }
    }

    Ok(result)
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> anyhow::Result<String> {
    if *i + 1 < args.len() {
        let value = args[*i + 1].clone();
        *i += 2;
        Ok(value)
    } else {
        anyhow::bail!("Missing argument for {flag}")
    }
}

fn print_help() {
    eprintln!(
        r#"logwarden-agent - Host monitoring agent

Usage: logwarden-agent [OPTIONS] [config.toml]

Options:
  -s, --server-url <url>        Server agent port (default ws://127.0.0.1:8080)
      --id <id>                 Stable agent id (default: derived from hostname)
      --name <name>             Display name (default: hostname)
  -f, --file <path[:format]>    Tail this file; format is one of
                                nginx|apache|json|syslog|auto.
                                Can be given multiple times.
      --urgency-threshold <n>   Minimum urgency to forward (default 5)
  -h, --help                    Print this help message

Examples:
  # Auto-discover system logs, local server
  logwarden-agent

  # Explicit files and server
  logwarden-agent -s ws://monitor:8080 -f /var/log/nginx/error.log:nginx -f /srv/app/app.log
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logwarden_agent=info,logwarden_parse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;

    let mut config = match &args.config_path {
        Some(path) => {
            tracing::info!(%path, "loading config");
            AgentConfig::load(path)?
        }
        None => AgentConfig::default(),
    };

    // CLI flags override the file.
    if let Some(url) = args.server_url {
        config.server_url = url;
    }
    if let Some(id) = args.server_id {
        config.server_id = Some(id);
    }
    if let Some(name) = args.server_name {
        config.server_name = Some(name);
    }
    if !args.files.is_empty() {
        config.log_files = args.files;
    }
    if let Some(threshold) = args.urgency_threshold {
        config.urgency_threshold = threshold;
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            signal_cancel.cancel();
        }
    });

    run_agent(config, cancel).await;
    Ok(())
}
