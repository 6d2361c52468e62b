//! logwardend - logwarden server daemon
//!
//! Central server of the monitoring pipeline. Serves three listeners:
//! the REST API for polling dashboards, the dashboard push WebSocket
//! (REST port + 1) and the agent ingestion WebSocket.
//!
//! Usage:
//!   logwardend [OPTIONS] [config.toml]

use std::net::SocketAddr;

use logwarden_api::{agent_router, create_router, dashboard_router, AppState};
use logwarden_store::StoreConfig;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_http_port")]
    http_port: u16,
    #[serde(default = "default_agent_port")]
    agent_port: u16,
    #[serde(default = "default_max_errors")]
    max_errors: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            agent_port: default_agent_port(),
            max_errors: default_max_errors(),
        }
    }
}

fn default_http_port() -> u16 {
    3001
}

fn default_agent_port() -> u16 {
    8080
}

fn default_max_errors() -> usize {
    1000
}

struct Args {
    config_path: Option<String>,
    http_port: Option<u16>,
    agent_port: Option<u16>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        http_port: None,
        agent_port: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    result.http_port = Some(args[i + 1].parse()?);
                    i += 2;
                } else {
                    anyhow::bail!("Missing argument for --port");
                }
            }
            "--agent-port" => {
                if i + 1 < args.len() {
                    result.agent_port = Some(args[i + 1].parse()?);
                    i += 2;
                } else {
                    anyhow::bail!("Missing argument for --agent-port");
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            other => anyhow::bail!("Unknown argument: {other}"),
        }
    }

    Ok(result)
}

fn print_help() {
    eprintln!(
        r#"logwardend - logwarden server daemon

Usage: logwardend [OPTIONS] [config.toml]

Options:
  -p, --port <port>        REST API port (default 3001); the dashboard
                           push WebSocket listens on port + 1
      --agent-port <port>  Agent ingestion port (default 8080)
  -h, --help               Print this help message

Config file:
  [server]
  http_port = 3001
  agent_port = 8080
  max_errors = 1000
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logwardend=info,logwarden_api=info,logwarden_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting logwardend");

    let args = parse_args()?;
    let mut server = match &args.config_path {
        Some(path) => {
            tracing::info!(%path, "loading config");
            let content = std::fs::read_to_string(path)?;
            let config: ConfigFile = toml::from_str(&content)?;
            config.server
        }
        None => ServerConfig::default(),
    };
    if let Some(port) = args.http_port {
        server.http_port = port;
    }
    if let Some(port) = args.agent_port {
        server.agent_port = port;
    }

    let state = AppState::new(StoreConfig::with_max_errors(server.max_errors));

    let rest_addr = SocketAddr::from(([0, 0, 0, 0], server.http_port));
    let push_addr = SocketAddr::from(([0, 0, 0, 0], server.http_port + 1));
    let agent_addr = SocketAddr::from(([0, 0, 0, 0], server.agent_port));

    // Bind failures abort startup with a nonzero exit.
    let rest_listener = tokio::net::TcpListener::bind(rest_addr).await?;
    let push_listener = tokio::net::TcpListener::bind(push_addr).await?;
    let agent_listener = tokio::net::TcpListener::bind(agent_addr).await?;

    tracing::info!(
        rest = %rest_addr,
        push = %push_addr,
        agents = %agent_addr,
        max_errors = server.max_errors,
        "listening"
    );

    let rest_router = create_router(state.clone());
    let push_router = dashboard_router(state.clone());
    let agent_hub = agent_router(state);

    tokio::try_join!(
        async {
            axum::serve(rest_listener, rest_router)
                .with_graceful_shutdown(shutdown_signal())
                .await
        },
        async {
            axum::serve(push_listener, push_router)
                .with_graceful_shutdown(shutdown_signal())
                .await
        },
        async {
            axum::serve(agent_listener, agent_hub)
                .with_graceful_shutdown(shutdown_signal())
                .await
        },
    )?;

    tracing::info!("logwardend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
}
