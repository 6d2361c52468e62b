//! Server link with reconnection
//!
//! Owns the WebSocket to the server. On every successful open it sends
//! the register frame, then forwards outbound frames until the link
//! drops. Reconnects with exponential backoff (doubling from the base
//! delay, capped at 60 s); the attempt counter resets on a successful
//! open. Frames queued while the link is down are discarded, keeping
//! delivery at-most-once.

use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use logwarden_core::{AgentMessage, RegisterData};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ReconnectOptions {
    pub base_delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u64>,
}

enum SessionEnd {
    Cancelled,
    Disconnected,
}

pub async fn run_connection(
    url: String,
    register: RegisterData,
    mut outbound: mpsc::Receiver<AgentMessage>,
    options: ReconnectOptions,
    cancel: CancellationToken,
) {
    let mut attempt: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                attempt = 0;
                tracing::info!(%url, "connected to server");
                match session(stream, &register, &mut outbound, &cancel).await {
                    SessionEnd::Cancelled => return,
                    SessionEnd::Disconnected => {
                        tracing::warn!(%url, "server link lost");
                    }
                }
            }
            Err(error) => {
                tracing::warn!(%url, %error, "connection attempt failed");
            }
        }

        // At-most-once: frames produced during the gap are dropped, not
        // replayed after reconnect.
        while outbound.try_recv().is_ok() {}

        attempt += 1;
        if let Some(max) = options.max_attempts {
            if attempt >= max {
                tracing::error!(attempt, "reconnect attempts exhausted, giving up");
                return;
            }
        }

        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(16).min(16);
        let delay = (options.base_delay * 2u32.pow(exponent)).min(MAX_BACKOFF);
        tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn session(
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    register: &RegisterData,
    outbound: &mut mpsc::Receiver<AgentMessage>,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut sink, mut source) = stream.split();

    // Fresh timestamp per registration, not per agent start.
    let mut register = register.clone();
    register.timestamp = Utc::now();
    if !send_frame(&mut sink, &AgentMessage::Register(register)).await {
        return SessionEnd::Disconnected;
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(WsMessage::Close(None)).await;
                return SessionEnd::Cancelled;
            }
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if !send_frame(&mut sink, &frame).await {
                        return SessionEnd::Disconnected;
                    }
                }
                // Pipeline gone; nothing left to forward.
                None => return SessionEnd::Cancelled,
            },
            incoming = source.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | None => return SessionEnd::Disconnected,
                Some(Ok(_)) => {} // the server does not command agents
                Some(Err(error)) => {
                    tracing::debug!(%error, "server socket error");
                    return SessionEnd::Disconnected;
                }
            },
        }
    }
}

async fn send_frame<S>(sink: &mut S, frame: &AgentMessage) -> bool
where
    S: SinkExt<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(error) => {
            tracing::error!(%error, "failed to serialize outbound frame");
            return true;
        }
    };
    match sink.send(WsMessage::Text(text)).await {
        Ok(()) => true,
        Err(error) => {
            tracing::debug!(%error, "send failed");
            false
        }
    }
}

impl ReconnectOptions {
    pub fn from_config(config: &crate::config::ReconnectConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_attempts: u64::try_from(config.max_attempts).ok(),
        }
    }
}
