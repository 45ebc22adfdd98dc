//! Display session lifecycle: one connected client from upgrade through
//! disconnect.
//!
//! ```text
//! accept ─▶ await one registration message ─┬─▶ invalid / timeout ─▶ close
//!                                           └─▶ register(guild)
//!                                                 ├─ outbound: queue → socket, pings
//!                                                 └─ inbound: close detection only
//!                                               ─▶ unregister
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use relay_core::{ConnectionId, GuildId};
use relay_settings::ServerSettings;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::connection::DisplayConnection;
use super::registration::{RegistrationError, parse_registration};
use super::registry::ClientRegistry;

/// Lower bound on the ping interval.
const MIN_PING_INTERVAL: Duration = Duration::from_millis(10);

/// Per-connection tunables, taken from [`ServerSettings`].
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Outbound queue depth.
    pub send_queue_size: usize,
    /// Interval between server pings.
    pub ping_interval: Duration,
    /// How long to wait for the registration message.
    pub registration_timeout: Duration,
}

impl From<&ServerSettings> for SessionConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            send_queue_size: settings.send_queue_size.max(1),
            ping_interval: settings.ping_interval().max(MIN_PING_INTERVAL),
            registration_timeout: settings.registration_timeout(),
        }
    }
}

fn close_message(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

/// Run a display session until the client leaves or the server shuts down.
#[instrument(skip_all, fields(conn_id = %conn_id, guild_id))]
pub async fn run_display_session(
    ws: WebSocket,
    conn_id: ConnectionId,
    registry: Arc<ClientRegistry>,
    config: SessionConfig,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    debug!("display connected, awaiting registration");

    let registered = tokio::select! {
        result = await_registration(&mut ws_rx, config.registration_timeout) => result,
        () = shutdown.cancelled() => {
            let _ = ws_tx.send(close_message(close_code::AWAY, "server shutting down")).await;
            return;
        }
    };
    let guild_id = match registered {
        Ok(guild_id) => guild_id,
        Err(RegistrationError::Closed) => {
            debug!("display left before registering");
            return;
        }
        Err(e) => {
            warn!(error = %e, "registration rejected, closing connection");
            let _ = ws_tx.send(close_message(close_code::POLICY, "registration required")).await;
            return;
        }
    };
    let _ = tracing::Span::current().record("guild_id", guild_id.as_str());

    let (send_tx, send_rx) = mpsc::channel(config.send_queue_size);
    let connection = Arc::new(DisplayConnection::new(conn_id.clone(), guild_id, send_tx));
    registry.register(connection.clone());

    let mut outbound = tokio::spawn(forward_outbound(
        ws_tx,
        send_rx,
        connection.clone(),
        config.ping_interval,
        shutdown,
    ));

    // After registration inbound frames only matter for liveness and close.
    let mut outbound_finished = false;
    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Close(_))) => {
                    info!("display sent close frame");
                    break;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => connection.mark_alive(),
                Some(Ok(_)) => debug!("ignoring message after registration"),
                Some(Err(e)) => {
                    debug!(error = %e, "socket read failed");
                    break;
                }
                None => break,
            },
            _ = &mut outbound => {
                outbound_finished = true;
                break;
            }
        }
    }

    let _ = registry.unregister(&conn_id);
    info!(
        age_secs = connection.age().as_secs(),
        dropped = connection.drop_count(),
        "display disconnected"
    );
    drop(connection);
    if !outbound_finished {
        outbound.abort();
    }
}

async fn await_registration(
    ws_rx: &mut SplitStream<WebSocket>,
    timeout: Duration,
) -> Result<GuildId, RegistrationError> {
    tokio::time::timeout(timeout, first_message(ws_rx))
        .await
        .map_err(|_| RegistrationError::Timeout(timeout))?
}

async fn first_message(ws_rx: &mut SplitStream<WebSocket>) -> Result<GuildId, RegistrationError> {
    loop {
        match ws_rx.next().await {
            Some(Ok(Message::Text(text))) => return parse_registration(text.as_str()),
            Some(Ok(Message::Binary(data))) => {
                let text = std::str::from_utf8(&data).map_err(|_| RegistrationError::NotText)?;
                return parse_registration(text);
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Ok(Message::Close(_)) | Err(_)) | None => return Err(RegistrationError::Closed),
        }
    }
}

/// Forward queued payloads to the socket and ping periodically.
///
/// On shutdown, payloads already queued are flushed before the close frame.
async fn forward_outbound(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut send_rx: mpsc::Receiver<Arc<String>>,
    connection: Arc<DisplayConnection>,
    ping_interval: Duration,
    shutdown: CancellationToken,
) {
    let pong_timeout = ping_interval * 2;
    let mut ping = tokio::time::interval(ping_interval);
    let _ = ping.tick().await;

    loop {
        tokio::select! {
            msg = send_rx.recv() => match msg {
                Some(text) => {
                    if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            _ = ping.tick() => {
                if !connection.check_alive() && connection.last_pong_elapsed() > pong_timeout {
                    warn!(timeout = ?pong_timeout, "display unresponsive, disconnecting");
                    let _ = ws_tx.send(close_message(close_code::AWAY, "heartbeat timeout")).await;
                    break;
                }
                if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }
            () = shutdown.cancelled() => {
                while let Ok(text) = send_rx.try_recv() {
                    if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                        break;
                    }
                }
                let _ = ws_tx.send(close_message(close_code::AWAY, "server shutting down")).await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_from_settings() {
        let settings = ServerSettings {
            send_queue_size: 0,
            ping_interval_ms: 0,
            registration_timeout_ms: 1500,
            ..ServerSettings::default()
        };
        let config = SessionConfig::from(&settings);
        assert_eq!(config.send_queue_size, 1);
        assert_eq!(config.ping_interval, MIN_PING_INTERVAL);
        assert_eq!(config.registration_timeout, Duration::from_millis(1500));
    }
}
