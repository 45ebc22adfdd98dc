//! `/health` body, read straight from the display registry.

use std::time::Instant;

use serde::Serialize;

use crate::websocket::registry::ClientRegistry;

/// Whether the server still accepts displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Accepting and serving displays.
    Ok,
    /// Shutdown started; new displays are refused.
    Draining,
}

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `draining` once shutdown has begun.
    pub status: HealthStatus,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Registered display connections.
    pub connections: usize,
    /// Guilds with at least one display.
    pub guilds: usize,
    /// Broadcast payloads the live displays could not queue.
    pub dropped_messages: u64,
}

impl HealthResponse {
    /// Snapshot the registry. Counts come from one lock acquisition, so
    /// `guilds` never exceeds `connections`.
    pub fn from_registry(registry: &ClientRegistry, started: Instant, draining: bool) -> Self {
        let stats = registry.stats();
        Self {
            status: if draining {
                HealthStatus::Draining
            } else {
                HealthStatus::Ok
            },
            uptime_secs: started.elapsed().as_secs(),
            connections: stats.connections,
            guilds: stats.guilds,
            dropped_messages: stats.dropped_messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use relay_core::{ConnectionId, GuildId};
    use tokio::sync::mpsc;

    use super::*;
    use crate::websocket::connection::DisplayConnection;

    fn display(guild: &str, capacity: usize) -> (Arc<DisplayConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Arc::new(DisplayConnection::new(ConnectionId::new(), GuildId::from(guild), tx)),
            rx,
        )
    }

    #[test]
    fn empty_registry_is_ok_with_zero_counts() {
        let registry = ClientRegistry::new();
        let health = HealthResponse::from_registry(&registry, Instant::now(), false);
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["connections"], 0);
        assert_eq!(json["guilds"], 0);
        assert_eq!(json["dropped_messages"], 0);
    }

    #[test]
    fn counts_follow_registrations() {
        let registry = ClientRegistry::new();
        let (a, _ra) = display("1", 4);
        let (b, _rb) = display("1", 4);
        let (c, _rc) = display("2", 4);
        for conn in [a, b.clone(), c] {
            registry.register(conn);
        }

        let health = HealthResponse::from_registry(&registry, Instant::now(), false);
        assert_eq!((health.connections, health.guilds), (3, 2));

        let _ = registry.unregister(&b.id);
        let health = HealthResponse::from_registry(&registry, Instant::now(), false);
        assert_eq!((health.connections, health.guilds), (2, 2));
    }

    #[test]
    fn full_queues_show_up_as_drops() {
        let registry = ClientRegistry::new();
        let (conn, _rx) = display("7", 1);
        registry.register(conn.clone());
        assert!(conn.send(Arc::new("first".into())));
        assert!(!conn.send(Arc::new("second".into())));

        let health = HealthResponse::from_registry(&registry, Instant::now(), false);
        assert_eq!(health.dropped_messages, 1);
    }

    #[test]
    fn draining_and_uptime() {
        let registry = ClientRegistry::new();
        let started = Instant::now().checked_sub(Duration::from_secs(90)).unwrap();
        let health = HealthResponse::from_registry(&registry, started, true);
        assert_eq!(health.status, HealthStatus::Draining);
        assert!(health.uptime_secs >= 89);
        assert_eq!(serde_json::to_value(&health).unwrap()["status"], "draining");
    }
}
