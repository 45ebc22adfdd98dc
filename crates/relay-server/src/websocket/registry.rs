//! Guild → live display connections, and fan-out to them.
//!
//! Two maps are kept under one lock: guild → connections and connection →
//! guild. Registration and teardown update both in a single critical
//! section, and a guild entry exists exactly while its set is non-empty.
//! Broadcasts copy the guild's set under the lock and send outside it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_core::{ConnectionId, GuildId, ReplyPayload};
use relay_runtime::DisplaySink;
use tracing::{debug, info, warn};

use super::connection::DisplayConnection;

#[derive(Default)]
struct RegistryState {
    by_guild: HashMap<GuildId, HashMap<ConnectionId, Arc<DisplayConnection>>>,
    by_conn: HashMap<ConnectionId, GuildId>,
}

/// Point-in-time counters, read under a single lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Registered connections.
    pub connections: usize,
    /// Guilds with at least one connection.
    pub guilds: usize,
    /// Payloads dropped on full or closed queues, summed over live
    /// connections.
    pub dropped_messages: u64,
}

/// Registered display connections, grouped by guild.
#[derive(Default)]
pub struct ClientRegistry {
    state: Mutex<RegistryState>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registered connection to its guild's set.
    pub fn register(&self, connection: Arc<DisplayConnection>) {
        let mut state = self.state.lock();
        let guild_id = connection.guild_id.clone();
        let conn_id = connection.id.clone();
        let _ = state.by_conn.insert(conn_id.clone(), guild_id.clone());
        let guild_size = {
            let set = state.by_guild.entry(guild_id.clone()).or_default();
            let _ = set.insert(conn_id.clone(), connection);
            set.len()
        };
        drop(state);
        info!(%conn_id, %guild_id, guild_size, "display registered");
    }

    /// Remove a connection. The guild entry goes away with its last
    /// connection. Returns the guild it belonged to, if it was registered.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<GuildId> {
        let mut state = self.state.lock();
        let guild_id = state.by_conn.remove(conn_id)?;
        let remaining = match state.by_guild.get_mut(&guild_id) {
            Some(set) => {
                let _ = set.remove(conn_id);
                set.len()
            }
            None => 0,
        };
        if remaining == 0 {
            let _ = state.by_guild.remove(&guild_id);
        }
        drop(state);
        info!(%conn_id, %guild_id, remaining, "display unregistered");
        Some(guild_id)
    }

    /// Snapshot of a guild's connections.
    pub fn connections_for(&self, guild_id: &GuildId) -> Vec<Arc<DisplayConnection>> {
        self.state
            .lock()
            .by_guild
            .get(guild_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the guild has an entry.
    pub fn contains_guild(&self, guild_id: &GuildId) -> bool {
        self.state.lock().by_guild.contains_key(guild_id)
    }

    /// Guild a connection is registered for.
    pub fn guild_of(&self, conn_id: &ConnectionId) -> Option<GuildId> {
        self.state.lock().by_conn.get(conn_id).cloned()
    }

    /// Total registered connections.
    pub fn connection_count(&self) -> usize {
        self.state.lock().by_conn.len()
    }

    /// Guilds with at least one connection.
    pub fn guild_count(&self) -> usize {
        self.state.lock().by_guild.len()
    }

    /// Connection, guild and drop counters from one consistent snapshot.
    pub fn stats(&self) -> RegistryStats {
        let state = self.state.lock();
        RegistryStats {
            connections: state.by_conn.len(),
            guilds: state.by_guild.len(),
            dropped_messages: state
                .by_guild
                .values()
                .flat_map(HashMap::values)
                .map(|c| c.drop_count())
                .sum(),
        }
    }

    /// Serialize `payload` once and queue it on every connection of the
    /// guild. Returns how many connections accepted it.
    pub fn send_to_guild(&self, guild_id: &GuildId, payload: &ReplyPayload) -> usize {
        let recipients = self.connections_for(guild_id);
        if recipients.is_empty() {
            debug!(%guild_id, "no displays for guild, broadcast skipped");
            return 0;
        }

        let json = match serde_json::to_string(payload) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(%guild_id, error = %e, "failed to serialize reply payload");
                return 0;
            }
        };

        let mut delivered = 0;
        for conn in &recipients {
            if conn.send(Arc::clone(&json)) {
                delivered += 1;
            } else {
                warn!(conn_id = %conn.id, %guild_id, dropped = conn.drop_count(), "failed to queue payload for display");
            }
        }
        debug!(%guild_id, recipients = recipients.len(), delivered, "broadcast reply");
        delivered
    }
}

#[async_trait]
impl DisplaySink for ClientRegistry {
    fn has_clients(&self, guild_id: &GuildId) -> bool {
        self.contains_guild(guild_id)
    }

    async fn broadcast(&self, guild_id: &GuildId, payload: &ReplyPayload) -> usize {
        self.send_to_guild(guild_id, payload)
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("connections", &self.connection_count())
            .field("guilds", &self.guild_count())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn connection(guild: &str, capacity: usize) -> (Arc<DisplayConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = DisplayConnection::new(ConnectionId::new(), GuildId::from(guild), tx);
        (Arc::new(conn), rx)
    }

    #[test]
    fn register_then_unregister_removes_guild_entry() {
        let registry = ClientRegistry::new();
        let (conn, _rx) = connection("42", 4);
        registry.register(conn.clone());
        assert!(registry.contains_guild(&GuildId::from("42")));
        assert_eq!(registry.guild_of(&conn.id), Some(GuildId::from("42")));

        assert_eq!(registry.unregister(&conn.id), Some(GuildId::from("42")));
        assert!(!registry.contains_guild(&GuildId::from("42")));
        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.guild_count(), 0);
    }

    #[test]
    fn guild_entry_survives_while_any_connection_remains() {
        let registry = ClientRegistry::new();
        let (a, _ra) = connection("g", 4);
        let (b, _rb) = connection("g", 4);
        registry.register(a.clone());
        registry.register(b.clone());

        let _ = registry.unregister(&a.id);
        assert!(registry.has_clients(&GuildId::from("g")));
        let _ = registry.unregister(&b.id);
        assert!(!registry.has_clients(&GuildId::from("g")));
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let registry = ClientRegistry::new();
        assert_eq!(registry.unregister(&ConnectionId::new()), None);
    }

    #[tokio::test]
    async fn broadcast_reaches_only_the_guild() {
        let registry = ClientRegistry::new();
        let (a, mut ra) = connection("g1", 4);
        let (b, mut rb) = connection("g1", 4);
        let (c, mut rc) = connection("g2", 4);
        registry.register(a);
        registry.register(b);
        registry.register(c);

        let payload = ReplyPayload::new("hi", "yuuka_smile.png");
        assert_eq!(registry.broadcast(&GuildId::from("g1"), &payload).await, 2);

        let expected = r#"{"text":"hi","sprite":"yuuka_smile.png"}"#;
        assert_eq!(&*ra.recv().await.unwrap(), expected);
        assert_eq!(&*rb.recv().await.unwrap(), expected);
        assert!(rc.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_to_empty_guild_is_noop() {
        let registry = ClientRegistry::new();
        let payload = ReplyPayload::new("hi", "yuuka_neutral.png");
        assert_eq!(registry.broadcast(&GuildId::from("nobody"), &payload).await, 0);
        assert_eq!(registry.guild_count(), 0);
    }

    #[tokio::test]
    async fn one_failing_connection_does_not_block_others() {
        let registry = ClientRegistry::new();
        let (dead, dead_rx) = connection("g", 4);
        let (live, mut live_rx) = connection("g", 4);
        drop(dead_rx);
        registry.register(dead.clone());
        registry.register(live);

        let payload = ReplyPayload::new("hi", "yuuka_neutral.png");
        assert_eq!(registry.broadcast(&GuildId::from("g"), &payload).await, 1);
        assert!(live_rx.recv().await.is_some());
        assert_eq!(dead.drop_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_register_unregister_keeps_maps_consistent() {
        let registry = Arc::new(ClientRegistry::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let guild = format!("g{}", i % 4);
                let (conn, _rx) = connection(&guild, 1);
                registry.register(conn.clone());
                tokio::task::yield_now().await;
                let _ = registry.unregister(&conn.id);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.guild_count(), 0);
    }
}
