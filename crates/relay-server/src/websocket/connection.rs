//! A registered display connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use relay_core::{ConnectionId, GuildId};
use tokio::sync::mpsc;

/// Outbound half of a display connection, shared with the registry.
///
/// The socket itself is owned by the session task; this holds the queue
/// that feeds it.
pub struct DisplayConnection {
    /// Unique connection id.
    pub id: ConnectionId,
    /// Guild this connection registered for. Fixed for its lifetime.
    pub guild_id: GuildId,
    tx: mpsc::Sender<Arc<String>>,
    connected_at: Instant,
    is_alive: AtomicBool,
    last_pong: Mutex<Instant>,
    dropped_messages: AtomicU64,
}

impl DisplayConnection {
    /// Create a connection around its outbound queue.
    pub fn new(id: ConnectionId, guild_id: GuildId, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            guild_id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Queue a text frame.
    ///
    /// Returns `false` if the queue is full or the socket task is gone, and
    /// counts the message as dropped.
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Messages dropped so far.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Record a pong (or any sign of life).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Whether the client answered since the last check. Resets the flag.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the last pong (or since connecting).
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl std::fmt::Debug for DisplayConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayConnection")
            .field("id", &self.id)
            .field("guild_id", &self.guild_id)
            .field("dropped_messages", &self.drop_count())
            .finish_non_exhaustive()
    }
}
