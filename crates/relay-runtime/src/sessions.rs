//! Session registry: guild → chat session.
//!
//! `get_or_create` goes through the map's entry API, so concurrent callers
//! for the same guild always observe the same session. `reset` replaces the
//! entry with a fresh session; history is never patched in place.

use std::sync::Arc;

use dashmap::DashMap;
use relay_core::{ChatSession, GuildId};
use tracing::info;

/// Per-guild chat sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<GuildId, Arc<ChatSession>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The guild's session, created with empty history on first use.
    pub fn get_or_create(&self, guild_id: &GuildId) -> Arc<ChatSession> {
        Arc::clone(
            self.sessions
                .entry(guild_id.clone())
                .or_insert_with(|| Arc::new(ChatSession::new(guild_id.clone())))
                .value(),
        )
    }

    /// Replace the guild's session with an empty one and return it.
    pub fn reset(&self, guild_id: &GuildId) -> Arc<ChatSession> {
        let fresh = Arc::new(ChatSession::new(guild_id.clone()));
        let previous = self.sessions.insert(guild_id.clone(), Arc::clone(&fresh));
        info!(
            guild_id = %guild_id,
            discarded_turns = previous.map_or(0, |s| s.len()),
            "session reset"
        );
        fresh
    }

    /// The guild's session, if one exists.
    pub fn get(&self, guild_id: &GuildId) -> Option<Arc<ChatSession>> {
        self.sessions.get(guild_id).map(|s| Arc::clone(s.value()))
    }

    /// Whether a session exists for the guild.
    pub fn contains(&self, guild_id: &GuildId) -> bool {
        self.sessions.contains_key(guild_id)
    }

    /// Number of guilds with a session.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no guild has a session.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
