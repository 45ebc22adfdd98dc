//! Live display connections, as seen by the pipeline.

use async_trait::async_trait;
use relay_core::{GuildId, ReplyPayload};

/// Delivers reply payloads to the display connections of a guild.
#[async_trait]
pub trait DisplaySink: Send + Sync {
    /// Whether at least one connection is registered for the guild.
    ///
    /// An unknown guild and a guild whose connections all left are the same
    /// case.
    fn has_clients(&self, guild_id: &GuildId) -> bool;

    /// Send `payload` to every connection of the guild. Returns how many
    /// connections accepted it. Per-connection failures are logged by the
    /// implementation, never returned.
    async fn broadcast(&self, guild_id: &GuildId, payload: &ReplyPayload) -> usize;
}
