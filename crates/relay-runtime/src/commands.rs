//! Administrative commands, independent of the chat platform.
//!
//! Each command returns the text to post publicly on success. A
//! [`CommandError`] is shown only to the invoker.

use std::sync::Arc;

use relay_core::{ChannelId, GuildId};
use relay_settings::{ActiveChannelStore, SettingsError};
use thiserror::Error;
use tracing::info;

use crate::knowledge::KnowledgeStore;
use crate::sessions::SessionRegistry;

/// Why a command was refused.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The invoker lacks administrator permission.
    #[error("Only server administrators can use this command!")]
    NotAdmin,
    /// Invoked outside the active channel.
    #[error("This command only works in the active channel. (Please head over to <#{active}>)")]
    WrongChannel {
        /// The current active channel.
        active: ChannelId,
    },
    /// Invoked outside a guild.
    #[error("This command only works inside a server.")]
    NoGuild,
    /// The new active channel could not be persisted.
    #[error("Something went wrong: {0}")]
    Persist(#[from] SettingsError),
}

/// Channel mention markup.
pub fn mention(channel: ChannelId) -> String {
    format!("<#{channel}>")
}

/// The three administrative commands.
#[derive(Clone)]
pub struct AdminCommands {
    channels: Arc<dyn ActiveChannelStore>,
    sessions: Arc<SessionRegistry>,
    knowledge: Arc<KnowledgeStore>,
}

impl AdminCommands {
    /// Commands over the shared stores.
    pub fn new(
        channels: Arc<dyn ActiveChannelStore>,
        sessions: Arc<SessionRegistry>,
        knowledge: Arc<KnowledgeStore>,
    ) -> Self {
        Self {
            channels,
            sessions,
            knowledge,
        }
    }

    /// Make `channel` the active channel and persist it.
    pub fn set_channel(&self, is_admin: bool, channel: ChannelId) -> Result<String, CommandError> {
        if !is_admin {
            return Err(CommandError::NotAdmin);
        }
        self.channels.set(channel)?;
        info!(%channel, "active channel changed");
        Ok(format!(
            "Yuuka's active channel is now {}! I'll only talk here from now on.",
            mention(channel)
        ))
    }

    /// Discard the guild's conversation history.
    pub fn new_conversation(
        &self,
        guild_id: Option<&GuildId>,
        invoked_in: ChannelId,
        invoker_mention: &str,
    ) -> Result<String, CommandError> {
        self.require_active(invoked_in)?;
        let guild_id = guild_id.ok_or(CommandError::NoGuild)?;
        let _ = self.sessions.reset(guild_id);
        info!(%guild_id, "conversation reset by command");
        Ok(format!("{invoker_mention} Got it! Let's start a fresh conversation ✨"))
    }

    /// Rescan the knowledge directory.
    pub async fn reload_knowledge(&self, invoked_in: ChannelId) -> Result<String, CommandError> {
        self.require_active(invoked_in)?;
        let count = self.knowledge.reload().await;
        Ok(format!("Knowledge files reloaded! ({count} files loaded)"))
    }

    /// Check that `invoked_in` is the active channel before a command that
    /// needs it does anything.
    pub fn require_active(&self, invoked_in: ChannelId) -> Result<(), CommandError> {
        let active = self.channels.get();
        if active.is_none() || invoked_in != active {
            return Err(CommandError::WrongChannel { active });
        }
        Ok(())
    }
}
