//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a settings
//! file may be partial: missing fields take their default value.

mod server;
mod services;

pub use server::*;
pub use services::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the relay.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "gemini": { "model": "gemini-2.5-pro" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaySettings {
    /// HTTP/WebSocket listener settings.
    pub server: ServerSettings,
    /// Chat platform credentials.
    pub discord: DiscordSettings,
    /// Generative model settings.
    pub gemini: GeminiSettings,
    /// Filesystem locations.
    pub paths: PathSettings,
    /// Message pipeline tuning.
    pub pipeline: PipelineSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl RelaySettings {
    /// Check that the secrets needed to serve are present.
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            return Err(SettingsError::MissingSecret("DISCORD_BOT_TOKEN"));
        }
        if self.gemini.api_key.trim().is_empty() {
            return Err(SettingsError::MissingSecret("GEMINI_API_KEY"));
        }
        if self.server.port == 0 {
            return Err(SettingsError::InvalidValue("server.port must be non-zero".into()));
        }
        Ok(())
    }
}
