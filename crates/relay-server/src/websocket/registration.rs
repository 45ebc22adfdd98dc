//! The registration handshake.
//!
//! A display client's first message must be
//! `{"type":"register","guild_id":<string|integer>}`. Anything else closes
//! the connection.

use relay_core::GuildId;
use serde::Deserialize;
use thiserror::Error;

/// The only accepted `type` of a first message.
pub const REGISTER_TYPE: &str = "register";

/// Why a connection failed to register.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Not JSON, or not the expected shape.
    #[error("malformed registration message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Valid JSON with a different `type`.
    #[error("expected a \"register\" message, got {0:?}")]
    UnexpectedType(String),
    /// `guild_id` absent, null, or empty.
    #[error("registration is missing guild_id")]
    MissingGuildId,
    /// The first frame was binary and not UTF-8.
    #[error("registration must be a text frame")]
    NotText,
    /// No message within the registration timeout.
    #[error("no registration within {0:?}")]
    Timeout(std::time::Duration),
    /// The client went away first.
    #[error("connection closed before registration")]
    Closed,
}

#[derive(Debug, Deserialize)]
struct RegisterEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    guild_id: Option<RawGuildId>,
}

/// Guild ids arrive as strings or JSON integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGuildId {
    Text(String),
    Number(u64),
}

impl RawGuildId {
    fn into_guild_id(self) -> Option<GuildId> {
        match self {
            Self::Text(s) => (!s.is_empty()).then(|| GuildId::from(s)),
            Self::Number(n) => Some(GuildId::from(n)),
        }
    }
}

/// Parse a first message into the guild it registers for.
pub fn parse_registration(text: &str) -> Result<GuildId, RegistrationError> {
    let envelope: RegisterEnvelope = serde_json::from_str(text)?;
    if envelope.kind != REGISTER_TYPE {
        return Err(RegistrationError::UnexpectedType(envelope.kind));
    }
    envelope
        .guild_id
        .and_then(RawGuildId::into_guild_id)
        .ok_or(RegistrationError::MissingGuildId)
}
