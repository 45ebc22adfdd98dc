//! Branded ID newtypes.
//!
//! Guild ids come from the chat platform (or from a display client's
//! registration message) and are treated as opaque strings so that both
//! sides compare equal regardless of how the number was encoded on the wire.
//! Connection ids are generated locally as UUID v7.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id! {
    /// Identifier of a guild (community / tenant).
    GuildId
}

string_id! {
    /// Identifier of one live display connection.
    ConnectionId
}

impl From<u64> for GuildId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl ConnectionId {
    /// Create a new random connection id (`conn_` + UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(format!("conn_{}", Uuid::now_v7()))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a chat channel.
///
/// `0` is never a real channel and is used as "no channel configured".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(u64);

impl ChannelId {
    /// The "no channel configured" sentinel.
    pub const NONE: Self = Self(0);

    /// Wrap a raw platform channel id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the "no channel" sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal channel id, as stored in the env file.
    ///
    /// Surrounding whitespace is ignored; anything non-numeric yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u64>().ok().map(Self)
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_new_is_prefixed_uuid_v7() {
        let id = ConnectionId::new();
        let raw = id.as_str().strip_prefix("conn_").expect("prefix");
        let parsed = Uuid::parse_str(raw).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn guild_id_from_number_matches_string() {
        assert_eq!(GuildId::from(42_u64), GuildId::from("42"));
    }

    #[test]
    fn guild_id_display_and_deref() {
        let id = GuildId::from("1234");
        assert_eq!(format!("{id}"), "1234");
        let s: &str = &id;
        assert_eq!(s, "1234");
    }

    #[test]
    fn guild_id_serde_is_transparent() {
        let id = GuildId::from("99");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"99\"");
        let back: GuildId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn channel_id_parse() {
        assert_eq!(ChannelId::parse("123"), Some(ChannelId::new(123)));
        assert_eq!(ChannelId::parse("  77\n"), Some(ChannelId::new(77)));
        assert_eq!(ChannelId::parse("abc"), None);
        assert_eq!(ChannelId::parse(""), None);
        assert_eq!(ChannelId::parse("-5"), None);
    }

    #[test]
    fn channel_id_none_sentinel() {
        assert!(ChannelId::NONE.is_none());
        assert!(ChannelId::default().is_none());
        assert!(!ChannelId::new(1).is_none());
    }

    #[test]
    fn channel_id_display() {
        assert_eq!(ChannelId::new(555).to_string(), "555");
    }
}
