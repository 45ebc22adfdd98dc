//! Broadcast payload and the emotion → sprite table.

use serde::{Deserialize, Serialize};

/// Key of the required fallback entry in every [`SpriteMap`].
pub const NEUTRAL_EMOTION: &str = "neutral";

/// Built-in emotion keys and the sprite file each one selects.
const DEFAULT_SPRITES: [(&str, &str); 8] = [
    ("neutral", "yuuka_neutral.png"),
    ("neutral2", "yuuka_neutral2.png"),
    ("neutral3", "yuuka_neutral3.png"),
    ("smile", "yuuka_smile.png"),
    ("smile2", "yuuka_smile2.png"),
    ("blush", "yuuka_blush.png"),
    ("angry", "yuuka_angry.png"),
    ("angry2", "yuuka_angry2.png"),
];

/// Message sent to every display connection of a guild.
///
/// Serializes to exactly `{"text": ..., "sprite": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Dialogue text to show.
    pub text: String,
    /// Sprite file name to display.
    pub sprite: String,
}

impl ReplyPayload {
    /// Create a payload.
    #[must_use]
    pub fn new(text: impl Into<String>, sprite: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sprite: sprite.into(),
        }
    }
}

/// Closed mapping from emotion keys to sprite file names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteMap {
    entries: Vec<(String, String)>,
    neutral: String,
}

impl SpriteMap {
    /// Build a map from explicit entries.
    ///
    /// Returns `None` when no `neutral` entry is present.
    #[must_use]
    pub fn from_entries<I, K, V>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let neutral = entries
            .iter()
            .find(|(k, _)| k == NEUTRAL_EMOTION)
            .map(|(_, v)| v.clone())?;
        Some(Self { entries, neutral })
    }

    /// Sprite for an emotion key, if the key is known.
    #[must_use]
    pub fn get(&self, emotion: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == emotion)
            .map(|(_, v)| v.as_str())
    }

    /// Sprite for an emotion key, falling back to `neutral`.
    #[must_use]
    pub fn resolve(&self, emotion: Option<&str>) -> &str {
        emotion.and_then(|e| self.get(e)).unwrap_or(&self.neutral)
    }

    /// The `neutral` sprite.
    #[must_use]
    pub fn neutral(&self) -> &str {
        &self.neutral
    }

    /// All known emotion keys, in table order.
    pub fn emotions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for SpriteMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SPRITES
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            neutral: DEFAULT_SPRITES[0].1.to_owned(),
        }
    }
}
