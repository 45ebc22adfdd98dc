//! Per-guild conversational state.
//!
//! A [`ChatSession`] is an append-only list of turns. The model client reads
//! the history to build each request and appends the user/model exchange
//! only after a successful call, so a failed call leaves the history as it
//! was. Sessions are never edited in place; a reset swaps in a new one.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::content::ContentPart;
use crate::ids::GuildId;

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The chat user (prompt parts).
    User,
    /// The generative model.
    Model,
}

/// One entry of the turn history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Author of the turn.
    pub role: Role,
    /// Parts of the turn, in order.
    pub parts: Vec<ContentPart>,
}

impl Turn {
    /// A user turn.
    #[must_use]
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// A model turn with a single text part.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![ContentPart::text(text)],
        }
    }
}

/// Ordered turn history for one guild.
#[derive(Debug)]
pub struct ChatSession {
    guild_id: GuildId,
    history: Mutex<Vec<Turn>>,
}

impl ChatSession {
    /// An empty session.
    #[must_use]
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Guild this session belongs to.
    #[must_use]
    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Snapshot of the history.
    #[must_use]
    pub fn history(&self) -> Vec<Turn> {
        self.history.lock().clone()
    }

    /// Number of turns recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// Whether no turn has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    /// Append one completed user/model exchange.
    pub fn append_exchange(&self, user: Vec<ContentPart>, model_text: impl Into<String>) {
        let mut history = self.history.lock();
        history.push(Turn::user(user));
        history.push(Turn::model(model_text));
    }
}
