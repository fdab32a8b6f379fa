//! Reaction event - a single reaction added to or removed from a message

use serde::{Deserialize, Serialize};

use super::MessageRef;
use crate::value_objects::Snowflake;

/// Whether the reaction was added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionDirection {
    Added,
    Removed,
}

/// Reaction event, consumed once per dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message: MessageRef,
    pub emoji: String,
    pub user_id: Snowflake,
    pub user_is_bot: bool,
    pub direction: ReactionDirection,
}

impl ReactionEvent {
    /// Create a reaction-added event
    pub fn added(message: MessageRef, emoji: impl Into<String>, user_id: Snowflake) -> Self {
        Self {
            message,
            emoji: emoji.into(),
            user_id,
            user_is_bot: false,
            direction: ReactionDirection::Added,
        }
    }

    /// Create a reaction-removed event
    pub fn removed(message: MessageRef, emoji: impl Into<String>, user_id: Snowflake) -> Self {
        Self {
            direction: ReactionDirection::Removed,
            ..Self::added(message, emoji, user_id)
        }
    }

    /// Mark the acting user as a bot account
    #[must_use]
    pub fn by_bot(mut self, is_bot: bool) -> Self {
        self.user_is_bot = is_bot;
        self
    }

    /// Check if reaction uses a specific emoji
    #[inline]
    pub fn is_emoji(&self, emoji: &str) -> bool {
        self.emoji == emoji
    }
}
