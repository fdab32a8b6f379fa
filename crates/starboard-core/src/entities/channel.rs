//! Channel entity - the parts of a channel the starboard cares about

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
}

impl Channel {
    /// Create a new guild text channel
    #[must_use]
    pub fn new_text(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id: Some(guild_id),
            name: Some(name.into()),
            nsfw: false,
        }
    }

    /// Mark the channel as age-restricted
    #[must_use]
    pub fn with_nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    /// Check if this is a guild channel
    #[inline]
    #[must_use]
    pub fn is_guild_channel(&self) -> bool {
        self.guild_id.is_some()
    }

    /// Mention markup for this channel (`<#id>`)
    #[must_use]
    pub fn mention(&self) -> String {
        mention(self.id)
    }
}

/// Mention markup for a channel id
#[must_use]
pub fn mention(channel_id: Snowflake) -> String {
    format!("<#{channel_id}>")
}
