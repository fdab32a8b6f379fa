//! User entity - message authors and reactors

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// CDN host serving avatar images
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// User as seen by the starboard (author of a source message, or a reactor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: None,
            avatar: None,
            bot: false,
        }
    }

    /// Create a bot account
    pub fn new_bot(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            bot: true,
            ..Self::new(id, username)
        }
    }

    /// Get the display tag: `username#discriminator`, or the bare username for
    /// accounts without a legacy discriminator
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(disc) if !disc.is_empty() && disc != "0" => {
                format!("{}#{}", self.username, disc)
            }
            _ => self.username.clone(),
        }
    }

    /// Get avatar URL or default avatar URL
    ///
    /// Animated avatars (hash prefixed with `a_`) resolve to a gif.
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => {
                let ext = if hash.starts_with("a_") { "gif" } else { "png" };
                format!("{CDN_BASE}/avatars/{}/{hash}.{ext}", self.id)
            }
            None => format!("{CDN_BASE}/embed/avatars/{}.png", self.default_avatar_index()),
        }
    }

    /// Get default avatar index based on discriminator, or on the id for
    /// accounts without one
    fn default_avatar_index(&self) -> u64 {
        match self.discriminator.as_deref().and_then(|d| d.parse::<u64>().ok()) {
            Some(disc) if disc != 0 => disc % 5,
            _ => ((self.id.into_inner() as u64) >> 22) % 6,
        }
    }

    /// Check if user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.bot
    }
}
