//! Permanent message link
//!
//! The link doubles as the dedup marker embedded in mirror posts, so it must be
//! derivable from ids alone (a deleted message can no longer be fetched).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// Default prefix for message links
pub const DEFAULT_LINK_BASE: &str = "https://discord.com/channels";

/// Permanent link to a guild message: `{base}/{guild}/{channel}/{message}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permalink(String);

impl Permalink {
    /// Build the link for a message
    pub fn new(
        base: &str,
        guild_id: Snowflake,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Self {
        let base = base.trim_end_matches('/');
        Self(format!("{base}/{guild_id}/{channel_id}/{message_id}"))
    }

    /// Get the link as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a marker string refers to this link
    #[inline]
    pub fn matches(&self, marker: &str) -> bool {
        self.0 == marker
    }
}

impl fmt::Display for Permalink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Permalink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
