//! Reaction counter
//!
//! Counts qualifying reactors of the trigger emoji. The count is always taken
//! from the live reactor set, never from a cached tally.

use std::collections::HashSet;

use starboard_common::StarboardConfig;
use starboard_core::{ChatPlatform, Snowflake, SourceMessage, User};
use tracing::{debug, instrument};

use crate::error::EngineResult;

/// Reaction counter over the active configuration
pub struct ReactionCounter<'a> {
    config: &'a StarboardConfig,
}

impl<'a> ReactionCounter<'a> {
    /// Create a new ReactionCounter
    pub fn new(config: &'a StarboardConfig) -> Self {
        Self { config }
    }

    /// Count distinct qualifying reactors
    pub fn count(&self, reactors: &[User], author_id: Snowflake) -> u32 {
        let ignore_bots = self.config.bot_reactions.is_ignore();
        let ignore_self = self.config.self_reactions.is_ignore();
        let mut seen = HashSet::with_capacity(reactors.len());

        let total = reactors
            .iter()
            .filter(|user| !(ignore_bots && user.is_bot()))
            .filter(|user| !(ignore_self && user.id == author_id))
            .filter(|user| seen.insert(user.id))
            .count();

        u32::try_from(total).unwrap_or(u32::MAX)
    }

    /// Fetch the current reactor set of `source` and count it
    #[instrument(skip(self, platform, source), fields(message_id = %source.id))]
    pub async fn count_live(
        &self,
        platform: &dyn ChatPlatform,
        source: &SourceMessage,
    ) -> EngineResult<u32> {
        let reactors = platform
            .fetch_reactors(source.channel_id, source.id, &self.config.star_emoji)
            .await?;
        let count = self.count(&reactors, source.author.id);

        debug!(reactors = reactors.len(), count, "Reactions counted");
        Ok(count)
    }
}
