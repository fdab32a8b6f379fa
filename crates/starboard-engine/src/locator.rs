//! Mirror locator
//!
//! Finds the feed post that mirrors a source message. A process-local index
//! maps source message ids to mirror ids; on a miss or a stale entry the
//! recent history of the feed channel is scanned for the dedup marker.

use dashmap::DashMap;
use starboard_common::StarboardConfig;
use starboard_core::{ChatPlatform, MessageRef, MirrorPost, Snowflake};
use tracing::{debug, instrument};

use crate::error::EngineResult;

/// Source message id -> mirror post id
#[derive(Debug, Default)]
pub struct MirrorIndex {
    entries: DashMap<Snowflake, Snowflake>,
}

impl MirrorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source_id: Snowflake) -> Option<Snowflake> {
        self.entries.get(&source_id).map(|entry| *entry.value())
    }

    pub fn record(&self, source_id: Snowflake, mirror_id: Snowflake) {
        self.entries.insert(source_id, mirror_id);
    }

    pub fn invalidate(&self, source_id: Snowflake) {
        self.entries.remove(&source_id);
    }

    /// Drop any entry pointing at `mirror_id`
    pub fn forget_mirror(&self, mirror_id: Snowflake) {
        self.entries.retain(|_, mirror| *mirror != mirror_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mirror locator
pub struct MirrorLocator<'a> {
    platform: &'a dyn ChatPlatform,
    config: &'a StarboardConfig,
    index: &'a MirrorIndex,
}

impl<'a> MirrorLocator<'a> {
    /// Create a new MirrorLocator
    pub fn new(
        platform: &'a dyn ChatPlatform,
        config: &'a StarboardConfig,
        index: &'a MirrorIndex,
    ) -> Self {
        Self {
            platform,
            config,
            index,
        }
    }

    /// Find the mirror of `source`, if one exists
    #[instrument(skip(self), fields(message_id = %source.message_id))]
    pub async fn locate(&self, source: &MessageRef) -> EngineResult<Option<MirrorPost>> {
        let link = source.permalink(&self.config.link_base);

        if let Some(mirror_id) = self.index.get(source.message_id) {
            match self
                .platform
                .fetch_feed_post(self.config.channel_id, mirror_id)
                .await?
            {
                Some(post) if post.mirrors(&link) => {
                    debug!(mirror_id = %mirror_id, "Mirror found in index");
                    return Ok(Some(post));
                }
                _ => {
                    debug!(mirror_id = %mirror_id, "Stale index entry");
                    self.index.invalidate(source.message_id);
                }
            }
        }

        let posts = self
            .platform
            .fetch_recent_posts(self.config.channel_id, self.config.history_window)
            .await?;
        let found = posts.into_iter().find(|post| post.mirrors(&link));

        match &found {
            Some(post) => {
                debug!(mirror_id = %post.id, "Mirror found in feed history");
                self.index.record(source.message_id, post.id);
            }
            None => debug!("No mirror in feed history"),
        }
        Ok(found)
    }
}
