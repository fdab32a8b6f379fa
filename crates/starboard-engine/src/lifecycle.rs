//! Mirror lifecycle
//!
//! Drives a source message between the unmirrored and mirrored states. Every
//! count-locate-act sequence for one source message runs under that message's
//! lock, so concurrent events on it cannot create duplicate mirrors.

use std::sync::Arc;

use starboard_common::StarboardConfig;
use starboard_core::{
    Channel, MessageRef, MirrorPost, PlatformError, ReactionEvent, SharedPlatform, Snowflake,
    SourceMessage,
};
use tracing::{debug, info, instrument, warn};

use crate::composer::{header_count, patch_header, PostComposer};
use crate::counter::ReactionCounter;
use crate::error::{CompositionError, EngineError, EngineResult};
use crate::filter::{EligibilityFilter, Rejection};
use crate::keyed_lock::KeyedLock;
use crate::locator::{MirrorIndex, MirrorLocator};

/// Outcome of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// A mirror post was sent to the feed
    Created { mirror_id: Snowflake, count: u32 },
    /// The header count of an existing mirror was edited
    Updated { mirror_id: Snowflake, count: u32 },
    /// The mirror post was removed from the feed
    Deleted { mirror_id: Snowflake },
    /// Nothing to do
    Unchanged,
    /// The event was out of scope
    Ignored(Rejection),
    /// The source had nothing worth posting
    Skipped(CompositionError),
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
            Self::Unchanged => "unchanged",
            Self::Ignored(_) => "ignored",
            Self::Skipped(_) => "skipped",
        }
    }

    /// Mirror post touched by this action, if any
    pub fn mirror_id(&self) -> Option<Snowflake> {
        match self {
            Self::Created { mirror_id, .. }
            | Self::Updated { mirror_id, .. }
            | Self::Deleted { mirror_id } => Some(*mirror_id),
            _ => None,
        }
    }

    /// Check if the feed was written to
    pub fn is_write(&self) -> bool {
        self.mirror_id().is_some()
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle manager - owns the shared engine state
///
/// Cheap to clone; clones share the mirror index and the per-message locks.
#[derive(Clone)]
pub struct LifecycleManager {
    config: Arc<StarboardConfig>,
    platform: SharedPlatform,
    index: Arc<MirrorIndex>,
    locks: KeyedLock<Snowflake>,
}

impl LifecycleManager {
    /// Create a new LifecycleManager
    pub fn new(config: Arc<StarboardConfig>, platform: SharedPlatform) -> Self {
        Self {
            config,
            platform,
            index: Arc::new(MirrorIndex::new()),
            locks: KeyedLock::new(),
        }
    }

    pub fn config(&self) -> &StarboardConfig {
        &self.config
    }

    pub fn index(&self) -> &MirrorIndex {
        &self.index
    }

    /// Number of source messages currently locked or awaited
    pub fn pending_locks(&self) -> usize {
        self.locks.len()
    }

    pub fn filter(&self) -> EligibilityFilter<'_> {
        EligibilityFilter::new(&self.config)
    }

    pub fn counter(&self) -> ReactionCounter<'_> {
        ReactionCounter::new(&self.config)
    }

    pub fn composer(&self) -> PostComposer<'_> {
        PostComposer::new(&self.config)
    }

    pub fn locator(&self) -> MirrorLocator<'_> {
        MirrorLocator::new(self.platform.as_ref(), &self.config, &self.index)
    }

    /// Handle a reaction being added or removed
    #[instrument(
        skip(self, event),
        fields(
            message_id = %event.message.message_id,
            user_id = %event.user_id,
            direction = ?event.direction
        )
    )]
    pub async fn handle_reaction(&self, event: &ReactionEvent) -> EngineResult<LifecycleAction> {
        let filter = self.filter();
        if let Err(rejection) = filter
            .check_reaction(event)
            .and_then(|()| filter.check_location(&event.message))
        {
            debug!(reason = %rejection, "Reaction ignored");
            return Ok(LifecycleAction::Ignored(rejection));
        }

        let message = event.message;
        let _guard = self.locks.acquire(message.message_id).await;

        self.resolve_feed(message.guild_id).await?;

        let source = self
            .platform
            .fetch_message(message.channel_id, message.message_id)
            .await?
            .ok_or_else(|| EngineError::resolution("Message", message.message_id))?;

        if let Err(rejection) = filter.check(event, &source) {
            debug!(reason = %rejection, "Reaction ignored");
            return Ok(LifecycleAction::Ignored(rejection));
        }

        let count = self
            .counter()
            .count_live(self.platform.as_ref(), &source)
            .await?;
        self.apply(&source, count).await
    }

    /// Bring the feed in line with `source` having `count` qualifying reactions
    #[instrument(skip(self, source), fields(message_id = %source.id))]
    pub async fn reconcile(
        &self,
        source: &SourceMessage,
        count: u32,
    ) -> EngineResult<LifecycleAction> {
        let _guard = self.locks.acquire(source.id).await;
        self.resolve_feed(source.guild_id).await?;
        self.apply(source, count).await
    }

    /// Handle a source message being deleted
    ///
    /// Any existing mirror is removed whatever its count.
    #[instrument(skip(self, message), fields(message_id = %message.message_id))]
    pub async fn handle_message_delete(
        &self,
        message: &MessageRef,
    ) -> EngineResult<LifecycleAction> {
        // A feed post may itself be a starred source
        if message.channel_id == self.config.channel_id {
            self.index.forget_mirror(message.message_id);
            debug!("Feed post deleted");
        }

        if let Err(rejection) = self.filter().check_location(message) {
            debug!(reason = %rejection, "Deletion ignored");
            return Ok(LifecycleAction::Ignored(rejection));
        }

        let _guard = self.locks.acquire(message.message_id).await;
        self.resolve_feed(message.guild_id).await?;

        match self.locator().locate(message).await? {
            Some(post) => self.remove(message.message_id, &post).await,
            None => Ok(LifecycleAction::Unchanged),
        }
    }

    /// Handle a batch of deleted messages, one at a time
    ///
    /// Failures are logged and do not stop the rest of the batch.
    #[instrument(skip(self, messages), fields(count = messages.len()))]
    pub async fn handle_bulk_delete(&self, messages: &[MessageRef]) -> Vec<LifecycleAction> {
        let mut actions = Vec::with_capacity(messages.len());
        for message in messages {
            match self.handle_message_delete(message).await {
                Ok(action) => actions.push(action),
                Err(e) => warn!(
                    message_id = %message.message_id,
                    code = e.code(),
                    error = %e,
                    "Failed to handle deleted message"
                ),
            }
        }
        actions
    }

    /// Resolve the feed channel within the source's guild
    async fn resolve_feed(&self, guild_id: Snowflake) -> EngineResult<Channel> {
        let feed_id = self.config.channel_id;
        match self.platform.resolve_channel(feed_id).await? {
            Some(channel) if channel.guild_id == Some(guild_id) => Ok(channel),
            _ => Err(EngineError::resolution("Feed channel", feed_id)),
        }
    }

    /// State transition for `source` at `count`; the caller holds the lock
    async fn apply(&self, source: &SourceMessage, count: u32) -> EngineResult<LifecycleAction> {
        let existing = self.locator().locate(&source.reference()).await?;
        let threshold = self.config.required_reactions;

        match existing {
            None if count >= threshold => self.create(source, count).await,
            None => {
                debug!(count, threshold, "Below threshold");
                Ok(LifecycleAction::Unchanged)
            }
            Some(post) if count < threshold => self.remove(source.id, &post).await,
            Some(post) => self.update(source.id, &post, count).await,
        }
    }

    async fn create(&self, source: &SourceMessage, count: u32) -> EngineResult<LifecycleAction> {
        let body = match self.composer().compose(source, count) {
            Ok(body) => body,
            Err(e) => {
                warn!(message_id = %source.id, reason = %e, "Mirror post skipped");
                return Ok(LifecycleAction::Skipped(e));
            }
        };

        let post = self.platform.send_post(self.config.channel_id, &body).await?;
        self.index.record(source.id, post.id);

        Ok(self.report(
            source.id,
            LifecycleAction::Created {
                mirror_id: post.id,
                count,
            },
        ))
    }

    async fn update(
        &self,
        source_id: Snowflake,
        post: &MirrorPost,
        count: u32,
    ) -> EngineResult<LifecycleAction> {
        if !self.config.update_on_reaction || header_count(&post.content) == Some(count) {
            return Ok(LifecycleAction::Unchanged);
        }

        let Some(content) = patch_header(&post.content, count) else {
            warn!(mirror_id = %post.id, "Mirror post has no count header");
            return Ok(LifecycleAction::Unchanged);
        };

        self.platform
            .edit_post_content(self.config.channel_id, post.id, &content)
            .await
            .map_err(|e| self.forget_if_missing(source_id, e))?;

        Ok(self.report(
            source_id,
            LifecycleAction::Updated {
                mirror_id: post.id,
                count,
            },
        ))
    }

    async fn remove(
        &self,
        source_id: Snowflake,
        post: &MirrorPost,
    ) -> EngineResult<LifecycleAction> {
        self.platform
            .delete_message(self.config.channel_id, post.id)
            .await
            .map_err(|e| self.forget_if_missing(source_id, e))?;
        self.index.invalidate(source_id);

        Ok(self.report(source_id, LifecycleAction::Deleted { mirror_id: post.id }))
    }

    fn forget_if_missing(&self, source_id: Snowflake, err: PlatformError) -> EngineError {
        if err.is_not_found() {
            self.index.invalidate(source_id);
        }
        err.into()
    }

    fn report(&self, source_id: Snowflake, action: LifecycleAction) -> LifecycleAction {
        if self.config.log_actions {
            match action {
                LifecycleAction::Created { mirror_id, count } => {
                    info!(message_id = %source_id, mirror_id = %mirror_id, count, "Mirror post created");
                }
                LifecycleAction::Updated { mirror_id, count } => {
                    info!(message_id = %source_id, mirror_id = %mirror_id, count, "Mirror post updated");
                }
                LifecycleAction::Deleted { mirror_id } => {
                    info!(message_id = %source_id, mirror_id = %mirror_id, "Mirror post deleted");
                }
                _ => {}
            }
        }
        action
    }
}
