//! Chat platform port - the narrow capability interface the engine depends on
//!
//! The engine never talks to the network directly. Infrastructure provides an
//! implementation (REST client in the gateway); tests provide an in-memory
//! double.

use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{Channel, MirrorPost, PostBody, SourceMessage, User};
use crate::error::PlatformError;
use crate::value_objects::Snowflake;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Shared, type-erased platform handle
pub type SharedPlatform = Arc<dyn ChatPlatform>;

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Resolve a channel by ID
    async fn resolve_channel(&self, channel_id: Snowflake) -> PlatformResult<Option<Channel>>;

    /// Resolve a user by ID
    async fn fetch_user(&self, user_id: Snowflake) -> PlatformResult<Option<User>>;

    /// Fetch a guild message with its channel's NSFW flag applied
    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<SourceMessage>>;

    /// Fetch a single post from the feed channel
    async fn fetch_feed_post(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<MirrorPost>>;

    /// Fetch up to `limit` most recent messages in a channel, newest first
    async fn fetch_recent_posts(
        &self,
        channel_id: Snowflake,
        limit: u8,
    ) -> PlatformResult<Vec<MirrorPost>>;

    /// Fetch every user who reacted with `emoji` on a message
    async fn fetch_reactors(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<Vec<User>>;

    /// Send a structured post to a channel
    async fn send_post(&self, channel_id: Snowflake, body: &PostBody) -> PlatformResult<MirrorPost>;

    /// Replace the text content of a post, leaving its embeds untouched
    async fn edit_post_content(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> PlatformResult<MirrorPost>;

    /// Delete a message
    async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake)
        -> PlatformResult<()>;
}
