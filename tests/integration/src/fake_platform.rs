//! In-memory chat platform
//!
//! Holds channels, users, source messages, reactions, and posts behind a
//! mutex, and journals every call so tests can assert on exactly what the
//! engine asked the platform to do.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use starboard_core::{
    Channel, ChatPlatform, MirrorPost, PlatformError, PlatformResult, PostBody, ReactionEvent,
    Snowflake, SourceMessage, User,
};

/// One recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    ResolveChannel(Snowflake),
    FetchUser(Snowflake),
    FetchMessage(Snowflake),
    FetchFeedPost(Snowflake),
    FetchRecentPosts { channel_id: Snowflake, limit: u8 },
    FetchReactors(Snowflake),
    SendPost { channel_id: Snowflake, content: String },
    EditPost { message_id: Snowflake, content: String },
    Delete { channel_id: Snowflake, message_id: Snowflake },
}

#[derive(Default)]
struct State {
    channels: HashMap<Snowflake, Channel>,
    users: HashMap<Snowflake, User>,
    messages: HashMap<Snowflake, SourceMessage>,
    reactions: HashMap<(Snowflake, String), Vec<User>>,
    /// Posts in send order, oldest first
    posts: Vec<MirrorPost>,
    journal: Vec<PlatformCall>,
    next_id: i64,
}

/// In-memory [`ChatPlatform`]
pub struct FakePlatform {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1_000,
                ..State::default()
            }),
            latency: None,
        }
    }

    /// Suspend for `latency` inside every call, to force interleavings
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn pause(&self) {
        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }
    }

    fn record(&self, call: PlatformCall) {
        self.state.lock().journal.push(call);
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    pub fn add_channel(&self, channel: Channel) {
        self.state.lock().channels.insert(channel.id, channel);
    }

    pub fn add_user(&self, user: User) {
        self.state.lock().users.insert(user.id, user);
    }

    pub fn add_message(&self, message: SourceMessage) {
        let mut state = self.state.lock();
        state.users.insert(message.author.id, message.author.clone());
        state.messages.insert(message.id, message);
    }

    /// Remove a source message, as if its author deleted it
    pub fn remove_message(&self, message_id: Snowflake) {
        self.state.lock().messages.remove(&message_id);
    }

    /// Put a post straight into a channel, bypassing the journal
    pub fn insert_post(&self, post: MirrorPost) {
        self.state.lock().posts.push(post);
    }

    /// Remove a post without going through the engine
    pub fn remove_post(&self, post_id: Snowflake) {
        self.state.lock().posts.retain(|post| post.id != post_id);
    }

    /// Send `count` unrelated chatter posts to a channel
    pub fn flood(&self, channel_id: Snowflake, count: usize) {
        let mut state = self.state.lock();
        for _ in 0..count {
            state.next_id += 1;
            let id = Snowflake::new(state.next_id);
            state.posts.push(MirrorPost {
                id,
                channel_id,
                content: "chatter".to_string(),
                embeds: Vec::new(),
            });
        }
    }

    /// Add a reactor and return the matching event
    pub fn react(&self, message_id: Snowflake, emoji: &str, user: User) -> ReactionEvent {
        let mut state = self.state.lock();
        state.users.insert(user.id, user.clone());
        let message = state
            .messages
            .get(&message_id)
            .map(SourceMessage::reference)
            .expect("reacting to an unknown message");
        let event = ReactionEvent::added(message, emoji, user.id).by_bot(user.bot);
        state
            .reactions
            .entry((message_id, emoji.to_string()))
            .or_default()
            .push(user);
        event
    }

    /// Remove a reactor and return the matching event
    pub fn unreact(&self, message_id: Snowflake, emoji: &str, user_id: Snowflake) -> ReactionEvent {
        let mut state = self.state.lock();
        let message = state
            .messages
            .get(&message_id)
            .map(SourceMessage::reference)
            .expect("unreacting on an unknown message");
        let is_bot = state.users.get(&user_id).is_some_and(User::is_bot);
        if let Some(reactors) = state.reactions.get_mut(&(message_id, emoji.to_string())) {
            reactors.retain(|user| user.id != user_id);
        }
        ReactionEvent::removed(message, emoji, user_id).by_bot(is_bot)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Posts in a channel, oldest first
    pub fn posts_in(&self, channel_id: Snowflake) -> Vec<MirrorPost> {
        self.state
            .lock()
            .posts
            .iter()
            .filter(|post| post.channel_id == channel_id)
            .cloned()
            .collect()
    }

    pub fn journal(&self) -> Vec<PlatformCall> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    pub fn sends(&self) -> usize {
        self.count_calls(|call| matches!(call, PlatformCall::SendPost { .. }))
    }

    pub fn edits(&self) -> usize {
        self.count_calls(|call| matches!(call, PlatformCall::EditPost { .. }))
    }

    pub fn deletes(&self) -> usize {
        self.count_calls(|call| matches!(call, PlatformCall::Delete { .. }))
    }

    pub fn scans(&self) -> usize {
        self.count_calls(|call| matches!(call, PlatformCall::FetchRecentPosts { .. }))
    }

    /// Number of feed writes of any kind
    pub fn writes(&self) -> usize {
        self.sends() + self.edits() + self.deletes()
    }

    fn count_calls(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.state.lock().journal.iter().filter(|call| pred(call)).count()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn resolve_channel(&self, channel_id: Snowflake) -> PlatformResult<Option<Channel>> {
        self.record(PlatformCall::ResolveChannel(channel_id));
        self.pause().await;
        Ok(self.state.lock().channels.get(&channel_id).cloned())
    }

    async fn fetch_user(&self, user_id: Snowflake) -> PlatformResult<Option<User>> {
        self.record(PlatformCall::FetchUser(user_id));
        self.pause().await;
        Ok(self.state.lock().users.get(&user_id).cloned())
    }

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<SourceMessage>> {
        self.record(PlatformCall::FetchMessage(message_id));
        self.pause().await;
        let state = self.state.lock();
        let nsfw = state.channels.get(&channel_id).is_some_and(|c| c.nsfw);
        Ok(state
            .messages
            .get(&message_id)
            .filter(|m| m.channel_id == channel_id)
            .cloned()
            .map(|m| m.with_nsfw(nsfw)))
    }

    async fn fetch_feed_post(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<MirrorPost>> {
        self.record(PlatformCall::FetchFeedPost(message_id));
        self.pause().await;
        Ok(self
            .state
            .lock()
            .posts
            .iter()
            .find(|post| post.id == message_id && post.channel_id == channel_id)
            .cloned())
    }

    async fn fetch_recent_posts(
        &self,
        channel_id: Snowflake,
        limit: u8,
    ) -> PlatformResult<Vec<MirrorPost>> {
        self.record(PlatformCall::FetchRecentPosts { channel_id, limit });
        self.pause().await;
        Ok(self
            .state
            .lock()
            .posts
            .iter()
            .rev()
            .filter(|post| post.channel_id == channel_id)
            .take(usize::from(limit))
            .cloned()
            .collect())
    }

    async fn fetch_reactors(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<Vec<User>> {
        self.record(PlatformCall::FetchReactors(message_id));
        self.pause().await;
        Ok(self
            .state
            .lock()
            .reactions
            .get(&(message_id, emoji.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn send_post(&self, channel_id: Snowflake, body: &PostBody) -> PlatformResult<MirrorPost> {
        self.record(PlatformCall::SendPost {
            channel_id,
            content: body.content.clone(),
        });
        self.pause().await;
        let mut state = self.state.lock();
        if !state.channels.contains_key(&channel_id) {
            return Err(PlatformError::not_found("Channel", channel_id));
        }
        state.next_id += 1;
        let post = MirrorPost::from_body(Snowflake::new(state.next_id), channel_id, body);
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn edit_post_content(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> PlatformResult<MirrorPost> {
        self.record(PlatformCall::EditPost {
            message_id,
            content: content.to_string(),
        });
        self.pause().await;
        let mut state = self.state.lock();
        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == message_id && post.channel_id == channel_id)
            .ok_or_else(|| PlatformError::not_found("Message", message_id))?;
        post.content = content.to_string();
        Ok(post.clone())
    }

    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<()> {
        self.record(PlatformCall::Delete {
            channel_id,
            message_id,
        });
        self.pause().await;
        let mut state = self.state.lock();
        let before = state.posts.len();
        state
            .posts
            .retain(|post| !(post.id == message_id && post.channel_id == channel_id));
        if state.posts.len() == before {
            return Err(PlatformError::not_found("Message", message_id));
        }
        Ok(())
    }
}
