//! Eligibility filter
//!
//! Decides whether a reaction event is in scope for the feed. Rules are
//! applied in a fixed order and the first failing rule is reported.

use starboard_common::StarboardConfig;
use starboard_core::{MessageRef, ReactionEvent, SourceMessage};

/// Reason an event was filtered out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Reaction emoji is not the trigger emoji
    WrongEmoji,
    /// Reactor is a bot and bot reactions are ignored
    BotReactor,
    /// Reactor authored the message and self reactions are ignored
    SelfReaction,
    /// Message lives in an excluded guild
    IgnoredGuild,
    /// Message lives in an excluded channel
    IgnoredChannel,
    /// Message lives in an NSFW channel and NSFW is not allowed
    Nsfw,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WrongEmoji => "wrong_emoji",
            Self::BotReactor => "bot_reactor",
            Self::SelfReaction => "self_reaction",
            Self::IgnoredGuild => "ignored_guild",
            Self::IgnoredChannel => "ignored_channel",
            Self::Nsfw => "nsfw",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eligibility filter over the active configuration
pub struct EligibilityFilter<'a> {
    config: &'a StarboardConfig,
}

impl<'a> EligibilityFilter<'a> {
    /// Create a new EligibilityFilter
    pub fn new(config: &'a StarboardConfig) -> Self {
        Self { config }
    }

    /// Apply the reactor rules that need no message lookup
    pub fn check_reaction(&self, event: &ReactionEvent) -> Result<(), Rejection> {
        if !event.is_emoji(&self.config.star_emoji) {
            return Err(Rejection::WrongEmoji);
        }
        if event.user_is_bot && self.config.bot_reactions.is_ignore() {
            return Err(Rejection::BotReactor);
        }
        Ok(())
    }

    /// Apply every rule, in order, to a reaction on `source`
    pub fn check(&self, event: &ReactionEvent, source: &SourceMessage) -> Result<(), Rejection> {
        self.check_reaction(event)?;
        if self.config.self_reactions.is_ignore() && event.user_id == source.author.id {
            return Err(Rejection::SelfReaction);
        }
        self.check_location(&source.reference())?;
        if source.nsfw && !self.config.allow_nsfw {
            return Err(Rejection::Nsfw);
        }
        Ok(())
    }

    /// Check if a reaction event is in scope
    pub fn is_in_scope(&self, event: &ReactionEvent, source: &SourceMessage) -> bool {
        self.check(event, source).is_ok()
    }

    /// Apply the guild and channel exclusions to a bare message reference
    pub fn check_location(&self, message: &MessageRef) -> Result<(), Rejection> {
        if self.config.is_guild_ignored(message.guild_id) {
            return Err(Rejection::IgnoredGuild);
        }
        if self.config.is_channel_ignored(message.channel_id) {
            return Err(Rejection::IgnoredChannel);
        }
        Ok(())
    }

    /// Check if a message location is in scope (used for deletions)
    pub fn message_in_scope(&self, message: &MessageRef) -> bool {
        self.check_location(message).is_ok()
    }
}
