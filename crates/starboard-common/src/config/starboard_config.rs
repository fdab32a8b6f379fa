//! Starboard settings
//!
//! Resolved once at startup, validated, and read-only afterwards.

use std::collections::HashSet;
use std::str::FromStr;

use starboard_core::{Snowflake, DEFAULT_LINK_BASE};
use validator::Validate;

use super::ConfigError;

/// Whether a class of reactions counts toward the qualifying total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactionPolicy {
    #[default]
    Count,
    Ignore,
}

impl ReactionPolicy {
    /// Map an "ignore" flag to a policy
    #[must_use]
    pub fn from_ignore(ignore: bool) -> Self {
        if ignore {
            Self::Ignore
        } else {
            Self::Count
        }
    }

    #[must_use]
    pub fn is_ignore(self) -> bool {
        matches!(self, Self::Ignore)
    }
}

/// Starboard configuration
#[derive(Debug, Clone, Validate)]
pub struct StarboardConfig {
    #[validate(length(min = 1))]
    pub star_emoji: String,
    pub channel_id: Snowflake,
    #[validate(range(min = 1))]
    pub required_reactions: u32,
    pub bot_reactions: ReactionPolicy,
    pub self_reactions: ReactionPolicy,
    pub ignored_channels: HashSet<Snowflake>,
    pub ignored_guilds: HashSet<Snowflake>,
    pub update_on_reaction: bool,
    pub log_actions: bool,
    #[validate(range(max = 0x00FF_FFFF))]
    pub embed_color: u32,
    #[validate(range(min = 1, max = 10))]
    pub max_attachments: usize,
    pub allow_nsfw: bool,
    pub jump_to_message: bool,
    pub show_message_date: bool,
    #[validate(url)]
    pub link_base: String,
    #[validate(range(min = 1, max = 100))]
    pub history_window: u8,
}

// Default value functions
fn default_star_emoji() -> String {
    "⭐".to_string()
}

fn default_required_reactions() -> u32 {
    1
}

fn default_embed_color() -> u32 {
    0x00FF_AC33
}

fn default_max_attachments() -> usize {
    4
}

fn default_history_window() -> u8 {
    100
}

impl StarboardConfig {
    /// Start building a configuration programmatically
    #[must_use]
    pub fn builder() -> StarboardConfigBuilder {
        StarboardConfigBuilder::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `STARBOARD_CHANNEL_ID` is missing or any value is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(channel_id) = parse_var::<Snowflake, _>(&lookup, "STARBOARD_CHANNEL_ID")? {
            builder = builder.channel_id(channel_id);
        }
        if let Some(emoji) = lookup("STARBOARD_EMOJI").filter(|e| !e.trim().is_empty()) {
            builder = builder.star_emoji(emoji.trim());
        }
        if let Some(required) = parse_var(&lookup, "STARBOARD_REQUIRED_REACTIONS")? {
            builder = builder.required_reactions(required);
        }
        if let Some(ignore) = parse_flag(&lookup, "STARBOARD_IGNORE_BOTS")? {
            builder = builder.bot_reactions(ReactionPolicy::from_ignore(ignore));
        }
        if let Some(ignore) = parse_flag(&lookup, "STARBOARD_IGNORE_SELF")? {
            builder = builder.self_reactions(ReactionPolicy::from_ignore(ignore));
        }
        if let Some(raw) = lookup("STARBOARD_IGNORED_CHANNELS") {
            let ids = Snowflake::parse_list(&raw)
                .map_err(|e| ConfigError::InvalidValue("STARBOARD_IGNORED_CHANNELS", e.to_string()))?;
            builder = builder.ignored_channels(ids);
        }
        if let Some(raw) = lookup("STARBOARD_IGNORED_GUILDS") {
            let ids = Snowflake::parse_list(&raw)
                .map_err(|e| ConfigError::InvalidValue("STARBOARD_IGNORED_GUILDS", e.to_string()))?;
            builder = builder.ignored_guilds(ids);
        }
        if let Some(update) = parse_flag(&lookup, "STARBOARD_UPDATE_ON_REACTION")? {
            builder = builder.update_on_reaction(update);
        }
        if let Some(log) = parse_flag(&lookup, "STARBOARD_LOG_ACTIONS")? {
            builder = builder.log_actions(log);
        }
        if let Some(raw) = lookup("STARBOARD_EMBED_COLOR") {
            let color = parse_color(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("STARBOARD_EMBED_COLOR", raw.clone()))?;
            builder = builder.embed_color(color);
        }
        if let Some(max) = parse_var(&lookup, "STARBOARD_MAX_ATTACHMENTS")? {
            builder = builder.max_attachments(max);
        }
        if let Some(allow) = parse_flag(&lookup, "STARBOARD_ALLOW_NSFW")? {
            builder = builder.allow_nsfw(allow);
        }
        if let Some(jump) = parse_flag(&lookup, "STARBOARD_JUMP_TO_MESSAGE")? {
            builder = builder.jump_to_message(jump);
        }
        if let Some(show) = parse_flag(&lookup, "STARBOARD_SHOW_MESSAGE_DATE")? {
            builder = builder.show_message_date(show);
        }
        if let Some(base) = lookup("STARBOARD_LINK_BASE") {
            builder = builder.link_base(base.trim());
        }
        if let Some(window) = parse_var(&lookup, "STARBOARD_HISTORY_WINDOW")? {
            builder = builder.history_window(window);
        }

        builder.build()
    }

    /// Check whether a guild is excluded
    #[inline]
    #[must_use]
    pub fn is_guild_ignored(&self, guild_id: Snowflake) -> bool {
        self.ignored_guilds.contains(&guild_id)
    }

    /// Check whether a channel is excluded
    #[inline]
    #[must_use]
    pub fn is_channel_ignored(&self, channel_id: Snowflake) -> bool {
        self.ignored_channels.contains(&channel_id)
    }
}

/// Builder for [`StarboardConfig`]
///
/// Unset fields take the documented defaults; the feed channel is mandatory.
#[derive(Debug, Clone, Default)]
pub struct StarboardConfigBuilder {
    star_emoji: Option<String>,
    channel_id: Option<Snowflake>,
    required_reactions: Option<u32>,
    bot_reactions: Option<ReactionPolicy>,
    self_reactions: Option<ReactionPolicy>,
    ignored_channels: HashSet<Snowflake>,
    ignored_guilds: HashSet<Snowflake>,
    update_on_reaction: Option<bool>,
    log_actions: Option<bool>,
    embed_color: Option<u32>,
    max_attachments: Option<usize>,
    allow_nsfw: Option<bool>,
    jump_to_message: Option<bool>,
    show_message_date: Option<bool>,
    link_base: Option<String>,
    history_window: Option<u8>,
}

impl StarboardConfigBuilder {
    #[must_use]
    pub fn channel_id(mut self, channel_id: Snowflake) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    #[must_use]
    pub fn star_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.star_emoji = Some(emoji.into());
        self
    }

    #[must_use]
    pub fn required_reactions(mut self, count: u32) -> Self {
        self.required_reactions = Some(count);
        self
    }

    #[must_use]
    pub fn bot_reactions(mut self, policy: ReactionPolicy) -> Self {
        self.bot_reactions = Some(policy);
        self
    }

    #[must_use]
    pub fn self_reactions(mut self, policy: ReactionPolicy) -> Self {
        self.self_reactions = Some(policy);
        self
    }

    #[must_use]
    pub fn ignored_channels(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.ignored_channels.extend(ids);
        self
    }

    #[must_use]
    pub fn ignored_guilds(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.ignored_guilds.extend(ids);
        self
    }

    #[must_use]
    pub fn update_on_reaction(mut self, enabled: bool) -> Self {
        self.update_on_reaction = Some(enabled);
        self
    }

    #[must_use]
    pub fn log_actions(mut self, enabled: bool) -> Self {
        self.log_actions = Some(enabled);
        self
    }

    #[must_use]
    pub fn embed_color(mut self, color: u32) -> Self {
        self.embed_color = Some(color);
        self
    }

    #[must_use]
    pub fn max_attachments(mut self, max: usize) -> Self {
        self.max_attachments = Some(max);
        self
    }

    #[must_use]
    pub fn allow_nsfw(mut self, allow: bool) -> Self {
        self.allow_nsfw = Some(allow);
        self
    }

    #[must_use]
    pub fn jump_to_message(mut self, enabled: bool) -> Self {
        self.jump_to_message = Some(enabled);
        self
    }

    #[must_use]
    pub fn show_message_date(mut self, enabled: bool) -> Self {
        self.show_message_date = Some(enabled);
        self
    }

    #[must_use]
    pub fn link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = Some(base.into());
        self
    }

    #[must_use]
    pub fn history_window(mut self, window: u8) -> Self {
        self.history_window = Some(window);
        self
    }

    /// Resolve defaults and validate
    ///
    /// A required count below 1 is raised to 1 and a max attachment count of 0
    /// falls back to the default.
    pub fn build(self) -> Result<StarboardConfig, ConfigError> {
        let channel_id = self
            .channel_id
            .filter(|id| !id.is_zero())
            .ok_or(ConfigError::MissingVar("STARBOARD_CHANNEL_ID"))?;

        let config = StarboardConfig {
            star_emoji: self.star_emoji.unwrap_or_else(default_star_emoji),
            channel_id,
            required_reactions: self
                .required_reactions
                .unwrap_or_else(default_required_reactions)
                .max(1),
            bot_reactions: self.bot_reactions.unwrap_or(ReactionPolicy::Ignore),
            self_reactions: self.self_reactions.unwrap_or(ReactionPolicy::Count),
            ignored_channels: self.ignored_channels,
            ignored_guilds: self.ignored_guilds,
            update_on_reaction: self.update_on_reaction.unwrap_or(true),
            log_actions: self.log_actions.unwrap_or(true),
            embed_color: self.embed_color.unwrap_or_else(default_embed_color),
            max_attachments: self
                .max_attachments
                .filter(|max| *max != 0)
                .unwrap_or_else(default_max_attachments),
            allow_nsfw: self.allow_nsfw.unwrap_or(false),
            jump_to_message: self.jump_to_message.unwrap_or(true),
            show_message_date: self.show_message_date.unwrap_or(true),
            link_base: self
                .link_base
                .unwrap_or_else(|| DEFAULT_LINK_BASE.to_string()),
            history_window: self.history_window.unwrap_or_else(default_history_window),
        };

        config.validate().map_err(ConfigError::from)?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue(key, raw)),
        },
    }
}

/// Parse `0xRRGGBB`, `#RRGGBB`, or a decimal color value
fn parse_color(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Some(hex) = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .or_else(|| raw.strip_prefix('#'))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}
