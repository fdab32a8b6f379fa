//! Wire shapes of the platform's REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use starboard_core::{Attachment, Channel, Embed, MirrorPost, PostBody, Snowflake, SourceMessage, User};

/// Message as returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl MessageDto {
    /// Convert into a source message, taking guild and NSFW flag from its channel
    ///
    /// Returns `None` for messages outside a guild.
    pub fn into_source(self, channel: &Channel) -> Option<SourceMessage> {
        let guild_id = self.guild_id.or(channel.guild_id)?;
        Some(
            SourceMessage::new(
                self.id,
                self.channel_id,
                guild_id,
                self.author,
                self.content,
                self.timestamp,
            )
            .with_attachments(self.attachments)
            .with_nsfw(channel.nsfw),
        )
    }

    pub fn into_post(self) -> MirrorPost {
        MirrorPost {
            id: self.id,
            channel_id: self.channel_id,
            content: self.content,
            embeds: self.embeds,
        }
    }
}

/// POST /channels/{channel_id}/messages
#[derive(Debug, Serialize)]
pub struct CreateMessageRequest<'a> {
    pub content: &'a str,
    pub embeds: &'a [Embed],
}

impl<'a> From<&'a PostBody> for CreateMessageRequest<'a> {
    fn from(body: &'a PostBody) -> Self {
        Self {
            content: &body.content,
            embeds: std::slice::from_ref(&body.embed),
        }
    }
}

/// PATCH /channels/{channel_id}/messages/{message_id}
#[derive(Debug, Serialize)]
pub struct EditMessageRequest<'a> {
    pub content: &'a str,
}

/// Error body returned by the REST API
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}
