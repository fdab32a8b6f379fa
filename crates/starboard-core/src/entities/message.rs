//! Source message entity - a chat message being evaluated for mirroring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;
use crate::value_objects::{Permalink, Snowflake};

/// Reference to a guild message by ids only
///
/// This is all a deletion event carries, and all the starboard needs to find
/// the mirror of a message that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
}

impl MessageRef {
    /// Create a new MessageRef
    pub fn new(guild_id: Snowflake, channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self {
            guild_id,
            channel_id,
            message_id,
        }
    }

    /// Permanent link of the referenced message
    pub fn permalink(&self, base: &str) -> Permalink {
        Permalink::new(base, self.guild_id, self.channel_id, self.message_id)
    }
}

/// Source message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Snowflake,
    pub author: User,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    /// Inherited from the channel the message was posted in
    pub nsfw: bool,
}

impl SourceMessage {
    /// Create a new text-only SourceMessage
    pub fn new(
        id: Snowflake,
        channel_id: Snowflake,
        guild_id: Snowflake,
        author: User,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel_id,
            guild_id,
            author,
            content: content.into(),
            attachments: Vec::new(),
            created_at,
            nsfw: false,
        }
    }

    /// Attach files to the message
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Set the NSFW flag inherited from the channel
    #[must_use]
    pub fn with_nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    /// Id-only reference to this message
    #[inline]
    pub fn reference(&self) -> MessageRef {
        MessageRef::new(self.guild_id, self.channel_id, self.id)
    }

    /// Permanent link of this message
    pub fn permalink(&self, base: &str) -> Permalink {
        self.reference().permalink(base)
    }
}

/// Media kind of an attachment, as far as the starboard is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
    Other,
}

impl MediaKind {
    /// Classify from content type and URL
    ///
    /// A `.gif` URL wins over the content type; query strings and fragments are
    /// ignored when looking at the extension.
    pub fn classify(content_type: Option<&str>, url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.to_ascii_lowercase().ends_with(".gif") {
            return Self::Gif;
        }

        match content_type {
            Some(ct) if ct.starts_with("image") => Self::Image,
            Some(ct) if ct.starts_with("video") => Self::Video,
            _ => Self::Other,
        }
    }

    /// Image-like media that can be displayed inline
    #[inline]
    pub fn is_inline_image(self) -> bool {
        matches!(self, Self::Image | Self::Gif)
    }
}

/// Attachment on a source message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub url: String,
}

impl Attachment {
    /// Create a new Attachment
    pub fn new(
        id: Snowflake,
        filename: impl Into<String>,
        content_type: Option<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            filename: filename.into(),
            content_type,
            url: url.into(),
        }
    }

    /// Media kind of this attachment
    pub fn kind(&self) -> MediaKind {
        MediaKind::classify(self.content_type.as_deref(), &self.url)
    }
}
