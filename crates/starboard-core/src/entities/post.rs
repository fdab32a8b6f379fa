//! Mirror post entities - the structured body sent to the feed channel and the
//! posts read back from it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Permalink, Snowflake};

/// Name of the embed field carrying the dedup marker
pub const MARKER_FIELD_NAME: &str = "Source";

/// Label of the link-back markup in the marker field
pub const JUMP_LABEL: &str = "Jump to message";

/// Embed author block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Embed image block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

/// Embed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    /// Build the dedup marker field for a source link
    ///
    /// With `link_back` the value is clickable markup, otherwise the bare link.
    pub fn dedup_marker(link: &Permalink, link_back: bool) -> Self {
        let value = if link_back {
            format!("[{JUMP_LABEL}]({link})")
        } else {
            link.to_string()
        };
        Self {
            name: MARKER_FIELD_NAME.to_string(),
            value,
            inline: false,
        }
    }

    /// Extract the link from a marker value in either form
    fn marker_link(&self) -> Option<&str> {
        if self.name != MARKER_FIELD_NAME {
            return None;
        }
        let value = self.value.trim();
        match value.strip_prefix('[') {
            Some(rest) => {
                let (_, tail) = rest.split_once("](")?;
                tail.strip_suffix(')')
            }
            None => Some(value),
        }
    }
}

/// Structured embed, serialized in the platform's wire shape
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    /// Dedup marker carried by this embed, if any
    pub fn dedup_marker(&self) -> Option<&str> {
        self.fields.iter().find_map(EmbedField::marker_link)
    }

    /// Check if the embed has anything worth showing
    pub fn has_visible_content(&self) -> bool {
        let has_text = self
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        has_text || self.image.is_some()
    }
}

/// Body of a post to be sent to the feed channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBody {
    pub content: String,
    pub embed: Embed,
}

/// A message in the feed channel, as read back from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorPost {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl MirrorPost {
    /// Create a post from a sent body
    pub fn from_body(id: Snowflake, channel_id: Snowflake, body: &PostBody) -> Self {
        Self {
            id,
            channel_id,
            content: body.content.clone(),
            embeds: vec![body.embed.clone()],
        }
    }

    /// Dedup marker of the first embed
    pub fn dedup_marker(&self) -> Option<&str> {
        self.embeds.first().and_then(Embed::dedup_marker)
    }

    /// Check whether this post mirrors the message behind `link`
    pub fn mirrors(&self, link: &Permalink) -> bool {
        self.dedup_marker().is_some_and(|marker| link.matches(marker))
    }
}
