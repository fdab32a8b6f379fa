//! Post composer
//!
//! Builds the structured body of a mirror post and patches the count in the
//! header of an existing one.

use std::sync::LazyLock;

use regex::Regex;
use starboard_common::StarboardConfig;
use starboard_core::{
    mention, Embed, EmbedAuthor, EmbedField, EmbedImage, MediaKind, PostBody, SourceMessage,
};

use crate::error::CompositionError;

/// Marker preceding the count in a post header
pub const COUNT_MARKER: &str = "💫";

static HEADER_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"💫 \*\*(\d+)\*\*").expect("header pattern is valid"));

/// Render the count fragment of a header
pub fn count_fragment(count: u32) -> String {
    format!("{COUNT_MARKER} **{count}**")
}

/// Read the count currently shown in a header
pub fn header_count(content: &str) -> Option<u32> {
    HEADER_COUNT
        .captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Replace the count in a header, leaving the rest untouched
///
/// Returns `None` if the content carries no count fragment.
pub fn patch_header(content: &str, count: u32) -> Option<String> {
    if !HEADER_COUNT.is_match(content) {
        return None;
    }
    let fragment = count_fragment(count);
    Some(
        HEADER_COUNT
            .replace(content, regex::NoExpand(&fragment))
            .into_owned(),
    )
}

/// Post composer over the active configuration
pub struct PostComposer<'a> {
    config: &'a StarboardConfig,
}

impl<'a> PostComposer<'a> {
    /// Create a new PostComposer
    pub fn new(config: &'a StarboardConfig) -> Self {
        Self { config }
    }

    /// Header line: `💫 **{count}** <#channel>`, optionally followed by the
    /// source date
    pub fn header(&self, source: &SourceMessage, count: u32) -> String {
        let mut header = format!("{} {}", count_fragment(count), mention(source.channel_id));
        if self.config.show_message_date {
            header.push_str(" | ");
            header.push_str(&source.created_at.format("%-m/%-d/%Y").to_string());
        }
        header
    }

    /// Compose the post body for `source` at `count`
    pub fn compose(&self, source: &SourceMessage, count: u32) -> Result<PostBody, CompositionError> {
        let mut image = None;
        let mut links = Vec::new();

        for attachment in source.attachments.iter().take(self.config.max_attachments) {
            match attachment.kind() {
                kind if kind.is_inline_image() && image.is_none() => {
                    image = Some(EmbedImage {
                        url: attachment.url.clone(),
                    });
                }
                MediaKind::Image | MediaKind::Gif | MediaKind::Video => {
                    links.push(attachment.url.as_str());
                }
                MediaKind::Other => {}
            }
        }

        // Source text is carried verbatim; whitespace-only text counts as none
        let mut lines = Vec::with_capacity(links.len() + 1);
        if !source.content.trim().is_empty() {
            lines.push(source.content.as_str());
        }
        lines.extend(links);
        let description = lines.join("\n");

        let link = source.permalink(&self.config.link_base);
        let embed = Embed {
            color: Some(self.config.embed_color),
            author: Some(EmbedAuthor {
                name: source.author.tag(),
                icon_url: Some(source.author.avatar_url()),
            }),
            description: (!description.is_empty()).then_some(description),
            image,
            fields: vec![EmbedField::dedup_marker(
                &link,
                self.config.jump_to_message,
            )],
            timestamp: Some(source.created_at),
        };

        if !embed.has_visible_content() {
            return Err(CompositionError::NothingToPost);
        }

        Ok(PostBody {
            content: self.header(source, count),
            embed,
        })
    }
}
