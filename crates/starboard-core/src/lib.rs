//! # starboard-core
//!
//! Domain layer containing entities, value objects, and the chat platform port.
//! This crate has zero dependencies on infrastructure (HTTP, Redis, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    mention, Attachment, Channel, Embed, EmbedAuthor, EmbedField, EmbedImage, MediaKind,
    MessageRef, MirrorPost, PostBody, ReactionDirection, ReactionEvent, SourceMessage, User,
};
pub use error::PlatformError;
pub use traits::{ChatPlatform, PlatformResult, SharedPlatform};
pub use value_objects::{Permalink, Snowflake, SnowflakeParseError, DEFAULT_LINK_BASE};
