//! Domain entities - core business objects

mod channel;
mod message;
mod post;
mod reaction;
mod user;

pub use channel::{mention, Channel};
pub use message::{Attachment, MediaKind, MessageRef, SourceMessage};
pub use post::{
    Embed, EmbedAuthor, EmbedField, EmbedImage, MirrorPost, PostBody, JUMP_LABEL,
    MARKER_FIELD_NAME,
};
pub use reaction::{ReactionDirection, ReactionEvent};
pub use user::{User, CDN_BASE};
