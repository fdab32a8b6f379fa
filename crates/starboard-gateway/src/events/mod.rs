//! Platform events consumed by the worker

mod payloads;

pub use payloads::{
    EmojiPayload, EventEnvelope, GatewayEvent, MessageDeleteBulkPayload, MessageDeletePayload,
    ReactionPayload, ReactorPayload, MESSAGE_DELETE, MESSAGE_DELETE_BULK, MESSAGE_REACTION_ADD,
    MESSAGE_REACTION_REMOVE,
};
