//! Event envelope and payloads
//!
//! Events arrive as `{"event_type": ..., "data": {...}}` envelopes. Only the
//! reaction and deletion events are decoded; everything else is skipped.

use serde::{Deserialize, Serialize};
use starboard_core::{MessageRef, ReactionEvent, Snowflake};

pub const MESSAGE_REACTION_ADD: &str = "MESSAGE_REACTION_ADD";
pub const MESSAGE_REACTION_REMOVE: &str = "MESSAGE_REACTION_REMOVE";
pub const MESSAGE_DELETE: &str = "MESSAGE_DELETE";
pub const MESSAGE_DELETE_BULK: &str = "MESSAGE_DELETE_BULK";

/// Raw event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

/// Emoji of a reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiPayload {
    #[serde(default)]
    pub id: Option<Snowflake>,
    pub name: String,
}

/// Reactor details, when the platform includes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorPayload {
    #[serde(default)]
    pub bot: bool,
}

/// MESSAGE_REACTION_ADD / MESSAGE_REACTION_REMOVE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionPayload {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub emoji: EmojiPayload,
    #[serde(default)]
    pub user: Option<ReactorPayload>,
}

impl ReactionPayload {
    /// Bot flag of the reactor, if the payload carried it
    pub fn reactor_is_bot(&self) -> Option<bool> {
        self.user.map(|user| user.bot)
    }

    /// Convert into a domain event; reactions outside a guild yield `None`
    pub fn into_event(self, added: bool, reactor_is_bot: bool) -> Option<ReactionEvent> {
        let message = MessageRef::new(self.guild_id?, self.channel_id, self.message_id);
        let event = if added {
            ReactionEvent::added(message, self.emoji.name, self.user_id)
        } else {
            ReactionEvent::removed(message, self.emoji.name, self.user_id)
        };
        Some(event.by_bot(reactor_is_bot))
    }
}

/// MESSAGE_DELETE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeletePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

impl MessageDeletePayload {
    pub fn message_ref(&self) -> Option<MessageRef> {
        Some(MessageRef::new(self.guild_id?, self.channel_id, self.id))
    }
}

/// MESSAGE_DELETE_BULK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleteBulkPayload {
    pub ids: Vec<Snowflake>,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

impl MessageDeleteBulkPayload {
    pub fn message_refs(&self) -> Vec<MessageRef> {
        match self.guild_id {
            Some(guild_id) => self
                .ids
                .iter()
                .map(|id| MessageRef::new(guild_id, self.channel_id, *id))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Decoded event the worker acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    ReactionAdd(ReactionPayload),
    ReactionRemove(ReactionPayload),
    MessageDelete(MessageDeletePayload),
    MessageDeleteBulk(MessageDeleteBulkPayload),
}

impl GatewayEvent {
    /// Decode an envelope; unrelated event types yield `Ok(None)`
    pub fn decode(envelope: EventEnvelope) -> Result<Option<Self>, serde_json::Error> {
        let event = match envelope.event_type.as_str() {
            MESSAGE_REACTION_ADD => Self::ReactionAdd(serde_json::from_value(envelope.data)?),
            MESSAGE_REACTION_REMOVE => {
                Self::ReactionRemove(serde_json::from_value(envelope.data)?)
            }
            MESSAGE_DELETE => Self::MessageDelete(serde_json::from_value(envelope.data)?),
            MESSAGE_DELETE_BULK => Self::MessageDeleteBulk(serde_json::from_value(envelope.data)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ReactionAdd(_) => MESSAGE_REACTION_ADD,
            Self::ReactionRemove(_) => MESSAGE_REACTION_REMOVE,
            Self::MessageDelete(_) => MESSAGE_DELETE,
            Self::MessageDeleteBulk(_) => MESSAGE_DELETE_BULK,
        }
    }
}
