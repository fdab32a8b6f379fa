//! Dispatcher tests
//!
//! Feed raw event envelopes through the dispatcher and check the engine acts
//! on them.
//!
//! Run with: cargo test -p integration-tests --test dispatcher_tests

use std::time::Duration;

use serde_json::json;
use starboard_core::SharedPlatform;
use starboard_gateway::events::{
    MESSAGE_DELETE, MESSAGE_DELETE_BULK, MESSAGE_REACTION_ADD, MESSAGE_REACTION_REMOVE,
};
use starboard_gateway::{EventDispatcher, EventEnvelope};
use tokio::sync::mpsc;

use integration_tests::*;

fn dispatcher(harness: &Harness) -> EventDispatcher {
    let platform: SharedPlatform = harness.platform.clone();
    EventDispatcher::new(harness.manager.clone(), platform)
}

fn reaction(event_type: &str, message: &starboard_core::SourceMessage, user_id: i64) -> EventEnvelope {
    EventEnvelope::new(
        event_type,
        json!({
            "user_id": user_id.to_string(),
            "channel_id": message.channel_id.to_string(),
            "message_id": message.id.to_string(),
            "guild_id": message.guild_id.to_string(),
            "emoji": { "name": STAR }
        }),
    )
}

async fn deliver(dispatcher: &EventDispatcher, envelope: EventEnvelope) {
    if let Some(handle) = dispatcher.spawn(envelope) {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_reaction_envelopes_drive_lifecycle() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness);
    let source = harness.post(text_message("via redis"));

    harness.platform.react(source.id, STAR, user(20));
    deliver(&dispatcher, reaction(MESSAGE_REACTION_ADD, &source, 20)).await;
    assert_eq!(harness.feed().len(), 1);

    harness.platform.unreact(source.id, STAR, id(20));
    deliver(&dispatcher, reaction(MESSAGE_REACTION_REMOVE, &source, 20)).await;
    assert!(harness.feed().is_empty());
    assert_eq!(dispatcher.dispatched(), 2);
}

#[tokio::test]
async fn test_reactor_bot_flag_looked_up() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness);
    let source = harness.post(text_message("bot bait"));

    harness.platform.react(source.id, STAR, bot(30));
    deliver(&dispatcher, reaction(MESSAGE_REACTION_ADD, &source, 30)).await;

    assert!(harness.feed().is_empty());
    assert!(harness
        .platform
        .journal()
        .contains(&PlatformCall::FetchUser(id(30))));
    assert!(!harness
        .platform
        .journal()
        .iter()
        .any(|call| matches!(call, PlatformCall::FetchMessage(_))));
}

#[tokio::test]
async fn test_reactor_flag_in_payload_skips_lookup() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness);
    let source = harness.post(text_message("flagged"));

    harness.platform.react(source.id, STAR, user(20));
    let mut envelope = reaction(MESSAGE_REACTION_ADD, &source, 20);
    envelope.data["user"] = json!({ "bot": false });
    deliver(&dispatcher, envelope).await;

    assert_eq!(harness.feed().len(), 1);
    assert!(!harness
        .platform
        .journal()
        .iter()
        .any(|call| matches!(call, PlatformCall::FetchUser(_))));
}

#[tokio::test]
async fn test_delete_envelopes() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness);
    let first = harness.post(text_message("first"));
    let second = harness.post(text_message("second"));
    harness.manager.reconcile(&first, 1).await.unwrap();
    harness.manager.reconcile(&second, 1).await.unwrap();

    deliver(
        &dispatcher,
        EventEnvelope::new(
            MESSAGE_DELETE,
            json!({
                "id": first.id.to_string(),
                "channel_id": first.channel_id.to_string(),
                "guild_id": first.guild_id.to_string()
            }),
        ),
    )
    .await;
    assert_eq!(harness.feed().len(), 1);

    deliver(
        &dispatcher,
        EventEnvelope::new(
            MESSAGE_DELETE_BULK,
            json!({
                "ids": [second.id.to_string(), "424242"],
                "channel_id": second.channel_id.to_string(),
                "guild_id": second.guild_id.to_string()
            }),
        ),
    )
    .await;
    assert!(harness.feed().is_empty());
}

#[tokio::test]
async fn test_unrelated_and_malformed_events_dropped() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness);

    assert!(dispatcher
        .spawn(EventEnvelope::new("TYPING_START", json!({ "channel_id": "2" })))
        .is_none());
    assert!(dispatcher
        .spawn(EventEnvelope::new(MESSAGE_REACTION_ADD, json!({ "emoji": {} })))
        .is_none());
    assert_eq!(dispatcher.dispatched(), 0);
    assert!(harness.platform.journal().is_empty());
}

#[tokio::test]
async fn test_direct_message_reactions_ignored() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness);
    let source = harness.post(text_message("dm"));

    let mut envelope = reaction(MESSAGE_REACTION_ADD, &source, 20);
    envelope.data["guild_id"] = serde_json::Value::Null;
    deliver(&dispatcher, envelope).await;

    assert!(harness.feed().is_empty());
    assert!(harness.platform.journal().is_empty());
}

#[tokio::test]
async fn test_run_drains_in_flight_handlers() {
    let harness = Harness::with_platform(
        config_builder().build().unwrap(),
        FakePlatform::new().with_latency(Duration::from_millis(20)),
    );
    let source = harness.post(text_message("queued"));
    harness.platform.react(source.id, STAR, user(20));

    let (tx, rx) = mpsc::channel(8);
    let runner = tokio::spawn(dispatcher(&harness).run(rx));
    tx.send(reaction(MESSAGE_REACTION_ADD, &source, 20)).await.unwrap();
    drop(tx);
    runner.await.unwrap();

    // The handler was still talking to the platform when the stream closed
    assert_eq!(harness.feed().len(), 1);
    assert_eq!(harness.platform.sends(), 1);
}
