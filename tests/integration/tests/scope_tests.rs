//! Eligibility and counting tests
//!
//! Run with: cargo test -p integration-tests --test scope_tests

use integration_tests::*;
use starboard_common::ReactionPolicy;
use starboard_core::User;
use starboard_engine::{header_count, LifecycleAction, ReactionCounter, Rejection};

#[tokio::test]
async fn test_excluded_channel_never_acts() {
    let harness = Harness::with_config(
        config_builder()
            .ignored_channels([id(CHANNEL)])
            .build()
            .unwrap(),
    );
    let source = harness.post(text_message("hidden"));

    for reactor in 20..30 {
        let event = harness.platform.react(source.id, STAR, user(reactor));
        let action = harness.manager.handle_reaction(&event).await.unwrap();
        assert_eq!(action, LifecycleAction::Ignored(Rejection::IgnoredChannel));
    }
    let action = harness
        .manager
        .handle_message_delete(&source.reference())
        .await
        .unwrap();
    assert_eq!(action, LifecycleAction::Ignored(Rejection::IgnoredChannel));

    assert!(harness.platform.journal().is_empty());
    assert!(harness.feed().is_empty());
}

#[tokio::test]
async fn test_excluded_guild_never_acts() {
    let harness = Harness::with_config(
        config_builder()
            .ignored_guilds([id(GUILD)])
            .build()
            .unwrap(),
    );
    let source = harness.post(text_message("hidden guild"));

    let event = harness.platform.react(source.id, STAR, user(20));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert_eq!(action, LifecycleAction::Ignored(Rejection::IgnoredGuild));
    assert_eq!(harness.platform.writes(), 0);
}

#[tokio::test]
async fn test_other_emoji_ignored_before_lookup() {
    let harness = Harness::new();
    let source = harness.post(text_message("thumbs"));

    let event = harness.platform.react(source.id, "👍", user(20));
    let action = harness.manager.handle_reaction(&event).await.unwrap();

    assert_eq!(action, LifecycleAction::Ignored(Rejection::WrongEmoji));
    assert!(harness.platform.journal().is_empty());
}

#[tokio::test]
async fn test_nsfw_channel() {
    let harness = Harness::new();
    let source = harness.post(message_in(NSFW_CHANNEL, "spicy"));
    let event = harness.platform.react(source.id, STAR, user(20));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert_eq!(action, LifecycleAction::Ignored(Rejection::Nsfw));

    let harness = Harness::with_config(config_builder().allow_nsfw(true).build().unwrap());
    let source = harness.post(message_in(NSFW_CHANNEL, "spicy"));
    let event = harness.platform.react(source.id, STAR, user(20));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert!(matches!(action, LifecycleAction::Created { .. }));
}

#[tokio::test]
async fn test_bot_reactions_ignored_by_default() {
    let harness = Harness::new();
    let source = harness.post(text_message("bots love this"));

    let event = harness.platform.react(source.id, STAR, bot(30));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert_eq!(action, LifecycleAction::Ignored(Rejection::BotReactor));

    // A human reaction afterwards counts only the human
    let event = harness.platform.react(source.id, STAR, user(20));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert!(matches!(action, LifecycleAction::Created { count: 1, .. }));
}

#[tokio::test]
async fn test_bot_reactions_counted_when_allowed() {
    let harness = Harness::with_config(
        config_builder()
            .bot_reactions(ReactionPolicy::Count)
            .build()
            .unwrap(),
    );
    let source = harness.post(text_message("bots welcome"));

    harness.platform.react(source.id, STAR, user(20));
    let event = harness.platform.react(source.id, STAR, bot(30));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert!(matches!(action, LifecycleAction::Created { count: 2, .. }));
}

#[tokio::test]
async fn test_self_reaction_policy() {
    let harness = Harness::new();
    let source = harness.post(text_message("my own star"));
    let event = harness.platform.react(source.id, STAR, author());
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert!(matches!(action, LifecycleAction::Created { count: 1, .. }));

    let harness = Harness::with_config(
        config_builder()
            .self_reactions(ReactionPolicy::Ignore)
            .build()
            .unwrap(),
    );
    let source = harness.post(text_message("my own star"));
    let event = harness.platform.react(source.id, STAR, author());
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert_eq!(action, LifecycleAction::Ignored(Rejection::SelfReaction));

    // The author's star stays out of the count when someone else reacts
    let event = harness.platform.react(source.id, STAR, user(20));
    harness.manager.handle_reaction(&event).await.unwrap();
    assert_eq!(header_count(&harness.feed()[0].content), Some(1));
}

#[tokio::test]
async fn test_bot_authored_message_is_eligible() {
    let harness = Harness::new();
    let mut message = text_message("beep boop");
    message.author = bot(40);
    let source = harness.post(message);

    let event = harness.platform.react(source.id, STAR, user(20));
    let action = harness.manager.handle_reaction(&event).await.unwrap();
    assert!(matches!(action, LifecycleAction::Created { .. }));
}

#[test]
fn test_count_monotonic_in_qualifying_reactors() {
    let config = config_builder()
        .self_reactions(ReactionPolicy::Ignore)
        .build()
        .unwrap();
    let counter = ReactionCounter::new(&config);

    let arrivals: Vec<User> = vec![
        user(20),
        bot(30),
        author(),
        user(21),
        user(20),
        user(22),
        bot(31),
        user(23),
    ];

    let mut reactors = Vec::new();
    let mut previous = 0;
    for arrival in arrivals {
        let qualifies = !arrival.bot && arrival.id != id(AUTHOR);
        let fresh = !reactors.iter().any(|u: &User| u.id == arrival.id);
        reactors.push(arrival);

        let count = counter.count(&reactors, id(AUTHOR));
        assert!(count >= previous);
        if qualifies && fresh {
            assert_eq!(count, previous + 1);
        } else {
            assert_eq!(count, previous);
        }
        previous = count;
    }
    assert_eq!(previous, 4);
}
