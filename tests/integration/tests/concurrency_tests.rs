//! Concurrency tests
//!
//! Run with: cargo test -p integration-tests --test concurrency_tests

use std::time::Duration;

use integration_tests::*;
use starboard_engine::{header_count, LifecycleAction};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_create_one_mirror() {
    let harness = Harness::with_platform(
        config_builder().build().unwrap(),
        FakePlatform::new().with_latency(Duration::from_millis(2)),
    );
    let source = harness.post(text_message("everyone at once"));

    let events: Vec<_> = (20..36)
        .map(|reactor| harness.platform.react(source.id, STAR, user(reactor)))
        .collect();

    let handles: Vec<_> = events
        .into_iter()
        .map(|event| {
            let manager = harness.manager.clone();
            tokio::spawn(async move { manager.handle_reaction(&event).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let action = handle.await.unwrap().unwrap();
        if matches!(action, LifecycleAction::Created { .. }) {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(harness.platform.sends(), 1);
    let feed = harness.feed();
    assert_eq!(feed.len(), 1);
    assert_eq!(header_count(&feed[0].content), Some(16));
    assert_eq!(harness.manager.pending_locks(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_messages_proceed_independently() {
    let harness = Harness::with_platform(
        config_builder().build().unwrap(),
        FakePlatform::new().with_latency(Duration::from_millis(2)),
    );

    let sources: Vec<_> = (0..8)
        .map(|n| harness.post(text_message(&format!("message {n}"))))
        .collect();

    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let event = harness.platform.react(source.id, STAR, user(20));
            let manager = harness.manager.clone();
            tokio::spawn(async move { manager.handle_reaction(&event).await })
        })
        .collect();

    for handle in handles {
        let action = handle.await.unwrap().unwrap();
        assert!(matches!(action, LifecycleAction::Created { .. }));
    }

    assert_eq!(harness.feed().len(), 8);
    for source in &sources {
        assert!(harness.manager.index().get(source.id).is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_racing_reactions_leaves_no_mirror() {
    let harness = Harness::with_platform(
        config_builder().build().unwrap(),
        FakePlatform::new().with_latency(Duration::from_millis(1)),
    );
    let source = harness.post(text_message("short lived"));
    let first = harness.platform.react(source.id, STAR, user(20));
    harness.manager.handle_reaction(&first).await.unwrap();

    let late = harness.platform.react(source.id, STAR, user(21));
    harness.platform.remove_message(source.id);

    let reaction = {
        let manager = harness.manager.clone();
        tokio::spawn(async move { manager.handle_reaction(&late).await })
    };
    let deletion = {
        let manager = harness.manager.clone();
        let reference = source.reference();
        tokio::spawn(async move { manager.handle_message_delete(&reference).await })
    };

    // The late reaction may edit the mirror or find the source gone
    let _ = reaction.await.unwrap();
    deletion.await.unwrap().unwrap();

    assert!(harness.feed().is_empty());
}
