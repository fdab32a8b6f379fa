//! # starboard-gateway
//!
//! Worker process: listens to the platform's event fan-out on Redis, routes
//! reaction and deletion events into the engine, and talks back to the
//! platform over REST.

pub mod dispatcher;
pub mod events;
pub mod platform;
pub mod subscriber;

use std::sync::Arc;

use starboard_common::AppConfig;
use starboard_core::SharedPlatform;
use starboard_engine::LifecycleManager;
use tokio::sync::mpsc;
use tracing::info;

pub use dispatcher::EventDispatcher;
pub use events::{EventEnvelope, GatewayEvent};
pub use platform::RestPlatform;
pub use subscriber::{Subscriber, SubscriberConfig, SubscriberError, CHANNEL_PATTERN};

/// Run the worker until Ctrl-C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let platform: SharedPlatform = Arc::new(RestPlatform::new(&config.gateway)?);
    let starboard = Arc::new(config.starboard);

    info!(
        feed_channel = %starboard.channel_id,
        emoji = %starboard.star_emoji,
        required = starboard.required_reactions,
        "Starboard configured"
    );

    let manager = LifecycleManager::new(starboard, Arc::clone(&platform));
    let dispatcher = EventDispatcher::new(manager, platform);

    let (events_tx, events_rx) = mpsc::channel(config.gateway.event_buffer.max(1));
    let subscriber = Subscriber::spawn(
        SubscriberConfig {
            redis_url: config.gateway.redis_url,
            pattern: CHANNEL_PATTERN.to_string(),
            reconnect_delay_ms: config.gateway.reconnect_delay_ms,
        },
        events_tx,
    );
    let dispatch = tokio::spawn(dispatcher.run(events_rx));

    info!("Starboard worker running");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Stopping the subscriber closes the event stream; the dispatcher then
    // waits for in-flight handlers
    subscriber.shutdown().await.ok();
    dispatch.await?;
    info!("Starboard worker stopped");
    Ok(())
}
