//! Redis Pub/Sub subscriber
//!
//! Pattern-subscribes to every per-channel event stream and forwards decoded
//! envelopes to the dispatcher. Reconnects after a delay on any Redis error.

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::events::EventEnvelope;

/// Pattern covering every channel's event stream
pub const CHANNEL_PATTERN: &str = "channel:*";

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Pattern to subscribe to
    pub pattern: String,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            pattern: CHANNEL_PATTERN.to_string(),
            reconnect_delay_ms: 1000,
        }
    }
}

/// Commands for the listener
#[derive(Debug)]
enum SubscriberCommand {
    Shutdown,
}

/// Handle to a running subscriber
pub struct Subscriber {
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl Subscriber {
    /// Start the background listener, forwarding envelopes into `events_tx`
    pub fn spawn(config: SubscriberConfig, events_tx: mpsc::Sender<EventEnvelope>) -> Self {
        let (control_tx, control_rx) = mpsc::channel(4);
        tokio::spawn(Self::listener_loop(config, events_tx, control_rx));
        Self { control_tx }
    }

    /// Background listener loop
    async fn listener_loop(
        config: SubscriberConfig,
        events_tx: mpsc::Sender<EventEnvelope>,
        mut control_rx: mpsc::Receiver<SubscriberCommand>,
    ) {
        loop {
            match Self::run_listener(&config, &events_tx, &mut control_rx).await {
                Ok(()) => {
                    info!("Subscriber shutting down");
                    break;
                }
                Err(SubscriberError::ChannelClosed) => {
                    info!("Event receiver dropped, subscriber stopping");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Subscriber error, reconnecting...");
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        config.reconnect_delay_ms,
                    ))
                    .await;
                }
            }
        }
    }

    /// Run the listener until error or shutdown
    async fn run_listener(
        config: &SubscriberConfig,
        events_tx: &mpsc::Sender<EventEnvelope>,
        control_rx: &mut mpsc::Receiver<SubscriberCommand>,
    ) -> SubscriberResult<()> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.psubscribe(&config.pattern).await?;

        info!(pattern = %config.pattern, "Subscriber connected to Redis");

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        warn!("Pub/Sub stream ended");
                        return Err(SubscriberError::Redis(redis::RedisError::from((
                            redis::ErrorKind::IoError,
                            "pub/sub stream ended",
                        ))));
                    };

                    let channel_name = msg.get_channel_name().to_string();
                    let payload: String = match msg.get_payload() {
                        Ok(payload) => payload,
                        Err(e) => {
                            debug!(channel = %channel_name, error = %e, "Unreadable payload");
                            continue;
                        }
                    };

                    match parse_envelope(&payload) {
                        Some(envelope) => {
                            trace!(
                                channel = %channel_name,
                                event_type = %envelope.event_type,
                                "Received Pub/Sub message"
                            );
                            events_tx
                                .send(envelope)
                                .await
                                .map_err(|_| SubscriberError::ChannelClosed)?;
                        }
                        None => debug!(channel = %channel_name, "Ignoring non-event payload"),
                    }
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(SubscriberCommand::Shutdown) | None => return Ok(()),
                    }
                }
            }
        }
    }

    /// Shutdown the subscriber
    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.control_tx
            .send(SubscriberCommand::Shutdown)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

/// Parse a raw Pub/Sub payload into an event envelope
pub fn parse_envelope(payload: &str) -> Option<EventEnvelope> {
    serde_json::from_str(payload).ok()
}
