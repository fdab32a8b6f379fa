//! Event dispatcher
//!
//! Decodes envelopes and runs each event in its own task against the
//! lifecycle manager. Handler errors are logged and dropped; a failure on one
//! event never affects another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use starboard_core::SharedPlatform;
use starboard_engine::{EngineError, LifecycleAction, LifecycleManager};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::events::{EventEnvelope, GatewayEvent, ReactionPayload};

/// Routes platform events into the engine
#[derive(Clone)]
pub struct EventDispatcher {
    manager: LifecycleManager,
    platform: SharedPlatform,
    /// Events accepted for handling
    sequence: Arc<AtomicU64>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    pub fn new(manager: LifecycleManager, platform: SharedPlatform) -> Self {
        Self {
            manager,
            platform,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of events accepted so far
    pub fn dispatched(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Consume envelopes until the sender side closes
    ///
    /// Returns once every handler spawned from the stream has finished.
    pub async fn run(self, mut events_rx: mpsc::Receiver<EventEnvelope>) {
        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                envelope = events_rx.recv() => {
                    let Some(envelope) = envelope else { break };
                    if let Some(event) = self.accept(envelope) {
                        let dispatcher = self.clone();
                        tasks.spawn(async move { dispatcher.dispatch(event).await });
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        debug!(in_flight = tasks.len(), "Event stream closed, draining handlers");
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
        debug!("Dispatcher stopped");
    }

    /// Decode one envelope and hand it to its own task
    pub fn spawn(&self, envelope: EventEnvelope) -> Option<JoinHandle<()>> {
        let event = self.accept(envelope)?;
        let dispatcher = self.clone();
        Some(tokio::spawn(async move {
            dispatcher.dispatch(event).await;
        }))
    }

    /// Decode an envelope, counting it when it carries a handled event
    fn accept(&self, envelope: EventEnvelope) -> Option<GatewayEvent> {
        let event_type = envelope.event_type.clone();
        match GatewayEvent::decode(envelope) {
            Ok(Some(event)) => {
                self.sequence.fetch_add(1, Ordering::Relaxed);
                Some(event)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(event_type = %event_type, error = %e, "Malformed event payload");
                None
            }
        }
    }

    /// Handle one decoded event to completion
    pub async fn dispatch(&self, event: GatewayEvent) {
        let name = event.name();
        let result = match event {
            GatewayEvent::ReactionAdd(payload) => self.reaction(payload, true).await,
            GatewayEvent::ReactionRemove(payload) => self.reaction(payload, false).await,
            GatewayEvent::MessageDelete(payload) => match payload.message_ref() {
                Some(message) => self.manager.handle_message_delete(&message).await,
                None => Ok(LifecycleAction::Unchanged),
            },
            GatewayEvent::MessageDeleteBulk(payload) => {
                let actions = self
                    .manager
                    .handle_bulk_delete(&payload.message_refs())
                    .await;
                debug!(event_type = name, handled = actions.len(), "Bulk deletion handled");
                return;
            }
        };

        match result {
            Ok(action) => debug!(event_type = name, action = %action, "Event handled"),
            Err(e) => log_failure(name, &e),
        }
    }

    async fn reaction(
        &self,
        payload: ReactionPayload,
        added: bool,
    ) -> Result<LifecycleAction, EngineError> {
        if payload.guild_id.is_none() {
            return Ok(LifecycleAction::Unchanged);
        }
        let is_bot = self.reactor_is_bot(&payload).await;
        match payload.into_event(added, is_bot) {
            Some(event) => self.manager.handle_reaction(&event).await,
            None => Ok(LifecycleAction::Unchanged),
        }
    }

    /// Bot flag of the reactor, looked up only when it matters
    async fn reactor_is_bot(&self, payload: &ReactionPayload) -> bool {
        if let Some(is_bot) = payload.reactor_is_bot() {
            return is_bot;
        }
        let config = self.manager.config();
        if !config.bot_reactions.is_ignore() || payload.emoji.name != config.star_emoji {
            return false;
        }
        match self.platform.fetch_user(payload.user_id).await {
            Ok(user) => user.is_some_and(|u| u.is_bot()),
            Err(e) => {
                debug!(user_id = %payload.user_id, error = %e, "Reactor lookup failed");
                false
            }
        }
    }
}

fn log_failure(event: &'static str, err: &EngineError) {
    match err {
        EngineError::Transport(_) => {
            error!(event_type = event, code = err.code(), error = %err, "Event handling failed");
        }
        _ => warn!(event_type = event, code = err.code(), error = %err, "Event abandoned"),
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Event handler task failed");
    }
}
