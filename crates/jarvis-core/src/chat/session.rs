//! Async chat session handle.
//!
//! `ChatSession` wraps a `SessionState` behind a mutex that is only ever
//! held for a single synchronous transition, never across an `.await`.
//! Sending and paging each suspend on the response provider; the two are
//! guarded by independent flags so either may run while the other waits.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use jarvis_types::config::SessionConfig;
use jarvis_types::error::ChatError;
use jarvis_types::event::SessionEvent;
use jarvis_types::message::{DeliveryState, Message, MessageId, QuickReply, Reaction};

use super::delivery::DeliveryScheduler;
use super::state::{PendingSend, SessionSnapshot, SessionState};
use crate::event::EventBus;
use crate::provider::box_provider::BoxResponseProvider;
use crate::search::search_messages;

/// What happened to a `send_message` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank text, or a reply was already pending. Nothing changed.
    Ignored,
    /// The bot replied.
    Replied {
        user_id: MessageId,
        reply_id: MessageId,
    },
    /// The provider failed; a system message was appended.
    Failed { user_id: MessageId, error: ChatError },
    /// The session was torn down before or during the call.
    Closed,
}

/// What happened to a `load_older_messages` call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOlderOutcome {
    /// A load was already running. Nothing changed.
    Ignored,
    /// `count` older messages were prepended.
    Loaded { count: usize },
    /// The provider failed; the log is unchanged.
    Failed { error: ChatError },
    Closed,
}

struct Inner {
    state: Mutex<SessionState>,
    provider: Arc<BoxResponseProvider>,
    bus: EventBus,
    delivery: DeliveryScheduler,
    shutdown: CancellationToken,
    config: SessionConfig,
}

impl Inner {
    /// Apply one transition and publish the events it produced.
    fn transition<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().expect("session state lock poisoned");
        let result = f(&mut state);
        for event in state.drain_events() {
            self.bus.publish(event);
        }
        result
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A single conversation: message log, quick replies and in-flight flags.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<Inner>,
}

impl ChatSession {
    /// Start a fresh session containing only the configured greeting.
    pub fn new(provider: Arc<BoxResponseProvider>, config: SessionConfig) -> Self {
        let state = SessionState::new(config.greeting.clone(), provider.quick_replies());
        Self::from_state(provider, config, state)
    }

    /// Resume a session from an existing log.
    pub fn with_messages(
        provider: Arc<BoxResponseProvider>,
        config: SessionConfig,
        messages: Vec<Message>,
    ) -> Self {
        let state = SessionState::from_messages(messages, provider.quick_replies());
        Self::from_state(provider, config, state)
    }

    fn from_state(
        provider: Arc<BoxResponseProvider>,
        config: SessionConfig,
        state: SessionState,
    ) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                provider,
                bus: EventBus::new(config.event_capacity),
                delivery: DeliveryScheduler::new(&shutdown),
                shutdown,
                config,
            }),
        }
    }

    // --- Read access ---

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.transition(|s| s.snapshot())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.transition(|s| s.messages().to_vec())
    }

    pub fn quick_replies(&self) -> Vec<QuickReply> {
        self.inner.transition(|s| s.quick_replies().to_vec())
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.inner.transition(|s| s.is_awaiting_response())
    }

    pub fn is_loading_older(&self) -> bool {
        self.inner.transition(|s| s.is_loading_older())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.transition(|s| s.is_closed())
    }

    /// Receive every `SessionEvent` published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.bus.subscribe()
    }

    /// Case-insensitive search over the current log.
    pub fn search(&self, query: &str) -> Vec<Message> {
        self.inner.transition(|s| {
            search_messages(s.messages(), query)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    // --- Operations ---

    /// Send a user message and wait for the bot's reply.
    ///
    /// The user message and typing placeholder are appended before the
    /// provider is called. Delivery is marked `delivered` on a timer
    /// independent of the reply, and `read` a while after a successful reply.
    #[tracing::instrument(name = "send_message", skip(self, text), fields(chars = text.len()))]
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.start_send(text) {
            Ok(reply) => reply.await,
            Err(outcome) => outcome,
        }
    }

    /// Accept or reject a send without waiting for the reply.
    ///
    /// On acceptance the user message and placeholder are already in the log
    /// when this returns, and the returned future drives the provider call.
    /// On rejection nothing changed and the error is `Ignored` or `Closed`.
    pub fn start_send(
        &self,
        text: &str,
    ) -> Result<impl Future<Output = SendOutcome> + Send + 'static, SendOutcome> {
        let accepted = self.inner.transition(|s| {
            if s.is_closed() {
                None
            } else {
                Some(s.begin_send(text))
            }
        });
        let pending = match accepted {
            None => return Err(SendOutcome::Closed),
            Some(None) => {
                debug!("send ignored");
                return Err(SendOutcome::Ignored);
            }
            Some(Some(pending)) => pending,
        };

        self.schedule_delivery(
            pending.user_id,
            DeliveryState::Delivered,
            self.inner.config.delivered_after_ms,
        );

        let session = self.clone();
        let text = text.to_string();
        Ok(async move { session.await_reply(pending, &text).await })
    }

    async fn await_reply(&self, pending: PendingSend, text: &str) -> SendOutcome {
        let result = tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => return SendOutcome::Closed,
            result = self.inner.provider.get_reply(text) => result,
        };

        match result {
            Ok(reply) => {
                let quick_replies = self.inner.provider.quick_replies();
                let Some(reply_id) = self
                    .inner
                    .transition(|s| s.complete_send(&pending, reply, quick_replies))
                else {
                    return SendOutcome::Closed;
                };
                self.schedule_delivery(
                    pending.user_id,
                    DeliveryState::Read,
                    self.inner.config.read_after_ms,
                );
                info!(user_id = %pending.user_id, reply_id = %reply_id, "reply received");
                SendOutcome::Replied {
                    user_id: pending.user_id,
                    reply_id,
                }
            }
            Err(err) => {
                warn!(provider = self.inner.provider.name(), error = %err, "reply failed");
                if self.inner.transition(|s| s.fail_send(&pending)).is_none() {
                    return SendOutcome::Closed;
                }
                SendOutcome::Failed {
                    user_id: pending.user_id,
                    error: ChatError::Response(err),
                }
            }
        }
    }

    /// Send the text of the current quick reply with this id.
    pub async fn select_quick_reply(&self, id: &str) -> SendOutcome {
        match self.inner.transition(|s| s.quick_reply_text(id)) {
            Some(text) => self.send_message(&text).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Fetch the page of history preceding the earliest message and prepend it.
    #[tracing::instrument(name = "load_older_messages", skip(self))]
    pub async fn load_older_messages(&self) -> LoadOlderOutcome {
        let started = self.inner.transition(|s| {
            if s.is_closed() {
                None
            } else if s.begin_load_older() {
                Some(Some(s.earliest_timestamp()))
            } else {
                Some(None)
            }
        });
        let before = match started {
            None => return LoadOlderOutcome::Closed,
            Some(None) => {
                debug!("load older ignored");
                return LoadOlderOutcome::Ignored;
            }
            Some(Some(before)) => before,
        };

        let result = tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => return LoadOlderOutcome::Closed,
            result = self.inner.provider.fetch_older(before) => result,
        };

        match result {
            Ok(batch) => match self.inner.transition(|s| s.complete_load_older(batch)) {
                Some(count) => {
                    info!(count, "older messages loaded");
                    LoadOlderOutcome::Loaded { count }
                }
                None => LoadOlderOutcome::Closed,
            },
            Err(err) => {
                warn!(provider = self.inner.provider.name(), error = %err, "history fetch failed");
                if !self.inner.transition(|s| s.fail_load_older()) {
                    return LoadOlderOutcome::Closed;
                }
                LoadOlderOutcome::Failed {
                    error: ChatError::HistoryFetch(err),
                }
            }
        }
    }

    /// Toggle a reaction. Returns `None` for unknown messages.
    pub fn set_reaction(&self, id: MessageId, kind: Reaction) -> Option<Option<Reaction>> {
        self.inner.transition(|s| s.set_reaction(id, kind))
    }

    /// Tear the session down.
    ///
    /// Pending delivery timers are cancelled, in-flight provider calls are
    /// abandoned and every later operation is a no-op.
    pub fn close(&self) {
        if self.inner.transition(|s| s.close()) {
            info!("session closed");
        }
        self.inner.shutdown.cancel();
        self.inner.delivery.shutdown();
    }

    fn schedule_delivery(&self, id: MessageId, state: DeliveryState, after_ms: u64) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner
            .delivery
            .schedule(id, state, Duration::from_millis(after_ms), move |id, state| {
                if let Some(inner) = weak.upgrade() {
                    inner.transition(|s| s.advance_delivery(id, state));
                }
            });
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.inner.provider.name())
            .field("pending_deliveries", &self.inner.delivery.pending())
            .finish()
    }
}
