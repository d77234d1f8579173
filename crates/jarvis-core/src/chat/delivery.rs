//! Deferred delivery-state transitions.
//!
//! `DeliveryScheduler` runs "mark as delivered/read" updates on tokio timers.
//! Each scheduled transition is keyed by the message it targets and runs at
//! most once. All pending transitions are cancelled together on teardown.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::trace;

use jarvis_types::message::{DeliveryState, MessageId};

/// Timer queue for delivery transitions of one session.
#[derive(Debug, Clone)]
pub struct DeliveryScheduler {
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl DeliveryScheduler {
    /// Create a scheduler whose timers stop when `parent` is cancelled.
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            cancel: parent.child_token(),
            tracker: TaskTracker::new(),
        }
    }

    /// Run `apply(message_id, state)` after `delay`, unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, message_id: MessageId, state: DeliveryState, delay: Duration, apply: F)
    where
        F: FnOnce(MessageId, DeliveryState) + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            return;
        }
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    trace!(%message_id, %state, "delivery transition cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    apply(message_id, state);
                }
            }
        });
    }

    /// Number of transitions still waiting to fire.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel every pending transition.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
    }

    /// Wait until every spawned transition has fired or been cancelled.
    ///
    /// Only returns after `shutdown` has been called.
    pub async fn drained(&self) {
        self.tracker.wait().await;
    }
}
