//! Fan-out of `SessionEvent`s to front ends.
//!
//! One bus per session. Events are published while the session lock is held,
//! so every subscriber sees them in transition order. A subscriber that falls
//! more than `capacity` events behind gets `RecvError::Lagged` and resumes at
//! the oldest retained event.

use jarvis_types::event::SessionEvent;
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// `capacity` is clamped to at least one retained event.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers and return how many there were.
    pub fn publish(&self, event: SessionEvent) -> usize {
        match self.sender.send(event) {
            Ok(reached) => reached,
            Err(_) => {
                trace!("session event dropped, nobody subscribed");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
