//! Event types for the Jarvis session event bus.
//!
//! `SessionEvent` is broadcast after every state transition of a chat
//! session so front ends can re-render without owning session state.
//! All variants are Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::message::{DeliveryState, Message, MessageId, QuickReply, Reaction};
use crate::notification::Notification;

/// Events emitted by a chat session, in the order the transitions happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended at the tail of the log.
    MessageAppended { message: Message },

    /// A message was removed (only the typing placeholder ever is).
    MessageRemoved { message_id: MessageId },

    /// A batch of older messages was inserted at the head of the log.
    HistoryPrepended { count: usize },

    /// A user message advanced its delivery state.
    DeliveryAdvanced {
        message_id: MessageId,
        state: DeliveryState,
    },

    /// A message's reaction changed (`None` means cleared).
    ReactionChanged {
        message_id: MessageId,
        reaction: Option<Reaction>,
    },

    /// The quick-reply suggestions were replaced wholesale.
    QuickRepliesReplaced { replies: Vec<QuickReply> },

    /// The "bot is responding" flag changed.
    AwaitingResponseChanged { awaiting: bool },

    /// The "loading older messages" flag changed.
    LoadingOlderChanged { loading: bool },

    /// A transient notification for the user.
    Notification(Notification),

    /// The session was torn down; no further events follow.
    Closed,
}
