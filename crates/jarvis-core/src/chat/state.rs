//! Synchronous session state and its transitions.
//!
//! Every method here is one atomic step of the session state machine. Each
//! transition records the `SessionEvent`s it caused in an outbox that the
//! owning `ChatSession` drains and publishes while still holding the lock,
//! so subscribers observe events in exactly the order the log changed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use jarvis_types::event::SessionEvent;
use jarvis_types::message::{DeliveryState, Message, MessageId, QuickReply, Reaction};
use jarvis_types::notification::Notification;

pub(crate) const REPLY_FAILED_SYSTEM_TEXT: &str = "There was an error processing your request.";
pub(crate) const REPLY_FAILED_NOTICE: &str = "Failed to get response. Please try again.";
pub(crate) const OLDER_LOADED_NOTICE: &str = "Loaded older messages.";
pub(crate) const OLDER_FAILED_NOTICE: &str = "Failed to load older messages.";

/// Ids created by an accepted send, needed to resolve it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSend {
    pub user_id: MessageId,
    pub placeholder_id: MessageId,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub quick_replies: Vec<QuickReply>,
    pub is_awaiting_response: bool,
    pub is_loading_older: bool,
}

/// The message log plus the two independent in-flight flags.
#[derive(Debug)]
pub struct SessionState {
    messages: Vec<Message>,
    quick_replies: Vec<QuickReply>,
    awaiting_response: bool,
    loading_older: bool,
    closed: bool,
    outbox: Vec<SessionEvent>,
}

impl SessionState {
    /// A fresh session whose log holds a single bot greeting.
    pub fn new(greeting: impl Into<String>, quick_replies: Vec<QuickReply>) -> Self {
        Self::from_messages(vec![Message::bot(greeting)], quick_replies)
    }

    /// A session resumed from an existing log. Typing placeholders are dropped.
    pub fn from_messages(messages: Vec<Message>, quick_replies: Vec<QuickReply>) -> Self {
        Self {
            messages: messages.into_iter().filter(|m| !m.is_typing).collect(),
            quick_replies,
            awaiting_response: false,
            loading_older: false,
            closed: false,
            outbox: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn is_loading_older(&self) -> bool {
        self.loading_older
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Timestamp of the oldest message in the log.
    pub fn earliest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.first().map(|m| m.timestamp)
    }

    /// Text of the current quick reply with the given id.
    pub fn quick_reply_text(&self, id: &str) -> Option<String> {
        self.quick_replies
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.text.clone())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            quick_replies: self.quick_replies.clone(),
            is_awaiting_response: self.awaiting_response,
            is_loading_older: self.loading_older,
        }
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    // --- Sending ---

    /// Accept a user message.
    ///
    /// Returns `None` without touching anything when a reply is already
    /// pending, the text is blank, or the session is closed. Otherwise
    /// appends the user message and the typing placeholder, clears quick
    /// replies and raises the awaiting flag in one step.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if self.closed || self.awaiting_response || text.trim().is_empty() {
            return None;
        }
        debug_assert!(!self.messages.iter().any(|m| m.is_typing));

        let user = Message::user(text);
        let placeholder = Message::typing_placeholder();
        let pending = PendingSend {
            user_id: user.id,
            placeholder_id: placeholder.id,
        };

        self.append(user);
        self.replace_quick_replies(Vec::new());
        self.append(placeholder);
        self.set_awaiting(true);

        Some(pending)
    }

    /// Resolve a pending send with the bot's reply.
    ///
    /// Returns the id of the new bot message, or `None` if the session was
    /// closed in the meantime.
    pub fn complete_send(
        &mut self,
        pending: &PendingSend,
        reply: String,
        quick_replies: Vec<QuickReply>,
    ) -> Option<MessageId> {
        if self.closed {
            return None;
        }
        self.remove(pending.placeholder_id);
        let bot = Message::bot(reply);
        let bot_id = bot.id;
        self.append(bot);
        self.replace_quick_replies(quick_replies);
        self.set_awaiting(false);
        Some(bot_id)
    }

    /// Resolve a pending send that failed.
    ///
    /// The user message keeps whatever delivery state it reached.
    pub fn fail_send(&mut self, pending: &PendingSend) -> Option<MessageId> {
        if self.closed {
            return None;
        }
        self.remove(pending.placeholder_id);
        self.notify(Notification::error("Error", REPLY_FAILED_NOTICE));
        let system = Message::system(REPLY_FAILED_SYSTEM_TEXT);
        let system_id = system.id;
        self.append(system);
        self.set_awaiting(false);
        Some(system_id)
    }

    // --- Pagination ---

    /// Raise the loading flag. Returns `false` if a load is already running.
    pub fn begin_load_older(&mut self) -> bool {
        if self.closed || self.loading_older {
            return false;
        }
        self.set_loading_older(true);
        true
    }

    /// Prepend a page of older messages and clear the loading flag.
    ///
    /// The batch keeps its own order and lands entirely before the existing
    /// log. Messages already present (by id) and typing placeholders are
    /// skipped. Returns the number of messages inserted.
    pub fn complete_load_older(&mut self, batch: Vec<Message>) -> Option<usize> {
        if self.closed {
            return None;
        }
        let existing: HashSet<MessageId> = self.messages.iter().map(|m| m.id).collect();
        let mut older: Vec<Message> = batch
            .into_iter()
            .filter(|m| !m.is_typing && !existing.contains(&m.id))
            .collect();
        let count = older.len();

        older.append(&mut self.messages);
        self.messages = older;

        self.outbox.push(SessionEvent::HistoryPrepended { count });
        self.notify(Notification::info("Success", OLDER_LOADED_NOTICE));
        self.set_loading_older(false);
        Some(count)
    }

    /// Clear the loading flag after a failed fetch.
    pub fn fail_load_older(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.notify(Notification::error("Error", OLDER_FAILED_NOTICE));
        self.set_loading_older(false);
        true
    }

    // --- Per-message updates ---

    /// Move a user message's delivery state forward.
    ///
    /// Update-if-present: unknown ids and backward moves are ignored.
    pub fn advance_delivery(&mut self, id: MessageId, state: DeliveryState) -> bool {
        if self.closed {
            return false;
        }
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if !message.advance_delivery(state) {
            return false;
        }
        self.outbox.push(SessionEvent::DeliveryAdvanced {
            message_id: id,
            state,
        });
        true
    }

    /// Toggle a reaction on a message.
    ///
    /// Returns `None` for unknown ids, otherwise the reaction now in effect.
    pub fn set_reaction(&mut self, id: MessageId, kind: Reaction) -> Option<Option<Reaction>> {
        if self.closed {
            return None;
        }
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id && !m.is_typing)?;
        let reaction = message.toggle_reaction(kind);
        self.outbox.push(SessionEvent::ReactionChanged {
            message_id: id,
            reaction,
        });
        Some(reaction)
    }

    /// Tear down: drop any typing placeholder and refuse further transitions.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if let Some(id) = self.messages.iter().find(|m| m.is_typing).map(|m| m.id) {
            self.remove(id);
        }
        self.closed = true;
        self.outbox.push(SessionEvent::Closed);
        true
    }

    // --- Internal helpers ---

    fn append(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.outbox.push(SessionEvent::MessageAppended { message });
    }

    fn remove(&mut self, id: MessageId) {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        if self.messages.len() != before {
            self.outbox.push(SessionEvent::MessageRemoved { message_id: id });
        }
    }

    fn replace_quick_replies(&mut self, replies: Vec<QuickReply>) {
        self.quick_replies = replies.clone();
        self.outbox.push(SessionEvent::QuickRepliesReplaced { replies });
    }

    fn set_awaiting(&mut self, awaiting: bool) {
        self.awaiting_response = awaiting;
        self.outbox
            .push(SessionEvent::AwaitingResponseChanged { awaiting });
    }

    fn set_loading_older(&mut self, loading: bool) {
        self.loading_older = loading;
        self.outbox.push(SessionEvent::LoadingOlderChanged { loading });
    }

    fn notify(&mut self, notification: Notification) {
        self.outbox.push(SessionEvent::Notification(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_types::message::MessageRole;

    const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

    fn fresh() -> SessionState {
        SessionState::new(GREETING, vec![QuickReply::new("a", "Tell me more")])
    }

    fn typing_count(state: &SessionState) -> usize {
        state.messages().iter().filter(|m| m.is_typing).count()
    }

    #[test]
    fn test_initial_state_has_single_greeting() {
        let state = fresh();
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role, MessageRole::Bot);
        assert!(state.messages()[0].content.starts_with("Hello!"));
        assert!(!state.is_awaiting_response());
        assert!(!state.is_loading_older());
    }

    #[test]
    fn test_begin_send_appends_user_and_placeholder() {
        let mut state = fresh();
        let pending = state.begin_send("test").unwrap();

        let msgs = state.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].id, pending.user_id);
        assert_eq!(msgs[1].content, "test");
        assert_eq!(msgs[1].delivery, Some(DeliveryState::Sent));
        assert_eq!(msgs[2].id, pending.placeholder_id);
        assert!(msgs[2].is_typing);
        assert!(state.quick_replies().is_empty());
        assert!(state.is_awaiting_response());
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let mut state = fresh();
        assert!(state.begin_send("").is_none());
        assert!(state.begin_send("   ").is_none());
        assert!(state.begin_send("\n\t").is_none());
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.quick_replies().len(), 1);
        assert!(!state.is_awaiting_response());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_send_while_awaiting_is_ignored() {
        let mut state = fresh();
        state.begin_send("first").unwrap();
        for text in ["second", "third", "fourth"] {
            assert!(state.begin_send(text).is_none());
        }
        let users = state
            .messages()
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count();
        assert_eq!(users, 1);
        assert_eq!(typing_count(&state), 1);
    }

    #[test]
    fn test_complete_send_replaces_placeholder() {
        let mut state = fresh();
        let pending = state.begin_send("hi").unwrap();
        let replies = vec![QuickReply::new("x", "Thanks!")];
        let bot_id = state
            .complete_send(&pending, "Sure thing.".to_string(), replies.clone())
            .unwrap();

        let msgs = state.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].content, "hi");
        assert_eq!(msgs[2].id, bot_id);
        assert_eq!(msgs[2].role, MessageRole::Bot);
        assert_eq!(typing_count(&state), 0);
        assert_eq!(state.quick_replies(), replies.as_slice());
        assert!(!state.is_awaiting_response());
    }

    #[test]
    fn test_fail_send_appends_system_message() {
        let mut state = fresh();
        let pending = state.begin_send("hi").unwrap();
        state.drain_events();
        state.fail_send(&pending).unwrap();

        let msgs = state.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[2].role, MessageRole::System);
        assert_eq!(msgs[2].content, REPLY_FAILED_SYSTEM_TEXT);
        assert_eq!(msgs[1].delivery, Some(DeliveryState::Sent));
        assert_eq!(typing_count(&state), 0);
        assert!(!state.is_awaiting_response());

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::Notification(n) if n.is_error() && n.description == REPLY_FAILED_NOTICE
        )));
    }

    #[test]
    fn test_send_events_in_order() {
        let mut state = fresh();
        state.begin_send("hi").unwrap();
        let events = state.drain_events();
        assert!(matches!(events[0], SessionEvent::MessageAppended { ref message } if message.role == MessageRole::User));
        assert!(matches!(events[1], SessionEvent::QuickRepliesReplaced { ref replies } if replies.is_empty()));
        assert!(matches!(events[2], SessionEvent::MessageAppended { ref message } if message.is_typing));
        assert!(matches!(events[3], SessionEvent::AwaitingResponseChanged { awaiting: true }));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_prepend_preserves_order() {
        let mut state = fresh();
        state.begin_send("hi").unwrap();
        let before: Vec<MessageId> = state.messages().iter().map(|m| m.id).collect();

        assert!(state.begin_load_older());
        let batch = vec![Message::user("old 1"), Message::bot("old 2")];
        let batch_ids: Vec<MessageId> = batch.iter().map(|m| m.id).collect();
        assert_eq!(state.complete_load_older(batch), Some(2));

        let after: Vec<MessageId> = state.messages().iter().map(|m| m.id).collect();
        assert_eq!(after.len(), before.len() + 2);
        assert_eq!(&after[..2], batch_ids.as_slice());
        assert_eq!(&after[2..], before.as_slice());
        assert!(!state.is_loading_older());
        // Sending and paging are independent.
        assert!(state.is_awaiting_response());
    }

    #[test]
    fn test_prepend_skips_duplicates_and_placeholders() {
        let mut state = fresh();
        let existing = state.messages()[0].clone();
        assert!(state.begin_load_older());
        let inserted = state
            .complete_load_older(vec![
                Message::user("older"),
                existing,
                Message::typing_placeholder(),
            ])
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(state.messages().len(), 2);
        assert_eq!(typing_count(&state), 0);
    }

    #[test]
    fn test_load_older_guard() {
        let mut state = fresh();
        assert!(state.begin_load_older());
        assert!(!state.begin_load_older());
        assert!(state.fail_load_older());
        assert!(!state.is_loading_older());
        assert!(state.begin_load_older());
    }

    #[test]
    fn test_fail_load_older_leaves_log_untouched() {
        let mut state = fresh();
        state.begin_load_older();
        state.fail_load_older();
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_advance_delivery_update_if_present() {
        let mut state = fresh();
        let pending = state.begin_send("hi").unwrap();
        assert!(state.advance_delivery(pending.user_id, DeliveryState::Delivered));
        assert!(!state.advance_delivery(pending.user_id, DeliveryState::Sent));
        assert!(!state.advance_delivery(MessageId::new(), DeliveryState::Read));
        assert!(state.advance_delivery(pending.user_id, DeliveryState::Read));
        assert_eq!(state.messages()[1].delivery, Some(DeliveryState::Read));
    }

    #[test]
    fn test_reaction_toggles_off() {
        let mut state = fresh();
        let id = state.messages()[0].id;
        assert_eq!(state.set_reaction(id, Reaction::Like), Some(Some(Reaction::Like)));
        assert_eq!(state.set_reaction(id, Reaction::Like), Some(None));
        assert!(state.messages()[0].reaction.is_none());
    }

    #[test]
    fn test_reaction_switches_kind() {
        let mut state = fresh();
        let id = state.messages()[0].id;
        state.set_reaction(id, Reaction::Like);
        assert_eq!(state.set_reaction(id, Reaction::Love), Some(Some(Reaction::Love)));
    }

    #[test]
    fn test_reaction_unknown_id_is_noop() {
        let mut state = fresh();
        state.drain_events();
        assert_eq!(state.set_reaction(MessageId::new(), Reaction::Like), None);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_close_removes_placeholder_and_blocks_transitions() {
        let mut state = fresh();
        let pending = state.begin_send("hi").unwrap();
        assert!(state.close());
        assert_eq!(typing_count(&state), 0);
        assert!(state.complete_send(&pending, "late".into(), vec![]).is_none());
        assert!(!state.advance_delivery(pending.user_id, DeliveryState::Delivered));
        assert!(state.begin_send("again").is_none());
        assert!(!state.begin_load_older());
        assert!(!state.close());
        assert!(state
            .messages()
            .iter()
            .all(|m| m.role != MessageRole::Bot || m.content != "late"));
    }

    #[test]
    fn test_from_messages_drops_placeholders() {
        let state = SessionState::from_messages(
            vec![Message::bot("hi"), Message::typing_placeholder()],
            vec![],
        );
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_quick_reply_lookup() {
        let state = fresh();
        assert_eq!(state.quick_reply_text("a").as_deref(), Some("Tell me more"));
        assert!(state.quick_reply_text("missing").is_none());
    }
}
