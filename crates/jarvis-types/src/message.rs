//! Chat message and quick reply types for Jarvis.
//!
//! A conversation is an ordered log of `Message`s. User messages carry a
//! delivery state that only moves forward; any message can carry a single
//! user-chosen reaction. The transient "bot is typing" placeholder is an
//! ordinary message with `is_typing` set and empty content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a message, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Create a new MessageId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a MessageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Bot => write!(f, "bot"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "bot" => Ok(MessageRole::Bot),
            "system" => Ok(MessageRole::System),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Delivery progress of a user message.
///
/// Variants are ordered: `Sent < Delivered < Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Sent,
    Delivered,
    Read,
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryState::Sent => write!(f, "sent"),
            DeliveryState::Delivered => write!(f, "delivered"),
            DeliveryState::Read => write!(f, "read"),
        }
    }
}

/// A user-chosen reaction on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
    Love,
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reaction::Like => write!(f, "like"),
            Reaction::Dislike => write!(f, "dislike"),
            Reaction::Love => write!(f, "love"),
        }
    }
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(Reaction::Like),
            "dislike" => Ok(Reaction::Dislike),
            "love" => Ok(Reaction::Love),
            other => Err(format!("invalid reaction: '{other}'")),
        }
    }
}

/// A single entry in the conversation log.
///
/// Only `delivery` and `reaction` ever change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    /// Delivery progress (user messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryState>,
    /// True only for the transient "bot is composing" placeholder.
    #[serde(default)]
    pub is_typing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
            delivery: None,
            is_typing: false,
            reaction: None,
        }
    }

    /// A freshly sent user message (`delivery = Sent`).
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            delivery: Some(DeliveryState::Sent),
            ..Self::with_role(MessageRole::User, content)
        }
    }

    /// A bot reply.
    pub fn bot(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Bot, content)
    }

    /// A system notice (e.g. an error report).
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// The empty bot message shown while a reply is being generated.
    pub fn typing_placeholder() -> Self {
        Self {
            is_typing: true,
            ..Self::with_role(MessageRole::Bot, String::new())
        }
    }

    /// Override the creation timestamp (used for historical messages).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Advance the delivery state.
    ///
    /// Returns `false` (and changes nothing) for non-user messages and for
    /// transitions that would not move the state forward.
    pub fn advance_delivery(&mut self, next: DeliveryState) -> bool {
        match self.delivery {
            Some(current) if next > current => {
                self.delivery = Some(next);
                true
            }
            _ => false,
        }
    }

    /// Toggle a reaction: selecting the current one clears it.
    ///
    /// Returns the reaction now in effect.
    pub fn toggle_reaction(&mut self, kind: Reaction) -> Option<Reaction> {
        self.reaction = if self.reaction == Some(kind) {
            None
        } else {
            Some(kind)
        };
        self.reaction
    }
}

/// A suggested canned reply the user can pick instead of typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub id: String,
    pub text: String,
}

impl QuickReply {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Bot, MessageRole::System] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("assistant".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&MessageRole::System).unwrap();
        assert_eq!(json, "\"system\"");
    }

    #[test]
    fn test_user_message_starts_sent() {
        let msg = Message::user("hi");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.delivery, Some(DeliveryState::Sent));
        assert!(!msg.is_typing);
    }

    #[test]
    fn test_typing_placeholder_is_empty_bot_message() {
        let msg = Message::typing_placeholder();
        assert_eq!(msg.role, MessageRole::Bot);
        assert!(msg.is_typing);
        assert!(msg.content.is_empty());
        assert!(msg.delivery.is_none());
    }

    #[test]
    fn test_delivery_only_moves_forward() {
        let mut msg = Message::user("hi");
        assert!(msg.advance_delivery(DeliveryState::Read));
        assert!(!msg.advance_delivery(DeliveryState::Delivered));
        assert_eq!(msg.delivery, Some(DeliveryState::Read));
        assert!(!msg.advance_delivery(DeliveryState::Read));
    }

    #[test]
    fn test_delivery_ignored_for_bot_messages() {
        let mut msg = Message::bot("hello");
        assert!(!msg.advance_delivery(DeliveryState::Delivered));
        assert!(msg.delivery.is_none());
    }

    #[test]
    fn test_reaction_toggle() {
        let mut msg = Message::bot("hello");
        assert_eq!(msg.toggle_reaction(Reaction::Like), Some(Reaction::Like));
        assert_eq!(msg.toggle_reaction(Reaction::Love), Some(Reaction::Love));
        assert_eq!(msg.toggle_reaction(Reaction::Love), None);
    }

    #[test]
    fn test_reaction_parse() {
        assert_eq!("LIKE".parse::<Reaction>().unwrap(), Reaction::Like);
        assert!("meh".parse::<Reaction>().is_err());
    }

    #[test]
    fn test_message_serialize_skips_empty_fields() {
        let json = serde_json::to_string(&Message::bot("hello")).unwrap();
        assert!(json.contains("\"role\":\"bot\""));
        assert!(!json.contains("delivery"));
        assert!(!json.contains("reaction"));
    }

    #[test]
    fn test_message_id_parse() {
        let id = MessageId::new();
        let parsed: MessageId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
