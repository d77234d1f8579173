//! ResponseProvider trait definition.
//!
//! This is the collaborator a chat session calls out to. Uses RPITIT for
//! the async operations; `BoxResponseProvider` adds object safety.

use chrono::{DateTime, Utc};

use jarvis_types::error::ProviderError;
use jarvis_types::message::{Message, QuickReply};

/// Trait for reply backends (the local stub, or a real model behind it).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) for
/// `get_reply` and `fetch_older`.
pub trait ResponseProvider: Send + Sync {
    /// Human-readable provider name (e.g., "stub").
    fn name(&self) -> &str;

    /// Generate the bot reply to a user message.
    fn get_reply(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;

    /// Fetch a page of history strictly older than `before`, oldest first.
    ///
    /// `before` is the timestamp of the earliest message currently in the
    /// log, or `None` for an empty log.
    fn fetch_older(
        &self,
        before: Option<DateTime<Utc>>,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, ProviderError>> + Send;

    /// Suggestions offered after a bot turn. Synchronous and side-effect free.
    fn quick_replies(&self) -> Vec<QuickReply>;
}
