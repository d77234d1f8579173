//! Message search.

use jarvis_types::message::Message;

/// Messages whose content contains `query`, ignoring case.
///
/// Typing placeholders never match. A blank query matches nothing.
pub fn search_messages<'a>(messages: &'a [Message], query: &str) -> Vec<&'a Message> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    messages
        .iter()
        .filter(|m| !m.is_typing && m.content.to_lowercase().contains(&needle))
        .collect()
}
