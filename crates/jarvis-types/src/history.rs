//! Chat history sidebar entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a chat before its first user message.
pub const UNTITLED_CHAT: &str = "New chat";

/// A conversation as listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryItem {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_item_serialize() {
        let item = ChatHistoryItem {
            id: Uuid::now_v7(),
            title: "Project ideas".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            is_active: false,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"date\":\"2025-04-15\""));
    }
}
