//! The list of conversations, each owning its own `ChatSession`.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use jarvis_types::config::SessionConfig;
use jarvis_types::error::HistoryError;
use jarvis_types::history::{ChatHistoryItem, UNTITLED_CHAT};
use jarvis_types::message::MessageRole;
use jarvis_types::notification::Notification;

use super::title::title_from_message;
use crate::chat::ChatSession;
use crate::provider::box_provider::BoxResponseProvider;

struct ChatEntry {
    item: ChatHistoryItem,
    session: ChatSession,
}

/// Sidebar of conversations. At most one entry is active.
pub struct ChatDirectory {
    provider: Arc<BoxResponseProvider>,
    config: SessionConfig,
    entries: Vec<ChatEntry>,
}

impl ChatDirectory {
    /// An empty directory. New sessions share `provider` and `config`.
    pub fn new(provider: Arc<BoxResponseProvider>, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            entries: Vec::new(),
        }
    }

    /// Create a fresh session, put it at the top and make it active.
    pub fn new_chat(&mut self) -> Uuid {
        self.new_chat_on(Local::now().date_naive())
    }

    /// Same as [`ChatDirectory::new_chat`] with an explicit date.
    pub fn new_chat_on(&mut self, date: NaiveDate) -> Uuid {
        let id = Uuid::now_v7();
        let session = ChatSession::new(Arc::clone(&self.provider), self.config.clone());
        for entry in &mut self.entries {
            entry.item.is_active = false;
        }
        self.entries.insert(
            0,
            ChatEntry {
                item: ChatHistoryItem {
                    id,
                    title: UNTITLED_CHAT.to_string(),
                    date,
                    is_active: true,
                },
                session,
            },
        );
        info!(chat_id = %id, "chat created");
        id
    }

    /// Make the chat with this id the active one.
    pub fn select(&mut self, id: Uuid) -> Result<&ChatSession, HistoryError> {
        let index = self.index_of(id)?;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.item.is_active = i == index;
        }
        debug!(chat_id = %id, "chat selected");
        Ok(&self.entries[index].session)
    }

    /// Remove a chat and close its session.
    ///
    /// Deleting the active chat activates the first remaining one.
    pub fn delete(&mut self, id: Uuid) -> Result<Notification, HistoryError> {
        let index = self.index_of(id)?;
        let removed = self.entries.remove(index);
        removed.session.close();
        if removed.item.is_active {
            if let Some(first) = self.entries.first_mut() {
                first.item.is_active = true;
            }
        }
        info!(chat_id = %id, "chat deleted");
        Ok(Notification::info("Chat deleted", "Your chat has been deleted."))
    }

    pub fn active(&self) -> Option<&ChatSession> {
        self.entries
            .iter()
            .find(|e| e.item.is_active)
            .map(|e| &e.session)
    }

    pub fn active_item(&self) -> Option<&ChatHistoryItem> {
        self.entries.iter().map(|e| &e.item).find(|item| item.is_active)
    }

    pub fn session(&self, id: Uuid) -> Option<&ChatSession> {
        self.entries
            .iter()
            .find(|e| e.item.id == id)
            .map(|e| &e.session)
    }

    /// Sidebar entries, newest first.
    pub fn items(&self) -> Vec<ChatHistoryItem> {
        self.entries.iter().map(|e| e.item.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Title an untitled chat after its first user message.
    ///
    /// Returns `Ok(true)` when the title changed. Chats that already have a
    /// title, or no user message yet, are left alone.
    pub fn rename_from_first_message(&mut self, id: Uuid) -> Result<bool, HistoryError> {
        let index = self.index_of(id)?;
        let entry = &mut self.entries[index];
        if entry.item.title != UNTITLED_CHAT {
            return Ok(false);
        }
        let first_user = entry
            .session
            .messages()
            .into_iter()
            .find(|m| m.role == MessageRole::User);
        let Some(title) = first_user.and_then(|m| title_from_message(&m.content)) else {
            return Ok(false);
        };
        debug!(chat_id = %id, title = %title, "chat renamed");
        entry.item.title = title;
        Ok(true)
    }

    /// Close every session.
    pub fn close_all(&self) {
        for entry in &self.entries {
            entry.session.close();
        }
    }

    fn index_of(&self, id: Uuid) -> Result<usize, HistoryError> {
        self.entries
            .iter()
            .position(|e| e.item.id == id)
            .ok_or(HistoryError::NotFound)
    }
}

impl std::fmt::Debug for ChatDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDirectory")
            .field("items", &self.items())
            .finish()
    }
}
