//! Text rendering of session events and messages.
//!
//! Every function here returns a string so the loop can write it through
//! the readline `SharedWriter` without clobbering the prompt.

use chrono::{Local, NaiveDate};
use console::{style, StyledObject};

use jarvis_core::format::{format_date_label, format_timestamp, group_by_day};
use jarvis_types::event::SessionEvent;
use jarvis_types::history::ChatHistoryItem;
use jarvis_types::message::{DeliveryState, Message, MessageRole, QuickReply, Reaction};
use jarvis_types::notification::Notification;
use jarvis_types::theme::Theme;
use jarvis_types::upload::StagedFile;

/// Display name of the assistant.
pub const BOT_NAME: &str = "Jarvis";

/// Theme-aware styling for chat output.
#[derive(Debug, Clone, Copy)]
pub struct ChatRenderer {
    theme: Theme,
}

impl ChatRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn accent<'a>(&self, text: &'a str) -> StyledObject<&'a str> {
        match self.theme {
            Theme::Dark => style(text).cyan().bold(),
            Theme::Light => style(text).blue().bold(),
        }
    }

    /// Render a live event, or `None` for events with no visible effect.
    pub fn render_event(&self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::MessageAppended { message } => match message.role {
                // The user's own line is already on screen.
                MessageRole::User => None,
                _ => Some(self.render_message(message, None)),
            },
            SessionEvent::HistoryPrepended { count } => Some(format!(
                "  {} {count} older message{} loaded, see /history",
                style("↑").dim(),
                if *count == 1 { "" } else { "s" }
            )),
            SessionEvent::DeliveryAdvanced { state, .. } => {
                Some(format!("  {}", style(delivery_mark(*state)).dim()))
            }
            SessionEvent::ReactionChanged { reaction, .. } => Some(match reaction {
                Some(r) => format!("  {} {}", reaction_icon(*r), style(r).dim()),
                None => format!("  {}", style("reaction cleared").dim()),
            }),
            SessionEvent::QuickRepliesReplaced { replies } => self.render_quick_replies(replies),
            SessionEvent::LoadingOlderChanged { loading: true } => {
                Some(format!("  {}", style("Loading older messages...").dim()))
            }
            SessionEvent::Notification(n) => Some(render_notification(n)),
            SessionEvent::MessageRemoved { .. }
            | SessionEvent::AwaitingResponseChanged { .. }
            | SessionEvent::LoadingOlderChanged { loading: false }
            | SessionEvent::Closed => None,
        }
    }

    /// Render one message. `index` is the 1-based position shown by `/history`.
    pub fn render_message(&self, message: &Message, index: Option<usize>) -> String {
        let number = index
            .map(|i| format!("{} ", style(format!("[{i}]")).dim()))
            .unwrap_or_default();
        let time = style(format_timestamp(&message.timestamp.with_timezone(&Local))).dim();
        let reaction = message
            .reaction
            .map(|r| format!(" {}", reaction_icon(r)))
            .unwrap_or_default();

        if message.is_typing {
            return format!("  {}", style(format!("{BOT_NAME} is typing...")).dim().italic());
        }
        match message.role {
            MessageRole::User => {
                let delivery = message
                    .delivery
                    .map(|d| format!(" {}", style(delivery_mark(d)).dim()))
                    .unwrap_or_default();
                format!(
                    "  {number}{} {time}{delivery}{reaction}\n  {}",
                    style("You").green().bold(),
                    message.content
                )
            }
            MessageRole::Bot => format!(
                "  {number}{} {time}{reaction}\n  {}",
                self.accent(BOT_NAME),
                message.content
            ),
            MessageRole::System => format!(
                "  {number}{} {}{reaction}",
                style("!").red().bold(),
                style(&message.content).red()
            ),
        }
    }

    /// Quick replies as a numbered line, or `None` when there are none.
    pub fn render_quick_replies(&self, replies: &[QuickReply]) -> Option<String> {
        if replies.is_empty() {
            return None;
        }
        let items: Vec<String> = replies
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{} {}", style(format!("[{}]", i + 1)).dim(), r.text))
            .collect();
        Some(format!("  {} {}", style("Quick:").bold(), items.join("  ")))
    }

    /// The conversation with day separators and message numbers.
    pub fn render_history(&self, messages: &[Message], today: NaiveDate) -> String {
        let mut out = String::new();
        for group in group_by_day(messages, today) {
            out.push_str(&format!("\n  {}\n", style(format!("── {} ──", group.label)).dim()));
            for message in group.messages {
                let index = messages.iter().position(|m| m.id == message.id).map(|p| p + 1);
                out.push_str(&self.render_message(message, index));
                out.push('\n');
            }
        }
        out
    }

    pub fn render_chats(&self, items: &[ChatHistoryItem], today: NaiveDate) -> String {
        let mut out = String::new();
        for (i, item) in items.iter().enumerate() {
            let marker = if item.is_active {
                format!("{}", style("●").green())
            } else {
                " ".to_string()
            };
            out.push_str(&format!(
                "  {marker} {} {}  {}\n",
                style(format!("[{}]", i + 1)).dim(),
                item.title,
                style(format_date_label(item.date, today)).dim()
            ));
        }
        out
    }
}

pub fn render_notification(n: &Notification) -> String {
    if n.is_error() {
        format!(
            "  {} {}: {}",
            style("!").red().bold(),
            style(&n.title).red().bold(),
            n.description
        )
    } else {
        format!(
            "  {} {}: {}",
            style("i").blue().bold(),
            style(&n.title).bold(),
            n.description
        )
    }
}

pub fn render_files(files: &[StagedFile]) -> String {
    let mut out = String::new();
    for (i, file) in files.iter().enumerate() {
        out.push_str(&format!(
            "  {} {}  {}\n",
            style(format!("[{}]", i + 1)).dim(),
            file.name,
            style(format!("{:.2} MB", file.size_mb())).dim()
        ));
    }
    out
}

fn delivery_mark(state: DeliveryState) -> &'static str {
    match state {
        DeliveryState::Sent => "✓ sent",
        DeliveryState::Delivered => "✓✓ delivered",
        DeliveryState::Read => "✓✓ read",
    }
}

fn reaction_icon(reaction: Reaction) -> &'static str {
    match reaction {
        Reaction::Like => "👍",
        Reaction::Dislike => "👎",
        Reaction::Love => "❤",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_types::message::MessageId;

    fn renderer() -> ChatRenderer {
        ChatRenderer::new(Theme::Dark)
    }

    #[test]
    fn user_echo_is_suppressed() {
        let event = SessionEvent::MessageAppended {
            message: Message::user("hi"),
        };
        assert!(renderer().render_event(&event).is_none());
    }

    #[test]
    fn bot_and_placeholder_render() {
        let bot = SessionEvent::MessageAppended {
            message: Message::bot("Hello there"),
        };
        assert!(renderer().render_event(&bot).unwrap().contains("Hello there"));

        let typing = SessionEvent::MessageAppended {
            message: Message::typing_placeholder(),
        };
        assert!(renderer().render_event(&typing).unwrap().contains("is typing"));
    }

    #[test]
    fn flag_events_are_silent() {
        let r = renderer();
        assert!(r.render_event(&SessionEvent::AwaitingResponseChanged { awaiting: true }).is_none());
        assert!(r.render_event(&SessionEvent::Closed).is_none());
        assert!(r
            .render_event(&SessionEvent::MessageRemoved {
                message_id: MessageId::new()
            })
            .is_none());
    }

    #[test]
    fn notification_shows_title_and_description() {
        let text = render_notification(&Notification::error("Error", "Failed to get response."));
        assert!(text.contains("Error"));
        assert!(text.contains("Failed to get response."));
    }

    #[test]
    fn quick_replies_are_numbered() {
        let replies = vec![QuickReply::new("a", "Tell me more"), QuickReply::new("b", "Thanks!")];
        let line = renderer().render_quick_replies(&replies).unwrap();
        assert!(line.contains("[1]"));
        assert!(line.contains("Thanks!"));
        assert!(renderer().render_quick_replies(&[]).is_none());
    }

    #[test]
    fn history_numbers_messages_in_log_order() {
        let messages = vec![Message::bot("first"), Message::user("second")];
        let today = Local::now().date_naive();
        let text = renderer().render_history(&messages, today);
        assert!(text.contains("[1]"));
        assert!(text.contains("[2]"));
        assert!(text.find("first").unwrap() < text.find("second").unwrap());
    }
}
