//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`. Indices given by the user are 1-based, as
//! printed by `/history`, `/chats`, `/files` and the quick-reply line.

use std::path::PathBuf;

use console::style;

use jarvis_types::message::Reaction;
use jarvis_types::theme::Theme;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Load the previous page of history.
    Older,
    /// Toggle a reaction on the n-th message.
    React { index: usize, reaction: Reaction },
    /// Send the n-th quick reply.
    Quick(usize),
    /// Search the active conversation.
    Search(String),
    /// Show the model list, or select a model.
    Model(Option<String>),
    /// Toggle the theme, or set it.
    Theme(Option<Theme>),
    /// Stage a file for upload.
    Attach(PathBuf),
    /// List staged files.
    Files,
    /// Unstage the n-th file.
    Detach(usize),
    /// List conversations.
    Chats,
    /// Start a new conversation.
    New,
    /// Switch to the n-th conversation.
    Switch(usize),
    /// Delete the n-th conversation.
    Delete(usize),
    /// Show the active conversation.
    History,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat.
    Exit,
    /// Unknown command or bad arguments; carries the message to show.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts
        .get(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/older" => ChatCommand::Older,
        "/react" => parse_react(arg.as_deref()),
        "/quick" | "/qr" => index_arg(arg.as_deref(), "/quick <n>", ChatCommand::Quick),
        "/search" | "/find" => match arg {
            Some(query) => ChatCommand::Search(query),
            None => usage("/search <query>"),
        },
        "/model" => ChatCommand::Model(arg),
        "/theme" => match arg.as_deref().map(str::parse::<Theme>) {
            None => ChatCommand::Theme(None),
            Some(Ok(theme)) => ChatCommand::Theme(Some(theme)),
            Some(Err(_)) => usage("/theme [light|dark]"),
        },
        "/attach" => match arg {
            Some(path) => ChatCommand::Attach(PathBuf::from(path)),
            None => usage("/attach <path>"),
        },
        "/files" => ChatCommand::Files,
        "/detach" => index_arg(arg.as_deref(), "/detach <n>", ChatCommand::Detach),
        "/chats" => ChatCommand::Chats,
        "/new" => ChatCommand::New,
        "/switch" => index_arg(arg.as_deref(), "/switch <n>", ChatCommand::Switch),
        "/delete" => index_arg(arg.as_deref(), "/delete <n>", ChatCommand::Delete),
        "/history" => ChatCommand::History,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        other => ChatCommand::Unknown(format!("Unknown command: {other}")),
    };
    Some(command)
}

fn usage(text: &str) -> ChatCommand {
    ChatCommand::Unknown(format!("Usage: {text}"))
}

fn index_arg(arg: Option<&str>, text: &str, build: fn(usize) -> ChatCommand) -> ChatCommand {
    match arg.and_then(|a| a.parse::<usize>().ok()).filter(|n| *n > 0) {
        Some(n) => build(n),
        None => usage(text),
    }
}

fn parse_react(arg: Option<&str>) -> ChatCommand {
    const USAGE: &str = "/react <n> <like|dislike|love>";
    let Some(arg) = arg else {
        return usage(USAGE);
    };
    let mut words = arg.split_whitespace();
    let index = words.next().and_then(|w| w.parse::<usize>().ok()).filter(|n| *n > 0);
    let reaction = words.next().and_then(|w| w.parse::<Reaction>().ok());
    match (index, reaction, words.next()) {
        (Some(index), Some(reaction), None) => ChatCommand::React { index, reaction },
        _ => usage(USAGE),
    }
}

/// Help text listing all available commands.
pub fn help_text() -> String {
    let rows: [(&str, &str); 18] = [
        ("/help", "Show this help message"),
        ("/older", "Load older messages"),
        ("/react <n> <kind>", "Toggle like, dislike or love on message n"),
        ("/quick <n>", "Send quick reply n"),
        ("/search <q>", "Search this conversation"),
        ("/model [id]", "List models, or select one"),
        ("/theme [light|dark]", "Toggle or set the theme"),
        ("/attach <path>", "Stage a file for upload"),
        ("/files", "List staged files"),
        ("/detach <n>", "Unstage file n"),
        ("/chats", "List conversations"),
        ("/new", "Start a new conversation"),
        ("/switch <n>", "Switch to conversation n"),
        ("/delete <n>", "Delete conversation n"),
        ("/history", "Show this conversation"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat"),
        ("Ctrl+D", "Exit"),
    ];
    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (cmd, what) in rows {
        out.push_str(&format!("  {:<22}{}\n", style(cmd).cyan(), what));
    }
    out
}
