//! Main chat loop orchestration.
//!
//! Coordinates the conversation lifecycle: sidebar of chats, welcome banner,
//! the input loop, slash commands, upload staging and teardown. Replies
//! arrive asynchronously and are printed by a per-session event follower.

use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use console::style;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use jarvis_core::chat::{ChatSession, LoadOlderOutcome, SendOutcome};
use jarvis_core::history::ChatDirectory;
use jarvis_core::preferences::Preferences;
use jarvis_core::upload::{rejection_notice, UploadStager};
use jarvis_types::event::SessionEvent;
use jarvis_types::history::UNTITLED_CHAT;
use jarvis_types::upload::FileCandidate;

use crate::cli::models::render_table;
use crate::state::AppState;

use super::banner::welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{render_files, render_notification, ChatRenderer};

/// What the input loop should do after a line was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Clear,
    Exit,
}

/// Prints the events of one session until told to follow another.
struct EventFollower<W> {
    out: W,
    json: bool,
    task: Option<JoinHandle<()>>,
}

impl<W: Write + Clone + Send + 'static> EventFollower<W> {
    fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            task: None,
        }
    }

    fn follow(&mut self, session: &ChatSession, renderer: ChatRenderer) {
        self.stop();
        let mut rx = session.subscribe();
        let mut out = self.out.clone();
        let json = self.json;
        self.task = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let line = if json {
                            serde_json::to_string(&event).ok()
                        } else {
                            renderer.render_event(&event)
                        };
                        if let Some(line) = line {
                            if writeln!(out, "{line}").is_err() {
                                break;
                            }
                        }
                        if matches!(event, SessionEvent::Closed) {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event printer fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<W> Drop for EventFollower<W> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Everything the chat loop mutates, independent of the terminal.
pub struct ChatLoop<W> {
    directory: ChatDirectory,
    stager: UploadStager,
    preferences: Preferences,
    renderer: ChatRenderer,
    follower: EventFollower<W>,
    in_flight: JoinSet<()>,
    out: W,
    json: bool,
    data_dir: PathBuf,
}

impl<W: Write + Clone + Send + 'static> ChatLoop<W> {
    /// Build the loop and open the first chat.
    pub fn new(state: AppState, out: W, json: bool) -> Self {
        let AppState {
            data_dir,
            config,
            provider,
            preferences,
        } = state;
        let mut directory = ChatDirectory::new(provider, config.session.clone());
        directory.new_chat();
        Self {
            directory,
            stager: UploadStager::new(config.upload.clone()),
            renderer: ChatRenderer::new(preferences.theme.current()),
            preferences,
            follower: EventFollower::new(out.clone(), json),
            in_flight: JoinSet::new(),
            out,
            json,
            data_dir,
        }
    }

    pub fn directory(&self) -> &ChatDirectory {
        &self.directory
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn stager(&self) -> &UploadStager {
        &self.stager
    }

    pub fn banner(&self) -> String {
        let chat_id = self
            .directory
            .active_item()
            .map(|item| item.id.to_string())
            .unwrap_or_default();
        welcome_banner(
            &self.preferences.models.selected().name,
            &self.preferences.theme.current().to_string(),
            &chat_id,
            &self.data_dir,
        )
    }

    /// Print the active chat and start following its events.
    pub fn show_active(&mut self) -> anyhow::Result<()> {
        let Some(session) = self.directory.active().cloned() else {
            return Ok(());
        };
        let snapshot = session.snapshot();
        if self.json {
            self.say(serde_json::to_string(&snapshot)?)?;
        } else {
            for message in &snapshot.messages {
                let line = self.renderer.render_message(message, None);
                self.say(line)?;
            }
            if let Some(line) = self.renderer.render_quick_replies(&snapshot.quick_replies) {
                self.say(line)?;
            }
        }
        self.follower.follow(&session, self.renderer);
        Ok(())
    }

    /// Handle one line of user input.
    pub async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        self.reap();
        let flow = match commands::parse(line) {
            Some(cmd) => self.handle_command(cmd).await?,
            None => {
                self.send(line.to_string())?;
                Flow::Continue
            }
        };
        self.refresh_titles();
        Ok(flow)
    }

    /// Wait for every spawned send or page load to finish.
    pub async fn settle(&mut self) {
        while self.in_flight.join_next().await.is_some() {}
        self.refresh_titles();
    }

    /// Close every session.
    pub fn shutdown(&mut self) {
        self.follower.stop();
        self.directory.close_all();
        self.in_flight.abort_all();
    }

    fn send(&mut self, text: String) -> anyhow::Result<()> {
        let Some(session) = self.directory.active().cloned() else {
            return Ok(());
        };
        let reply = match session.start_send(&text) {
            Ok(reply) => reply,
            Err(SendOutcome::Ignored) if session.is_awaiting_response() => {
                return self.warn("Still waiting for a reply. Message not sent.");
            }
            Err(outcome) => {
                debug!(?outcome, "message not sent");
                return Ok(());
            }
        };
        if !self.stager.files().is_empty() {
            let count = self.stager.clear();
            self.say(format!(
                "  {}",
                style(format!("{count} file(s) attached")).dim()
            ))?;
        }
        self.in_flight.spawn(async move {
            match reply.await {
                SendOutcome::Failed { error, .. } => debug!(error = %error, "send failed"),
                outcome => debug!(?outcome, "send finished"),
            }
        });
        Ok(())
    }

    async fn handle_command(&mut self, cmd: ChatCommand) -> anyhow::Result<Flow> {
        match cmd {
            ChatCommand::Help => self.say(commands::help_text())?,
            ChatCommand::Clear => return Ok(Flow::Clear),
            ChatCommand::Exit => return Ok(Flow::Exit),

            ChatCommand::Older => {
                if let Some(session) = self.directory.active().cloned() {
                    self.in_flight.spawn(async move {
                        if let LoadOlderOutcome::Failed { error } = session.load_older_messages().await
                        {
                            debug!(error = %error, "history fetch failed");
                        }
                    });
                }
            }

            ChatCommand::React { index, reaction } => {
                let Some(session) = self.directory.active().cloned() else {
                    return Ok(Flow::Continue);
                };
                let target = session.messages().get(index - 1).map(|m| m.id);
                match target.and_then(|id| session.set_reaction(id, reaction)) {
                    Some(_) => {}
                    None => self.warn(format!("No message {index}. See /history."))?,
                }
            }

            ChatCommand::Quick(index) => {
                let Some(session) = self.directory.active().cloned() else {
                    return Ok(Flow::Continue);
                };
                match session.quick_replies().get(index - 1).cloned() {
                    Some(reply) => {
                        self.say(format!("  {} {}", style("You >").green().bold(), reply.text))?;
                        self.in_flight.spawn(async move {
                            session.select_quick_reply(&reply.id).await;
                        });
                    }
                    None => self.warn(format!("No quick reply {index}."))?,
                }
            }

            ChatCommand::Search(query) => {
                let hits = self
                    .directory
                    .active()
                    .map(|s| s.search(&query))
                    .unwrap_or_default();
                if hits.is_empty() {
                    self.say(format!("  {}", style("No matches.").dim()))?;
                }
                for message in &hits {
                    let line = self.renderer.render_message(message, None);
                    self.say(line)?;
                }
            }

            ChatCommand::Model(None) => {
                self.preferences.models.open_selector();
                let table = render_table(&self.preferences.models);
                self.say(table)?;
                self.preferences.models.close_selector();
            }
            ChatCommand::Model(Some(id)) => match self.preferences.models.select(&id) {
                Ok(model) => {
                    let line = format!("  {} {}", style("Model:").bold(), model.name);
                    self.say(line)?;
                }
                Err(e) => self.warn(e)?,
            },

            ChatCommand::Theme(choice) => {
                let theme = match choice {
                    Some(theme) => {
                        self.preferences.theme.set(theme);
                        theme
                    }
                    None => self.preferences.theme.toggle(),
                };
                self.renderer.set_theme(theme);
                if let Some(session) = self.directory.active().cloned() {
                    self.follower.follow(&session, self.renderer);
                }
                self.say(format!("  {} {theme}", style("Theme:").bold()))?;
            }

            ChatCommand::Attach(path) => self.attach(&path).await?,
            ChatCommand::Files => {
                if self.stager.files().is_empty() {
                    self.say(format!("  {}", style("No files staged.").dim()))?;
                } else {
                    self.say(render_files(self.stager.files()))?;
                }
            }
            ChatCommand::Detach(index) => {
                let id = self.stager.files().get(index - 1).map(|f| f.id);
                match id.map(|id| self.stager.remove(id)) {
                    Some(Ok(file)) => {
                        self.say(format!("  {} {}", style("Removed").dim(), file.name))?
                    }
                    _ => self.warn(format!("No staged file {index}."))?,
                }
            }

            ChatCommand::Chats => {
                let list = self
                    .renderer
                    .render_chats(&self.directory.items(), Local::now().date_naive());
                self.say(list)?;
            }
            ChatCommand::New => {
                let id = self.directory.new_chat();
                info!(chat_id = %id, "new chat from the loop");
                self.show_active()?;
            }
            ChatCommand::Switch(index) => {
                match self.directory.items().get(index - 1).map(|i| i.id) {
                    Some(id) => {
                        self.directory.select(id)?;
                        self.show_active()?;
                    }
                    None => self.warn(format!("No chat {index}. See /chats."))?,
                }
            }
            ChatCommand::Delete(index) => {
                let Some(item) = self.directory.items().get(index - 1).cloned() else {
                    self.warn(format!("No chat {index}. See /chats."))?;
                    return Ok(Flow::Continue);
                };
                let notice = self.directory.delete(item.id)?;
                self.say(render_notification(&notice))?;
                if self.directory.is_empty() {
                    self.directory.new_chat();
                }
                if item.is_active {
                    self.show_active()?;
                }
            }
            ChatCommand::History => {
                let messages = self
                    .directory
                    .active()
                    .map(|s| s.messages())
                    .unwrap_or_default();
                let text = self
                    .renderer
                    .render_history(&messages, Local::now().date_naive());
                self.say(text)?;
            }

            ChatCommand::Unknown(msg) => {
                self.say(format!(
                    "  {} {}. Type /help for available commands.",
                    style("?").yellow().bold(),
                    style(msg).dim()
                ))?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn attach(&mut self, path: &Path) -> anyhow::Result<()> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return self.warn(format!("{} is not a file", path.display())),
            Err(e) => return self.warn(format!("Cannot read {}: {e}", path.display())),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let file = match self.stager.stage(FileCandidate::new(name, metadata.len())) {
            Ok(file) => file,
            Err(e) => return self.say(render_notification(&rejection_notice(&e))),
        };

        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/blue} {pos:>3}% {msg}")?
                .progress_chars("=> "),
        );
        bar.set_message(file.name.clone());
        let mut ticks = std::pin::pin!(self.stager.progress());
        while let Some(percent) = ticks.next().await {
            bar.set_position(u64::from(percent));
        }
        bar.finish_and_clear();

        self.say(format!(
            "  {} {} ({:.2} MB)",
            style("Staged").green().bold(),
            file.name,
            file.size_mb()
        ))
    }

    /// Give untitled chats a title once they have a user message.
    fn refresh_titles(&mut self) {
        for item in self.directory.items() {
            if item.title == UNTITLED_CHAT {
                let _ = self.directory.rename_from_first_message(item.id);
            }
        }
    }

    fn reap(&mut self) {
        while self.in_flight.try_join_next().is_some() {}
    }

    fn say(&mut self, text: impl Display) -> anyhow::Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    fn warn(&mut self, text: impl Display) -> anyhow::Result<()> {
        self.say(format!("  {} {text}", style("!").yellow().bold()))
    }
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: AppState, json: bool, quiet: bool) -> anyhow::Result<()> {
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let mut chat = ChatLoop::new(state, writer, json);
    if !json && !quiet {
        let banner = chat.banner();
        chat.say(banner)?;
    }
    chat.show_active()?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                chat.say(format!(
                    "  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                ))?;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }
                match chat.handle_line(&text).await? {
                    Flow::Continue => {}
                    Flow::Clear => chat_input.clear(),
                    Flow::Exit => break,
                }
            }
        }
    }

    chat.shutdown();
    if !quiet {
        chat.say(format!("\n  {}", style("Session ended.").dim()))?;
    }
    chat_input.flush();
    Ok(())
}
