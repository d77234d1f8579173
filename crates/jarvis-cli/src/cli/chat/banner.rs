//! Welcome banner display for chat sessions.

use std::path::Path;

use console::style;

/// The welcome banner shown at the start of a chat session.
pub fn welcome_banner(model: &str, theme: &str, chat_id: &str, data_dir: &Path) -> String {
    let lines = [
        String::new(),
        format!("  * {}", style("Jarvis").cyan().bold()),
        format!("  {}", style("Your AI assistant in the terminal").dim()),
        String::new(),
        format!("  {}  {}", style("Model:").bold(), style(model).dim()),
        format!("  {}  {}", style("Theme:").bold(), style(theme).dim()),
        format!(
            "  {}   {}",
            style("Chat:").bold(),
            style(&chat_id[..8.min(chat_id.len())]).dim()
        ),
        format!("  {}   {}", style("Data:").bold(), style(data_dir.display()).dim()),
        String::new(),
        format!("  {}", style("Type /help for commands, Ctrl+D to exit").dim()),
        format!("  {}", style("---").dim()),
    ];
    lines.join("\n")
}
