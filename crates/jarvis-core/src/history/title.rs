//! Automatic chat titles.

/// Longest title derived from a message, in characters, before the ellipsis.
pub const MAX_TITLE_CHARS: usize = 40;

/// Derive a sidebar title from the first user message.
///
/// Runs of whitespace collapse to single spaces. Titles longer than
/// [`MAX_TITLE_CHARS`] are cut and end in an ellipsis. Returns `None` for
/// blank input.
pub fn title_from_message(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() <= MAX_TITLE_CHARS {
        return Some(collapsed);
    }
    let cut: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();
    Some(format!("{}…", cut.trim_end()))
}
