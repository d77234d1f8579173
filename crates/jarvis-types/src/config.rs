//! Global configuration types for Jarvis.
//!
//! `JarvisConfig` represents the top-level `config.toml` that controls
//! session timing, the stub response provider, upload limits and the
//! initial preferences. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Top-level configuration.
///
/// Loaded from `~/.jarvis/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JarvisConfig {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub stub: StubConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    /// Model selected at startup. Falls back to the catalog default when unknown.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Explicit theme choice. When absent the system preference is used.
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// Timing and buffering of a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay before a sent user message is marked delivered.
    #[serde(default = "default_delivered_after_ms")]
    pub delivered_after_ms: u64,

    /// Delay after a bot reply before the user message is marked read.
    #[serde(default = "default_read_after_ms")]
    pub read_after_ms: u64,

    /// Capacity of the session event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// The bot message every new session starts with.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_delivered_after_ms() -> u64 {
    500
}

fn default_read_after_ms() -> u64 {
    1000
}

fn default_event_capacity() -> usize {
    256
}

fn default_greeting() -> String {
    "Hello! I'm your AI assistant. How can I help you today?".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delivered_after_ms: default_delivered_after_ms(),
            read_after_ms: default_read_after_ms(),
            event_capacity: default_event_capacity(),
            greeting: default_greeting(),
        }
    }
}

/// Behaviour of the local stub response provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Probability in `[0, 1]` that a request fails.
    #[serde(default)]
    pub failure_rate: f64,

    /// Number of messages returned per older-history page.
    #[serde(default = "default_history_batch")]
    pub history_batch: usize,

    /// Fixed RNG seed for reproducible replies.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_history_batch() -> usize {
    3
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            failure_rate: 0.0,
            history_batch: default_history_batch(),
            seed: None,
        }
    }
}

/// Limits and pacing for file upload staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Accepted file extensions, including the leading dot.
    #[serde(default = "default_accept")]
    pub accept: Vec<String>,

    /// Percentage added per progress tick.
    #[serde(default = "default_progress_step")]
    pub progress_step: u8,

    #[serde(default = "default_progress_tick_ms")]
    pub progress_tick_ms: u64,
}

fn default_max_size_mb() -> u64 {
    10
}

fn default_accept() -> Vec<String> {
    [".pdf", ".txt", ".doc", ".docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_progress_step() -> u8 {
    10
}

fn default_progress_tick_ms() -> u64 {
    100
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
            accept: default_accept(),
            progress_step: default_progress_step(),
            progress_tick_ms: default_progress_tick_ms(),
        }
    }
}
