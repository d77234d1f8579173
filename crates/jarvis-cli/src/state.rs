//! Application state wiring config, provider and preferences together.

use std::path::PathBuf;
use std::sync::Arc;

use jarvis_core::preferences::Preferences;
use jarvis_core::provider::box_provider::BoxResponseProvider;
use jarvis_core::provider::stub::StubProvider;
use jarvis_types::config::JarvisConfig;
use jarvis_types::theme::Theme;

use crate::config::{load_config, resolve_data_dir};

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub theme: Option<Theme>,
    pub seed: Option<u64>,
    pub failure_rate: Option<f64>,
}

/// Everything a command needs.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: JarvisConfig,
    pub provider: Arc<BoxResponseProvider>,
    pub preferences: Preferences,
}

impl AppState {
    /// Load config, apply overrides and build the response provider.
    pub async fn init(overrides: Overrides) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        Self::from_config(data_dir, config, overrides)
    }

    pub fn from_config(
        data_dir: PathBuf,
        mut config: JarvisConfig,
        overrides: Overrides,
    ) -> anyhow::Result<Self> {
        if let Some(rate) = overrides.failure_rate {
            if !(0.0..=1.0).contains(&rate) {
                anyhow::bail!("--failure-rate must be between 0 and 1, got {rate}");
            }
            config.stub.failure_rate = rate;
        }
        if overrides.seed.is_some() {
            config.stub.seed = overrides.seed;
        }
        if overrides.theme.is_some() {
            config.theme = overrides.theme;
        }

        let mut preferences = Preferences::from_config(&config, detect_system_theme());
        if let Some(model) = &overrides.model {
            preferences.models.select(model)?;
        }

        let provider = Arc::new(BoxResponseProvider::new(StubProvider::new(config.stub.clone())));
        tracing::debug!(data_dir = %data_dir.display(), provider = provider.name(), "app state ready");

        Ok(Self {
            data_dir,
            config,
            provider,
            preferences,
        })
    }
}

/// Best-effort terminal background detection via `COLORFGBG`.
fn detect_system_theme() -> Option<Theme> {
    std::env::var("COLORFGBG").ok().and_then(|v| theme_from_colorfgbg(&v))
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); backgrounds 0-6 and 8 are dark.
fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg <= 6 || bg == 8 { Theme::Dark } else { Theme::Light })
}
