//! User preferences passed explicitly to whoever needs them.
//!
//! `Preferences` bundles the model catalog and the theme state. There is no
//! global instance; the CLI owns one in its app state.

pub mod model;
pub mod theme;

pub use model::ModelCatalog;
pub use theme::ThemeState;

use jarvis_types::config::JarvisConfig;
use jarvis_types::theme::Theme;
use tracing::warn;

/// Model selection and colour scheme.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    pub models: ModelCatalog,
    pub theme: ThemeState,
}

impl Preferences {
    /// Build preferences from config plus the detected system theme.
    ///
    /// An unknown `default_model` is logged and the catalog default kept.
    pub fn from_config(config: &JarvisConfig, system: Option<Theme>) -> Self {
        let mut models = ModelCatalog::new();
        if let Some(id) = &config.default_model {
            if let Err(e) = models.select(id) {
                warn!(error = %e, "ignoring configured default model");
            }
        }
        Self {
            models,
            theme: ThemeState::new(config.theme, system),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let prefs = Preferences::from_config(&JarvisConfig::default(), None);
        assert_eq!(prefs.models.selected().id, "gpt-4o-mini");
        assert_eq!(prefs.theme.current(), Theme::Light);
    }

    #[test]
    fn test_from_config_overrides() {
        let config = JarvisConfig {
            default_model: Some("claude-3-opus".to_string()),
            theme: Some(Theme::Dark),
            ..JarvisConfig::default()
        };
        let prefs = Preferences::from_config(&config, Some(Theme::Light));
        assert_eq!(prefs.models.selected().id, "claude-3-opus");
        assert_eq!(prefs.theme.current(), Theme::Dark);
        assert!(prefs.theme.is_explicit());
    }

    #[test]
    fn test_unknown_default_model_falls_back() {
        let config = JarvisConfig {
            default_model: Some("gpt-9".to_string()),
            ..JarvisConfig::default()
        };
        let prefs = Preferences::from_config(&config, None);
        assert_eq!(prefs.models.selected().id, "gpt-4o-mini");
    }
}
