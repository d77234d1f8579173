//! Configuration loading for the `jarvis` binary.
//!
//! Reads `config.toml` from the data directory (`~/.jarvis/` unless
//! `JARVIS_DATA_DIR` is set) into [`JarvisConfig`]. Falls back to defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use jarvis_types::config::JarvisConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "JARVIS_DATA_DIR";

/// Resolve the data directory.
///
/// Priority: `JARVIS_DATA_DIR`, then `~/.jarvis`, then `./.jarvis`.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from), dirs::home_dir())
}

fn data_dir_from(env_override: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    match home {
        Some(home) => home.join(".jarvis"),
        None => PathBuf::from(".jarvis"),
    }
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`JarvisConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> JarvisConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return JarvisConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return JarvisConfig::default();
        }
    };

    match toml::from_str::<JarvisConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            JarvisConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_types::theme::Theme;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.session.delivered_after_ms, 500);
        assert!(config.default_model.is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
default_model = "gpt-4o"
theme = "dark"

[stub]
min_delay_ms = 5
max_delay_ms = 10
failure_rate = 0.25

[upload]
max_size_mb = 2
accept = [".md"]
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.default_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.theme, Some(Theme::Dark));
        assert_eq!(config.stub.max_delay_ms, 10);
        assert!((config.stub.failure_rate - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.upload.accept, vec![".md".to_string()]);
        assert_eq!(config.session.read_after_ms, 1000);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.stub.min_delay_ms, 1000);
    }

    #[test]
    fn data_dir_prefers_env_override() {
        let dir = data_dir_from(Some(PathBuf::from("/tmp/j")), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/tmp/j"));
    }

    #[test]
    fn data_dir_falls_back_to_home() {
        let dir = data_dir_from(Some(PathBuf::new()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.jarvis"));
        assert_eq!(data_dir_from(None, None), PathBuf::from(".jarvis"));
    }
}
