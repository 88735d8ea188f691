//! Configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`AppConfig`]. Falls back to defaults when the file is missing or
//! malformed, so a bare deployment still comes up.

use secrecy::SecretString;

use std::path::Path;

use banterline_types::config::{AppConfig, ModelConfig};

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the
///   default.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Read the model API key from the configured environment variable.
///
/// The key is wrapped immediately so it never sits in a plain `String`.
pub fn api_key_from_env(model: &ModelConfig) -> Option<SecretString> {
    std::env::var(&model.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}

/// The data directory, from `BANTERLINE_DATA_DIR` or `~/.banterline`.
pub fn default_data_dir() -> std::path::PathBuf {
    match std::env::var("BANTERLINE_DATA_DIR") {
        Ok(dir) => std::path::PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            std::path::PathBuf::from(home).join(".banterline")
        }
    }
}
