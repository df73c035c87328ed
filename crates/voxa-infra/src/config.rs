//! Configuration loader for Voxa.
//!
//! Reads `config.toml` from the data directory (`~/.voxa/` in production)
//! and deserializes it into [`AssistantConfig`]. Falls back to sensible
//! defaults when the file is missing or malformed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use voxa_types::config::AssistantConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "VOXA_DATA_DIR";

/// Resolve the data directory.
///
/// Priority: `VOXA_DATA_DIR`, then `~/.voxa`, then `.voxa` in the
/// current directory.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var_os(DATA_DIR_ENV), dirs::home_dir())
}

fn data_dir_from(overridden: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = overridden.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = home {
        return home.join(".voxa");
    }

    PathBuf::from(".voxa")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AssistantConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AssistantConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AssistantConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AssistantConfig::default();
        }
    };

    match toml::from_str::<AssistantConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AssistantConfig::default()
        }
    }
}
