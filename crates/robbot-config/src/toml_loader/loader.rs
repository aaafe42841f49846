//! Core TOML settings loading: read from path or platform default.

use robbot_common::ConfigError;
use std::path::Path;
use tracing::{debug, info};

use crate::schema::ChatSettings;

use super::paths::default_config_path;

/// Load settings from a specific TOML file path.
///
/// Missing fields take their serde defaults. The result is not validated;
/// callers apply overrides first and then run [`crate::validate`].
pub fn load_from_path(path: &Path) -> Result<ChatSettings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let settings: ChatSettings = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(settings)
}

/// Load settings from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/robbot/config.toml`
/// On Linux: `~/.config/robbot/config.toml`
///
/// A missing file is not an error: built-in defaults are returned.
pub fn load_default() -> Result<ChatSettings, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(settings) => Ok(settings),
        Err(ConfigError::FileNotFound(_)) => {
            debug!("no config found at {}, using defaults", path.display());
            Ok(ChatSettings::default())
        }
        Err(e) => Err(e),
    }
}
