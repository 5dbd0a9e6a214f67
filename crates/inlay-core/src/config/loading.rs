//! Configuration loading.
//!
//! Configuration is loaded in the following order (later sources override
//! earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.inlay/config.toml`
//!
//! A missing config file is expected and falls back to defaults; a config
//! file that exists but cannot be read or parsed is an error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::InlayConfig;
use crate::errors::InlayError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: String, message: String },
}

impl InlayError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ReadFailed { .. } => "CONFIG_READ_FAILED",
            ConfigError::ParseFailed { .. } => "CONFIG_PARSE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ConfigError::ParseFailed { .. })
    }
}

/// Load the user configuration, falling back to defaults when no config
/// file exists.
pub fn load_config() -> Result<InlayConfig, ConfigError> {
    let Some(path) = user_config_path() else {
        debug!(event = "core.config.no_home_dir_using_defaults");
        return Ok(InlayConfig::default());
    };

    if !path.exists() {
        debug!(event = "core.config.file_missing_using_defaults", path = %path.display());
        return Ok(InlayConfig::default());
    }

    load_config_file(&path)
}

/// Path of the user config file, `~/.inlay/config.toml`.
fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".inlay").join("config.toml"))
}

/// Load and parse a configuration file from the given path.
fn load_config_file(path: &Path) -> Result<InlayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let config: InlayConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(event = "core.config.loaded", path = %path.display());
    Ok(config)
}
