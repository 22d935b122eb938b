//! User configuration
//!
//! Read from `<config dir>/chatmark/config.toml` unless a path is given.
//! A missing file means defaults; a present but broken file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use chatmark_core::ColorConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub colors: ColorConfig,
    pub provider: ProviderConfig,
}

/// Defaults for `chatmark request`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: Option<String>,
    #[serde(alias = "baseUrl")]
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Seconds
    pub timeout: Option<u64>,
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match default_config_path() {
                Some(path) => Self::load_from_path(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatmark").join("config.toml"))
}
