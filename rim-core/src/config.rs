//! Configuration management for rim
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (RIM_*)
//! 3. Config file (~/.config/rim/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::resolve::{RemoteResolver, GERRIT_PUSH_REF_FORMAT, GERRIT_SERVER};
use crate::{Error, Result};

/// Review server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Prefix that relative remotes are resolved against
    pub url: String,

    /// Push-ref format for remotes on this server
    pub push_ref_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: GERRIT_SERVER.to_string(),
            push_ref_format: GERRIT_PUSH_REF_FORMAT.to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Review server configuration
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/rim/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rim").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - RIM_SERVER_URL: Review server prefix
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("RIM_SERVER_URL") {
            self.server.url = url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url {
            self.server.url = url;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(server_url: Option<String>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(server_url))
    }

    /// Remote resolver for the configured server
    pub fn remote_resolver(&self) -> RemoteResolver {
        RemoteResolver::new(self.server.url.clone())
            .with_push_ref_format(self.server.push_ref_format.clone())
    }
}
