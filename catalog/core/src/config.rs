//! TOML Configuration File Support
//!
//! Centralized configuration loading for the catalog client, supporting a
//! TOML file at `~/.config/anime-catalog/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://api.jikan.moe/v4"
//! timeout_secs = 30
//! user_agent = "anime-catalog/0.1"
//!
//! [connectivity]
//! probe_address = "1.1.1.1:53"
//!
//! [list]
//! prefetch_pages = 1
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientConfig;
use crate::connectivity::DEFAULT_PROBE_ADDRESS;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Catalog API root
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// User agent header
    pub user_agent: Option<String>,
}

/// Connectivity section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityToml {
    /// Address the route probe resolves against
    pub probe_address: Option<String>,
}

/// List section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListToml {
    /// Pages to load when the list is first shown
    pub prefetch_pages: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogToml {
    /// API section
    pub api: ApiToml,

    /// Connectivity section
    pub connectivity: ConnectivityToml,

    /// List section
    pub list: ListToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the catalog client
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// HTTP client settings
    pub client: ClientConfig,

    /// Address the route probe resolves against
    pub probe_address: SocketAddr,

    /// Pages to load when the list is first shown
    pub prefetch_pages: u32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            probe_address: default_probe_address(),
            prefetch_pages: 1,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl CatalogConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check that the resolved values are usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !self.client.base_url.starts_with("http://")
            && !self.client.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.client.base_url
            )));
        }
        if self.client.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.prefetch_pages == 0 {
            return Err(ConfigError::ValidationError(
                "list.prefetch_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_probe_address() -> SocketAddr {
    SocketAddr::from(([1, 1, 1, 1], 53))
}

fn parse_probe_address(value: &str) -> Result<SocketAddr, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!(
            "probe address must be ip:port (e.g. {DEFAULT_PROBE_ADDRESS}), got {value:?}"
        ))
    })
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/anime-catalog/config.toml` or
/// `~/.config/anime-catalog/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("anime-catalog").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resolved values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<CatalogConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the resolved values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<CatalogConfig, ConfigError> {
    let mut config = CatalogConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: CatalogToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut CatalogConfig, toml: &CatalogToml) -> Result<(), ConfigError> {
    if let Some(ref url) = toml.api.base_url {
        config.client.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = toml.api.timeout_secs {
        config.client.timeout = Duration::from_secs(secs);
    }
    if let Some(ref agent) = toml.api.user_agent {
        config.client.user_agent = agent.clone();
    }

    if let Some(ref address) = toml.connectivity.probe_address {
        config.probe_address = parse_probe_address(address)?;
    }

    if let Some(pages) = toml.list.prefetch_pages {
        config.prefetch_pages = pages;
    }

    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut CatalogConfig) -> Result<(), ConfigError> {
    if let Ok(url) = std::env::var("ANIME_CATALOG_BASE_URL") {
        config.client.base_url = url.trim_end_matches('/').to_string();
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("ANIME_CATALOG_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.client.timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring unparsable ANIME_CATALOG_TIMEOUT");
        }
    }
    if let Ok(agent) = std::env::var("ANIME_CATALOG_USER_AGENT") {
        config.client.user_agent = agent;
        config.source = ConfigSource::Env;
    }
    if let Ok(address) = std::env::var("ANIME_CATALOG_PROBE_ADDRESS") {
        config.probe_address = parse_probe_address(&address)?;
        config.source = ConfigSource::Env;
    }

    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Timeout override (seconds)
    pub timeout_secs: Option<u64>,

    /// Prefetch page count override
    pub prefetch_pages: Option<u32>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set timeout override
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set prefetch page count override
    #[must_use]
    pub fn with_prefetch_pages(mut self, pages: u32) -> Self {
        self.prefetch_pages = Some(pages);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut CatalogConfig) {
        if self.base_url.is_some() || self.timeout_secs.is_some() || self.prefetch_pages.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.client.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(secs) = self.timeout_secs {
            config.client.timeout = Duration::from_secs(secs);
        }

        if let Some(pages) = self.prefetch_pages {
            config.prefetch_pages = pages;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
