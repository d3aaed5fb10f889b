//! Widget Configuration
//!
//! Deployment-time settings for the chat widget, loaded from a TOML file at
//! `~/.config/portfolio-chat/widget.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [chat]
//! api_url = "https://api.example.dev"
//!
//! [session]
//! cookie_name = "chatid"
//! max_age_days = 365
//! ip_lookup_url = "https://api.ipify.org?format=json"
//!
//! [animation]
//! duration_ms = 400
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::DEFAULT_ANIMATION;
use crate::session::DEFAULT_LOOKUP_URL;

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

/// Tracks where the configuration came from
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

/// `[chat]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Base address of the chat and content API
    pub api_url: Option<String>,

    /// Transport timeout for chat requests, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// `[session]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Storage key of the identifier
    pub cookie_name: Option<String>,

    /// Path scope of the identifier
    pub cookie_path: Option<String>,

    /// Lifetime of the identifier in days
    pub max_age_days: Option<u32>,

    /// User agent mixed into new identifiers
    pub user_agent: Option<String>,

    /// Address lookup endpoint
    pub ip_lookup_url: Option<String>,

    /// Backing file of the session store
    pub store_path: Option<PathBuf>,
}

/// `[animation]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Open/close animation length in milliseconds
    pub duration_ms: Option<u64>,
}

/// Complete TOML file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetToml {
    /// Chat endpoint settings
    pub chat: ChatToml,
    /// Session identifier settings
    pub session: SessionToml,
    /// Animation settings
    pub animation: AnimationToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Chat endpoint settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base address; requests go to `{api_url}/api/chat`
    pub api_url: String,
    /// Transport timeout (none by default)
    pub request_timeout: Option<Duration>,
}

/// Session identifier settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Storage key
    pub cookie_name: String,
    /// Path scope
    pub cookie_path: String,
    /// Lifetime in days
    pub max_age_days: u32,
    /// User agent override
    pub user_agent: Option<String>,
    /// Address lookup endpoint
    pub ip_lookup_url: String,
    /// Session store file (platform data directory when unset)
    pub store_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "chatid".to_string(),
            cookie_path: "/".to_string(),
            max_age_days: 365,
            user_agent: None,
            ip_lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            store_path: None,
        }
    }
}

/// Resolved widget configuration
#[derive(Clone, Debug)]
pub struct WidgetConfig {
    /// Chat endpoint settings
    pub chat: ChatConfig,
    /// Session identifier settings
    pub session: SessionConfig,
    /// Open/close animation length
    pub animation: Duration,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig::default(),
            session: SessionConfig::default(),
            animation: DEFAULT_ANIMATION,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl WidgetConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the widget misbehave
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        if !self.session.cookie_path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "session.cookie_path must start with '/', got {:?}",
                self.session.cookie_path
            )));
        }
        if self.session.max_age_days == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_age_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/portfolio-chat/widget.toml` or
/// `~/.config/portfolio-chat/widget.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("portfolio-chat").join("widget.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<WidgetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// Reads the file synchronously. Call it once at startup, before the event
/// loop runs; async code should not call it.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<WidgetConfig, ConfigError> {
    let mut config = WidgetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: WidgetToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
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

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut WidgetConfig, toml: &WidgetToml) {
    if let Some(ref url) = toml.chat.api_url {
        config.chat.api_url = normalize_base(url);
    }
    if let Some(secs) = toml.chat.request_timeout_secs {
        config.chat.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    if let Some(ref name) = toml.session.cookie_name {
        config.session.cookie_name = name.clone();
    }
    if let Some(ref path) = toml.session.cookie_path {
        config.session.cookie_path = path.clone();
    }
    if let Some(days) = toml.session.max_age_days {
        config.session.max_age_days = days;
    }
    if toml.session.user_agent.is_some() {
        config.session.user_agent = toml.session.user_agent.clone();
    }
    if let Some(ref url) = toml.session.ip_lookup_url {
        config.session.ip_lookup_url = url.clone();
    }
    if toml.session.store_path.is_some() {
        config.session.store_path = toml.session.store_path.clone();
    }

    if let Some(ms) = toml.animation.duration_ms {
        config.animation = Duration::from_millis(ms);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut WidgetConfig) {
    if let Ok(url) = std::env::var("PORTFOLIO_API_URL") {
        config.chat.api_url = normalize_base(&url);
        config.source = ConfigSource::Env;
    }
    if let Ok(url) = std::env::var("PORTFOLIO_IP_LOOKUP_URL") {
        config.session.ip_lookup_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(ms) = std::env::var("PORTFOLIO_ANIMATION_MS") {
        if let Ok(ms) = ms.parse::<u64>() {
            config.animation = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(agent) = std::env::var("PORTFOLIO_USER_AGENT") {
        config.session.user_agent = Some(agent);
        config.source = ConfigSource::Env;
    }
    if let Ok(path) = std::env::var("PORTFOLIO_STORE_PATH") {
        config.session.store_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

/// Strip trailing slashes so `{base}/api/chat` never doubles them
fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Values supplied on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Chat/content API base address
    pub api_url: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the API base address
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Apply the overrides (highest priority)
    pub fn apply(&self, config: &mut WidgetConfig) {
        if let Some(ref url) = self.api_url {
            config.chat.api_url = normalize_base(url);
            config.source = ConfigSource::Cli;
        }
    }
}
