//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `deckhand.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote store connection settings.
    pub connection: ConnectionConfig,
    /// Page layout settings.
    pub layout: LayoutConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Demo-mode toggle.
    pub demo: DemoConfig,
}

/// Remote store connection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// WebSocket endpoint of the remote store.
    pub url: String,
    /// Long-lived access token.
    pub token: String,
}

/// Page layout configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Path to the YAML page layout.
    pub path: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Demo mode: drive a scripted session instead of connecting.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Run the scripted demo and exit.
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `deckhand.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("deckhand.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DECKHAND_URL") {
            self.connection.url = val;
        }
        if let Ok(val) = std::env::var("DECKHAND_TOKEN") {
            self.connection.token = val;
        }
        if let Ok(val) = std::env::var("DECKHAND_LAYOUT") {
            self.layout.path = val;
        }
        if let Ok(val) = std::env::var("DECKHAND_DEMO") {
            self.demo.enabled = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("DECKHAND_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.url.is_empty() {
            return Err(ConfigError::Validation(
                "connection.url must not be empty".to_string(),
            ));
        }
        if !self.demo.enabled && self.connection.token.is_empty() {
            return Err(ConfigError::Validation(
                "connection.token is required outside demo mode".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://homeassistant.local:8123/api/websocket".to_string(),
            token: String::new(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            path: "deckhand.yaml".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "deckhandd=info,deckhand=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
