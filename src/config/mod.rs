//! Configuration management
//!
//! This module handles loading and parsing configuration for Galleria.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (Cloudinary credentials override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session lifecycle configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Cloudinary credentials (optional; deletion is disabled without them)
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    /// Initial admin account, created at startup when no users exist
    #[serde(default)]
    pub admin: Option<AdminBootstrapConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path (or `:memory:`)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/galleria.db".to_string()
}

/// Session lifecycle configuration.
///
/// Passed explicitly into the auth service and the request gate so the
/// session state machine stays testable in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Full session lifetime in days
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: i64,
    /// Trailing window, in days, during which a validated session is
    /// extended back out to the full lifetime
    #[serde(default = "default_renewal_days")]
    pub renewal_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            lifetime_days: default_lifetime_days(),
            renewal_days: default_renewal_days(),
        }
    }
}

impl SessionConfig {
    /// Full session lifetime
    pub fn lifetime(&self) -> Duration {
        Duration::days(self.lifetime_days)
    }

    /// Renewal window measured back from expiry
    pub fn renewal_window(&self) -> Duration {
        Duration::days(self.renewal_days)
    }
}

fn default_cookie_name() -> String {
    "auth-session".to_string()
}

fn default_lifetime_days() -> i64 {
    30
}

fn default_renewal_days() -> i64 {
    15
}

/// Cloudinary credentials.
///
/// All three fields are required for image deletion; with any of them
/// missing the system still works but leaves remote images in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
}

/// Fully resolved Cloudinary credentials
#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// Resolve credentials, returning `None` unless all three are set
    pub fn credentials(&self) -> Option<CloudinaryCredentials> {
        Some(CloudinaryCredentials {
            cloud_name: self.cloud_name.clone()?,
            api_key: self.api_key.clone()?,
            api_secret: self.api_secret.clone()?,
        })
    }
}

/// Initial admin account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBootstrapConfig {
    pub username: String,
    pub password: String,
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    /// Cloudinary credentials in the environment override file values.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
                path: path.display().to_string(),
                source: e,
            })?;

            if content.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-variable overrides for Cloudinary credentials
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CLOUDINARY_CLOUD_NAME") {
            self.cloudinary.cloud_name = Some(v);
        }
        if let Ok(v) = std::env::var("CLOUDINARY_API_KEY") {
            self.cloudinary.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("CLOUDINARY_API_SECRET") {
            self.cloudinary.api_secret = Some(v);
        }
    }

    /// Validate cross-field constraints
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.lifetime_days <= 0 {
            return Err(ConfigError::ValidationError(
                "session.lifetime_days must be positive".to_string(),
            ));
        }
        if self.session.renewal_days <= 0 || self.session.renewal_days > self.session.lifetime_days
        {
            return Err(ConfigError::ValidationError(
                "session.renewal_days must be positive and no longer than the lifetime"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
