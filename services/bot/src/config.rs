use afkbot_transport::{AuthMode, SessionConfig};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Every variable has a literal default; nothing is required.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub version: String,
    pub online_mode: bool,
    pub http_port: u16,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let host = std::env::var("MC_SERVER_HOST").unwrap_or_else(|_| "localhost".to_string());

        let port = parse_port("MC_SERVER_PORT", 19132)?;
        let http_port = parse_port("PORT", 3000)?;

        let username = std::env::var("BOT_USERNAME").unwrap_or_else(|_| "AFKBot".to_string());
        let version = std::env::var("MC_VERSION").unwrap_or_else(|_| "1.21.100".to_string());

        let online_mode = std::env::var("BOT_ONLINE_MODE")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            host,
            port,
            username,
            version,
            online_mode,
            http_port,
            log_level,
        })
    }

    /// Builds the immutable session parameters handed to the protocol backend.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            auth: if self.online_mode {
                AuthMode::Online
            } else {
                AuthMode::Offline
            },
            version: self.version.clone(),
        }
    }
}

fn parse_port(var: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
