//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub enabled: bool,
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Bulk member import configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Domain used when a synthetic email has to be generated for a row
    pub synthetic_email_domain: String,
    /// Pause between rows so the dashboard can render progress
    pub row_delay_ms: u64,
    pub max_upload_bytes: usize,
    pub default_role: String,
    /// Number of rows returned by the preview endpoint
    pub preview_rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub json: bool,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub donations: bool,
    pub bulk_import: bool,
    /// Requests per minute across the API; 0 turns limiting off
    pub rate_limit_per_minute: u32,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load("config")
    }

    /// Like [`Settings::new`] but reading `config_path` (extension optional)
    pub fn load(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CHURCHHUB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ChurchHubError> {
        super::validation::validate_settings(self)
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/churchhub".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                enabled: false,
                url: "redis://localhost:6379".to_string(),
                prefix: "churchhub:".to_string(),
                ttl_seconds: 3600,
            },
            import: ImportConfig {
                synthetic_email_domain: "church.local".to_string(),
                row_delay_ms: 0,
                max_upload_bytes: 5 * 1024 * 1024,
                default_role: "member".to_string(),
                preview_rows: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
                json: false,
            },
            features: FeaturesConfig {
                donations: true,
                bulk_import: true,
                rate_limit_per_minute: 600,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.bind_address(), "127.0.0.1:8080");
        assert_eq!(settings.import.default_role, "member");
    }
}
