//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ChurchHubError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_import_config(&settings.import)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(ChurchHubError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(ChurchHubError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ChurchHubError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(ChurchHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ChurchHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.enabled && config.url.is_empty() {
        return Err(ChurchHubError::Config(
            "Redis URL is required when Redis is enabled".to_string()
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(ChurchHubError::Config(
            "Redis TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate bulk import configuration
fn validate_import_config(config: &super::ImportConfig) -> Result<()> {
    let domain = config.synthetic_email_domain.trim();
    if domain.is_empty() || domain.contains('@') || domain.contains(char::is_whitespace) {
        return Err(ChurchHubError::Config(
            format!("Invalid synthetic email domain: {:?}", config.synthetic_email_domain)
        ));
    }

    if config.max_upload_bytes == 0 {
        return Err(ChurchHubError::Config(
            "Max upload size must be greater than 0".to_string()
        ));
    }

    if config.default_role.trim().is_empty() {
        return Err(ChurchHubError::Config(
            "Default member role is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ChurchHubError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ChurchHubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
