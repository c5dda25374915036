//! Configuration validation

use super::*;
use crate::error::{GatewayError, Result};

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_completion_config(&config.completion)?;
    validate_server_config(&config.server)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validate upstream API configuration
fn validate_completion_config(config: &CompletionConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(GatewayError::Config(
            "Completion API URL cannot be empty".to_string()
        ));
    }

    if !config.api_url.starts_with("http://") && !config.api_url.starts_with("https://") {
        return Err(GatewayError::Config(
            "Completion API URL must start with http:// or https://".to_string()
        ));
    }

    if config.model.trim().is_empty() {
        return Err(GatewayError::Config(
            "Model identifier cannot be empty".to_string()
        ));
    }

    if config.instruction.trim().is_empty() {
        return Err(GatewayError::Config(
            "Instruction text cannot be empty".to_string()
        ));
    }

    // The credential itself is read per request, only the variable name is checked here
    if config.api_key_env.trim().is_empty() {
        return Err(GatewayError::Config(
            "API key environment variable name cannot be empty".to_string()
        ));
    }

    Ok(())
}

/// Validate server configuration
pub fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(GatewayError::Config(
            "Server port cannot be 0".to_string()
        ));
    }

    if config.host.is_empty() {
        return Err(GatewayError::Config(
            "Server host cannot be empty".to_string()
        ));
    }

    if config.max_body_size_mb == 0 {
        return Err(GatewayError::Config(
            "Max body size must be greater than 0".to_string()
        ));
    }

    if config.max_body_size_mb > 100 {
        return Err(GatewayError::Config(
            "Max body size too large (max: 100 MB)".to_string()
        ));
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    match config.format.as_str() {
        "json" | "compact" | "pretty" => Ok(()),
        other => Err(GatewayError::Config(
            format!("Unknown log format '{}' (expected json, compact or pretty)", other)
        )),
    }
}
