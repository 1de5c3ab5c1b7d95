//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the listener bind address.
pub const ENV_LISTEN_ADDR: &str = "GATEWAY_LISTEN_ADDR";
/// Overrides the user-management service URL.
pub const ENV_USER_MANAGEMENT_URL: &str = "GATEWAY_USER_MANAGEMENT_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    let config = apply_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply overrides from a key lookup (the process environment in production).
pub fn apply_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
        config.listener.bind_address = addr;
    }
    if let Some(url) = lookup(ENV_USER_MANAGEMENT_URL) {
        config.backend.user_management_url = url;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let config = parse_config(
            r#"
            [backend]
            user_management_url = "http://from-file:5202"
            "#,
        )
        .unwrap();

        let config = apply_overrides(config, |key| match key {
            ENV_USER_MANAGEMENT_URL => Some("http://from-env:5202".to_string()),
            _ => None,
        });

        assert_eq!(config.backend.user_management_url, "http://from-env:5202");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_parse_error_reported() {
        let err = parse_config("[backend\nuser_management_url = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "timeouts.request_secs",
                reason: "must be > 0".into(),
            },
            ValidationError {
                field: "security.max_body_size",
                reason: "must be > 0".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs: must be > 0, security.max_body_size: must be > 0"
        );
    }
}
