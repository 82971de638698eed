//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but cannot
//! work. Every problem is reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, StorageBackend};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address: {}", config.listener.bind_address, e),
        ));
    }

    match config.storage.backend {
        StorageBackend::Memory => {}
        StorageBackend::File | StorageBackend::Sqlite => {
            let missing = config
                .storage
                .path
                .as_deref()
                .map(|p| p.trim().is_empty())
                .unwrap_or(true);
            if missing {
                errors.push(ValidationError::new(
                    "storage.path",
                    format!("required for the {} backend", config.storage.backend),
                ));
            }
        }
    }

    if config.storage.backend == StorageBackend::File
        && config.storage.path.as_deref() == Some(":memory:")
    {
        errors.push(ValidationError::new("storage.path", ":memory: is only valid for sqlite"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not one of {}", config.observability.log_level, LOG_LEVELS.join(", ")),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.storage.backend = StorageBackend::File;
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "storage.path",
                "timeouts.request_secs",
                "observability.log_level",
                "security.max_body_size",
            ]
        );
    }

    #[test]
    fn test_storage_path_rules() {
        let mut config = ServiceConfig::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.path = Some(":memory:".into());
        assert!(validate_config(&config).is_ok());

        config.storage.backend = StorageBackend::File;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "storage.path: :memory: is only valid for sqlite");

        config.storage.path = Some("  ".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
