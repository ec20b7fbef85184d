//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Downstream URL must be usable, allowlist must compile
//! - Validate addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: SidecarConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::SidecarConfig;
use crate::net::DownstreamTarget;
use crate::routing::PathPattern;

/// One semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("`{}` is not a socket address", value)));
    }
}

pub fn validate_config(config: &SidecarConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.downstream_url.trim().is_empty() {
        errors.push(ValidationError::new("downstream_url", "is required"));
    } else if let Err(e) = DownstreamTarget::parse(&config.downstream_url) {
        errors.push(ValidationError::new("downstream_url", e.to_string()));
    }

    if config.proxy_timeout_ms == Some(0) {
        errors.push(ValidationError::new("proxy_timeout_ms", "must be greater than zero"));
    }

    for (i, skeleton) in config.allowlist.iter().enumerate() {
        if let Err(e) = PathPattern::compile(skeleton) {
            errors.push(ValidationError::new(format!("allowlist[{}]", i), e.to_string()));
        }
    }

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_socket_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "is required when admin is enabled"));
        }
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

    fn valid() -> SidecarConfig {
        let mut config = SidecarConfig::default();
        config.downstream_url = "http://127.0.0.1:9000".into();
        config.allowlist = vec!["/company".into(), "/account/{id}".into()];
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.downstream_url = "https://secure.example".into();
        config.proxy_timeout_ms = Some(0);
        config.allowlist.push("/a/{id}/{id}".into());
        config.listener.bind_address = "nowhere".into();
        config.admin.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "downstream_url",
                "proxy_timeout_ms",
                "allowlist[2]",
                "listener.bind_address",
                "admin.api_key",
            ]
        );
    }

    #[test]
    fn test_missing_downstream() {
        let mut config = valid();
        config.downstream_url = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "downstream_url: is required");
    }
}
