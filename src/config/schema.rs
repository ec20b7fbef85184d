//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the sidecar.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SidecarConfig {
    /// Service name used in diagnostics and the admin API.
    pub service_name: String,

    /// Base address all admitted requests are forwarded to.
    pub downstream_url: String,

    /// Dial timeout for downstream connections, in milliseconds.
    pub proxy_timeout_ms: Option<u64>,

    /// Access log file. Absent disables the access log.
    pub access_file: Option<String>,

    /// Error log file. Absent disables the error log.
    pub error_file: Option<String>,

    /// Prefix written at the start of every access/error line.
    pub log_prefix: String,

    /// Path skeletons, e.g. `/account/{id}/user`.
    pub allowlist: Vec<String>,

    pub listener: ListenerConfig,

    pub rewrite: RewriteConfig,

    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

impl SidecarConfig {
    pub fn proxy_timeout(&self) -> Option<Duration> {
        self.proxy_timeout_ms.map(Duration::from_millis)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Optional request rewrites. Everything is off by default.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RewriteConfig {
    /// Add `X-Forwarded-Host` and `X-Origin-Host` to forwarded requests.
    pub forwarded_host_headers: bool,

    /// Prefix prepended to the forwarded path.
    pub path_prefix: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: SidecarConfig = toml::from_str(r#"downstream_url = "http://127.0.0.1:9000""#).unwrap();
        assert_eq!(config.downstream_url, "http://127.0.0.1:9000");
        assert!(config.allowlist.is_empty());
        assert!(config.access_file.is_none());
        assert!(config.proxy_timeout().is_none());
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(!config.rewrite.forwarded_host_headers);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_full_config() {
        let config: SidecarConfig = toml::from_str(
            r#"
            service_name = "accounts-sidecar"
            downstream_url = "http://10.0.0.5:8000/api"
            proxy_timeout_ms = 2500
            access_file = "/var/log/sidecar/access.log"
            error_file = "/var/log/sidecar/error.log"
            log_prefix = "[accounts]"
            allowlist = ["/company", "/account/{id}/user"]

            [listener]
            bind_address = "0.0.0.0:7000"

            [rewrite]
            forwarded_host_headers = true

            [admin]
            enabled = true
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.service_name, "accounts-sidecar");
        assert_eq!(config.proxy_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.allowlist.len(), 2);
        assert_eq!(config.listener.bind_address, "0.0.0.0:7000");
        assert!(config.rewrite.forwarded_host_headers);
        assert!(config.rewrite.path_prefix.is_none());
        assert_eq!(config.admin.bind_address, "127.0.0.1:8081");
    }
}
