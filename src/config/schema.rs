//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Relay endpoint behaviour.
    pub relay: RelaySettings,

    /// Fallback static file serving for non-relay paths.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "[::]:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "[::]:8080".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Replace the host and/or port part of the bind address.
    ///
    /// IPv6 hosts are bracketed automatically.
    pub fn override_host_port(&mut self, host: Option<&str>, port: Option<u16>) {
        if host.is_none() && port.is_none() {
            return;
        }

        let (current_host, current_port) = split_host_port(&self.bind_address);
        let host = host.map(str::to_string).unwrap_or(current_host);
        let port = port
            .map(|p| p.to_string())
            .unwrap_or(current_port);

        self.bind_address = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
    }
}

fn split_host_port(addr: &str) -> (String, String) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.to_string()),
        None => (addr.to_string(), "8080".to_string()),
    }
}

/// Relay endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Path prefix that identifies relay requests.
    pub path: String,

    /// Upper bound on the outbound fetch, up to response headers.
    pub fetch_timeout_secs: u64,

    /// Prefer piping non-playlist bodies over buffering them.
    pub streaming: bool,

    /// Upstream response headers copied to the client when present.
    pub mirrored_headers: Vec<String>,

    /// User-Agent used when the inbound request carries none.
    pub user_agent: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            path: "/m3u-proxy".to_string(),
            fetch_timeout_secs: 15,
            streaming: true,
            mirrored_headers: [
                "content-type",
                "content-length",
                "content-range",
                "accept-ranges",
                "cache-control",
                "etag",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
            user_agent: concat!("m3u-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RelaySettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Static file fallback configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served for every path the relay does not handle.
    /// When unset, those paths answer 404.
    pub dir: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address, "[::]:8080");
        assert_eq!(config.relay.path, "/m3u-proxy");
        assert_eq!(config.relay.fetch_timeout(), Duration::from_secs(15));
        assert!(config.relay.streaming);
        assert_eq!(config.relay.mirrored_headers.len(), 6);
        assert!(config.static_files.dir.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.relay.path, "/m3u-proxy");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            [relay]
            fetch_timeout_secs = 3
            streaming = false

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.relay.fetch_timeout_secs, 3);
        assert!(!config.relay.streaming);
        assert_eq!(config.relay.path, "/m3u-proxy");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_override_host_port() {
        let mut listener = ListenerConfig::default();
        listener.override_host_port(None, Some(3000));
        assert_eq!(listener.bind_address, "[::]:3000");

        listener.override_host_port(Some("127.0.0.1"), None);
        assert_eq!(listener.bind_address, "127.0.0.1:3000");

        listener.override_host_port(Some("::1"), Some(9000));
        assert_eq!(listener.bind_address, "[::1]:9000");
    }
}
