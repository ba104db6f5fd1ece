//! Server configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Upper bound on a single evaluation, in milliseconds
    pub evaluation_timeout_ms: u64,

    /// Largest accepted upload body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            evaluation_timeout_ms: 5000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config/server` and `DMNC_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config/server")
    }

    /// Load configuration from the named file (any extension the `config`
    /// crate understands) and `DMNC_*` environment variables
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("DMNC"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to read config: {}", e))?;

        cfg.try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluation_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7777);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.evaluation_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ServerConfig = serde_yaml::from_str("port: 5000\nlog_format: json\n").unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.evaluation_timeout_ms, 5000);
    }

    #[test]
    fn test_server_config_debug_format() {
        let debug_str = format!("{:?}", ServerConfig::default());
        assert!(debug_str.contains("ServerConfig"));
        assert!(debug_str.contains("7777"));
    }
}
