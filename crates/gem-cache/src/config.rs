//! Configuration loading and validation

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use gem_proxy::UpstreamClientConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Upstream gem server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Upstream used for requests without a `/redirect/` or `/upstream/` prefix
    #[serde(default = "default_upstream_url")]
    pub default_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub skip_tls_verify: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            default_url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
            skip_tls_verify: false,
        }
    }
}

impl UpstreamConfig {
    /// Settings for the shared upstream client
    pub fn client_config(&self) -> UpstreamClientConfig {
        UpstreamClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: self.user_agent.clone(),
            skip_tls_verify: self.skip_tls_verify,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9292
}

fn default_upstream_url() -> String {
    "https://rubygems.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("gem-cache/{}", env!("CARGO_PKG_VERSION"))
}

fn default_storage_path() -> String {
    "./data/gem_cache".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.upstream.default_url)
            .with_context(|| format!("Invalid default upstream URL: {}", self.upstream.default_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!(
                "Default upstream URL must use http or https: {}",
                self.upstream.default_url
            );
        }

        if self.upstream.timeout_secs == 0 || self.upstream.connect_timeout_secs == 0 {
            bail!("Upstream timeouts must be greater than zero");
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => bail!("Unknown log format: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 9292);
        assert_eq!(config.upstream.default_url, "https://rubygems.org");
        assert_eq!(config.storage.path, "./data/gem_cache");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [upstream]
            default_url = "https://gems.example.org"
            timeout_secs = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.default_url, "https://gems.example.org");
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.upstream.connect_timeout_secs, 10);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.logging.level, "info");

        let client = config.upstream.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_upstream_rejected() {
        assert!(Config::from_toml("[upstream]\ndefault_url = \"not a url\"").is_err());
        assert!(Config::from_toml("[upstream]\ndefault_url = \"ftp://example.org\"").is_err());
        assert!(Config::from_toml("[upstream]\ntimeout_secs = 0").is_err());
        assert!(Config::from_toml("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9292);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8080\n[storage]\npath = \"/var/cache/gems\"").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.path, "/var/cache/gems");
    }
}
