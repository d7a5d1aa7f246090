//! Configuration module for the pod restarter
//!
//! Handles loading and validating configuration from YAML files, with CLI
//! overrides applied in `main`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Metrics export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics are enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port to expose metrics on
    #[serde(default = "default_metrics_port")]
    pub port: u16,

    /// Path for metrics endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Namespace to scan
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Label selector for candidate pods
    #[serde(default = "default_label_selector")]
    pub label_selector: String,

    /// Scan interval
    #[serde(with = "humantime_serde", default = "default_interval")]
    pub interval: Duration,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            label_selector: default_label_selector(),
            interval: default_interval(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            anyhow::bail!("namespace must not be empty");
        }
        if self.label_selector.is_empty() {
            anyhow::bail!("label_selector must not be empty");
        }
        if self.interval.is_zero() {
            anyhow::bail!("interval must be > 0");
        }
        if self.metrics.enabled && self.metrics.port == 0 {
            anyhow::bail!("metrics.port must be > 0 when metrics are enabled");
        }
        Ok(())
    }
}

// Default value functions
fn default_namespace() -> String {
    "default".to_string()
}

fn default_label_selector() -> String {
    "app=transmission".to_string()
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_metrics_port() -> u16 {
    9091
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
namespace: media
label_selector: app=transmission
interval: 2m

metrics:
  enabled: true
  port: 9091
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.namespace, "media");
        assert_eq!(config.label_selector, "app=transmission");
        assert_eq!(config.interval, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_interval() {
        let config = Config {
            interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_namespace() {
        let config = Config {
            namespace: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metrics_port_zero() {
        let mut config = Config::default();
        config.metrics.port = 0;
        assert!(config.validate().is_err());
    }
}
