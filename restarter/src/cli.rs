//! CLI argument parsing for the pod restarter

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Pod Restarter - deletes not-ready pods so their controller recreates them
#[derive(Debug, Parser)]
#[command(name = "pod-restarter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/pod-restarter/config.yaml")]
    pub config: PathBuf,

    /// Namespace to scan (overrides config)
    #[arg(short, long, env = "RESTARTER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Label selector for candidate pods (overrides config)
    #[arg(short, long, env = "RESTARTER_SELECTOR")]
    pub selector: Option<String>,

    /// Scan interval, e.g. 1m or 30s (overrides config)
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Run a single scan cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RESTARTER_LOG_LEVEL")]
    pub log_level: String,

    /// Output logs in JSON format
    #[arg(long, default_value = "false", env = "RESTARTER_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pod-restarter"]).unwrap();
        assert_eq!(
            cli.config.to_str().unwrap(),
            "/etc/pod-restarter/config.yaml"
        );
        assert!(cli.namespace.is_none());
        assert!(cli.selector.is_none());
        assert!(cli.interval.is_none());
        assert_eq!(cli.log_level, "info");
        assert!(!cli.log_json);
        assert!(!cli.once);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "pod-restarter",
            "-n",
            "media",
            "-s",
            "app=transmission",
            "-i",
            "2m",
        ])
        .unwrap();
        assert_eq!(cli.namespace.as_deref(), Some("media"));
        assert_eq!(cli.selector.as_deref(), Some("app=transmission"));
        assert_eq!(cli.interval, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_cli_once() {
        let cli = Cli::try_parse_from(["pod-restarter", "--once"]).unwrap();
        assert!(cli.once);
    }

    #[test]
    fn test_cli_custom_config() {
        let cli = Cli::try_parse_from(["pod-restarter", "-c", "/custom/config.yaml"]).unwrap();
        assert_eq!(cli.config.to_str().unwrap(), "/custom/config.yaml");
    }
}
