//! Configuration file handling.
//!
//! This module handles loading configuration from `.icescout.toml` files.
//! The config only tunes engine behavior; credentials and client
//! construction stay with the calling collaborator.

use crate::discovery::DiscoveryOptions;
use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Remote catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Target region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Named credential profile for the calling collaborator to resolve.
    #[serde(default)]
    pub profile: Option<String>,

    /// Explicit endpoint URL, overriding the regional default.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-call request timeout in seconds.
    #[serde(default = "default_call_timeout")]
    pub timeout_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            profile: None,
            endpoint: None,
            timeout_seconds: default_call_timeout(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_call_timeout() -> u64 {
    30
}

/// Discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Retry attempts for transient failures.
    #[serde(default = "default_retries")]
    pub max_retries: usize,

    /// Backoff before the first retry, in milliseconds. Doubles per attempt.
    #[serde(default = "default_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Databases enumerated concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Overall run deadline in seconds. Absent means no deadline.
    #[serde(default)]
    pub deadline_seconds: Option<u64>,

    /// Deliver partial results when discovery aborts mid-run.
    #[serde(default = "default_true")]
    pub fail_soft: bool,

    /// Show a progress spinner while enumerating.
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_retries(),
            base_backoff_ms: default_backoff_ms(),
            concurrency: default_concurrency(),
            deadline_seconds: None,
            fail_soft: true,
            show_progress: false,
        }
    }
}

fn default_retries() -> usize {
    3
}

fn default_backoff_ms() -> u64 {
    200
}

fn default_concurrency() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            concurrency: config.concurrency,
            deadline: config.deadline_seconds.map(Duration::from_secs),
            fail_soft: config.fail_soft,
            show_progress: config.show_progress,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the per-table notes column in the detailed inventory.
    #[serde(default = "default_true")]
    pub include_notes: bool,

    /// Include the migration-strategy recommendations section.
    #[serde(default = "default_true")]
    pub include_recommendations: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_notes: true,
            include_recommendations: true,
        }
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            include_notes: config.include_notes,
            include_recommendations: config.include_recommendations,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".icescout.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.region, "us-east-1");
        assert_eq!(config.discovery.max_retries, 3);
        assert!(config.discovery.fail_soft);
        assert!(config.report.include_notes);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[catalog]
region = "eu-west-1"
profile = "migration"

[discovery]
max_retries = 5
concurrency = 8
deadline_seconds = 600
show_progress = true

[report]
include_recommendations = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.catalog.region, "eu-west-1");
        assert_eq!(config.catalog.profile.as_deref(), Some("migration"));
        assert_eq!(config.discovery.max_retries, 5);
        assert_eq!(config.discovery.concurrency, 8);
        assert_eq!(config.discovery.deadline_seconds, Some(600));
        assert!(config.discovery.show_progress);
        assert!(!config.report.include_recommendations);
    }

    #[test]
    fn test_discovery_options_conversion() {
        let config = DiscoveryConfig {
            base_backoff_ms: 50,
            deadline_seconds: Some(120),
            ..DiscoveryConfig::default()
        };

        let options = DiscoveryOptions::from(&config);
        assert_eq!(options.base_backoff, Duration::from_millis(50));
        assert_eq!(options.deadline, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[discovery]"));
        assert!(toml_str.contains("[report]"));
    }
}
