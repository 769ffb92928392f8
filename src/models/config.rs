//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where pages come from and how they are fetched
    #[serde(default)]
    pub source: SourceConfig,

    /// Paging and termination settings for collection sessions
    #[serde(default)]
    pub session: SessionConfig,

    /// Scroll-proximity trigger settings
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Console output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        Url::parse(&self.source.base_url).map_err(|e| {
            AppError::validation(format!(
                "source.base_url '{}' is not a valid URL: {e}",
                self.source.base_url
            ))
        })?;
        if self.session.page_size == 0 {
            return Err(AppError::validation("session.page_size must be > 0"));
        }
        if self.session.cap == Some(0) {
            return Err(AppError::validation("session.cap must be > 0 when set"));
        }
        if self.output.template.trim().is_empty() {
            return Err(AppError::validation("output.template is empty"));
        }
        Ok(())
    }
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root of the remote catalog API; listing slugs are appended to it
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Artificial latency of the local synthetic source in milliseconds
    #[serde(default)]
    pub latency_ms: u64,

    /// Number of synthetic entries generated per listing
    #[serde(default = "defaults::synthetic_count")]
    pub synthetic_count: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            latency_ms: 0,
            synthetic_count: defaults::synthetic_count(),
        }
    }
}

/// Collection session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Items requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Maximum number of items loaded per filter; unset means "until a short page"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<usize>,

    /// Explicit retries the browse command attempts after a failed page
    #[serde(default = "defaults::max_retries")]
    pub max_retries: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            cap: None,
            max_retries: defaults::max_retries(),
        }
    }
}

/// Load trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Remaining rendered items at which the next page is requested
    #[serde(default = "defaults::proximity")]
    pub proximity: usize,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            proximity: defaults::proximity(),
        }
    }
}

/// Console output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Line template for each entry (see `CatalogEntry::format`)
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
        }
    }
}

/// Log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn base_url() -> String {
        "http://localhost:8080/api/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; catalog/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn synthetic_count() -> usize {
        60
    }

    // Session defaults
    pub fn page_size() -> usize {
        10
    }
    pub fn max_retries() -> usize {
        1
    }

    // Trigger defaults
    pub fn proximity() -> usize {
        3
    }

    // Output defaults
    pub fn template() -> String {
        "[{category}] {title} - {provider} ({price})".into()
    }

    // Logging defaults
    pub fn level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.source.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.session.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_cap() {
        let mut config = Config::default();
        config.session.cap = Some(0);
        assert!(config.validate().is_err());
        config.session.cap = Some(30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            "[session]\npage_size = 4\ncap = 10\n\n[trigger]\nproximity = 1\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.session.page_size, 4);
        assert_eq!(config.session.cap, Some(10));
        assert_eq!(config.trigger.proximity, 1);
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml"));
        assert_eq!(config.session.page_size, 10);
        assert!(config.session.cap.is_none());
    }
}
