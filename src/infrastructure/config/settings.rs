//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file; the Telegram bot
//! token and chat ID come from the environment.
//!
//! # Example
//!
//! ```no_run
//! use liqwatch::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::reconnection::ReconnectionConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::bitmex::BitmexConfig;
use crate::application::DEFAULT_SUPPRESSION_WINDOW;
use crate::error::{ConfigError, Result};

/// `[dedup]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    /// How long a deleted order ID suppresses re-inserts (seconds).
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_window_secs() -> u64 {
    DEFAULT_SUPPRESSION_WINDOW.as_secs()
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

impl DedupConfig {
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// `[statistics]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsConfig {
    /// Persist the store to `path`. When false the store lives in memory
    /// and starts empty on every run.
    #[serde(default = "default_persist")]
    pub persist: bool,
    /// JSON state file.
    #[serde(default = "default_statistics_path")]
    pub path: PathBuf,
}

const fn default_persist() -> bool {
    true
}

fn default_statistics_path() -> PathBuf {
    PathBuf::from("liqwatch-state.json")
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            persist: default_persist(),
            path: default_statistics_path(),
        }
    }
}

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults. Load from a
/// TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Realtime feed connection.
    #[serde(default)]
    pub feed: BitmexConfig,

    /// Re-insert suppression window.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Statistics persistence.
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Telegram notification configuration.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    /// Feed reconnection settings.
    ///
    /// Controls backoff delays and circuit breaker behavior.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks that values are within acceptable ranges. Environment
    /// credentials are resolved separately, at startup.
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.feed.validate()?;

        if self.dedup.window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dedup.window_secs",
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.statistics.persist && self.statistics.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "statistics.path",
            });
        }

        self.reconnection.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
