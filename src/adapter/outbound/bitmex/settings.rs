//! BitMEX feed configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};
use crate::port::LIQUIDATION_TABLE;

/// Realtime feed connection settings (`[feed]` in config).
#[derive(Debug, Clone, Deserialize)]
pub struct BitmexConfig {
    /// URL scheme, `wss` in production.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Feed host, without scheme or path.
    #[serde(default = "default_host")]
    pub host: String,
    /// Tables to subscribe to.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
    /// Interval between keep-alive pings (seconds).
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    /// Maximum silence before the connection is considered dead (seconds).
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Deadline for a single outbound frame (seconds).
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
    /// Deadline for the opening handshake (seconds).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_scheme() -> String {
    "wss".into()
}

fn default_host() -> String {
    "www.bitmex.com".into()
}

fn default_topics() -> Vec<String> {
    vec![LIQUIDATION_TABLE.to_string()]
}

const fn default_ping_interval_secs() -> u64 {
    54
}

const fn default_read_timeout_secs() -> u64 {
    60
}

const fn default_write_timeout_secs() -> u64 {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for BitmexConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            topics: default_topics(),
            ping_interval_secs: default_ping_interval_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl BitmexConfig {
    /// Realtime endpoint, `{scheme}://{host}/realtime`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme and host do not form a valid URL.
    pub fn url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}://{}/realtime", self.scheme, self.host))?)
    }

    #[must_use]
    pub const fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check the settings for values the stream cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !matches!(self.scheme.as_str(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                field: "feed.scheme",
                reason: format!("expected ws or wss, got {}", self.scheme),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "feed.host",
                reason: "must not be empty".into(),
            });
        }
        if self.topics.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "feed.topics",
                reason: "at least one topic is required".into(),
            });
        }
        for (field, value) in [
            ("feed.ping_interval_secs", self.ping_interval_secs),
            ("feed.read_timeout_secs", self.read_timeout_secs),
            ("feed.write_timeout_secs", self.write_timeout_secs),
            ("feed.connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".into(),
                });
            }
        }
        if self.ping_interval_secs >= self.read_timeout_secs {
            return Err(ConfigError::InvalidValue {
                field: "feed.ping_interval_secs",
                reason: format!(
                    "must be shorter than feed.read_timeout_secs ({})",
                    self.read_timeout_secs
                ),
            });
        }
        Ok(())
    }
}
