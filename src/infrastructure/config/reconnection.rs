//! Feed reconnection configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// WebSocket reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Reconnect after a transport failure instead of exiting.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Initial delay before first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum consecutive failures before circuit breaker trips.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Cooldown period after circuit breaker trips (milliseconds).
    #[serde(default = "default_circuit_breaker_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
}

const fn default_enabled() -> bool {
    true
}

fn default_initial_delay_ms() -> u64 {
    1000 // 1 second
}

fn default_max_delay_ms() -> u64 {
    60000 // 60 seconds
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_consecutive_failures() -> u32 {
    10
}

fn default_circuit_breaker_cooldown_ms() -> u64 {
    300000 // 5 minutes
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_cooldown_ms: default_circuit_breaker_cooldown_ms(),
        }
    }
}

impl ReconnectionConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            });
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            });
        }
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.max_consecutive_failures",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.circuit_breaker_cooldown_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.circuit_breaker_cooldown_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
