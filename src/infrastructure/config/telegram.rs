//! Telegram notification configuration.
//!
//! The bot token never lives in the config file. It comes from
//! `TELEGRAM_BOT_TOKEN`; `TELEGRAM_CHAT_ID` overrides `chat_id`.

use serde::Deserialize;

use crate::error::ConfigError;

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// `[telegram]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramAppConfig {
    /// Send notifications to Telegram instead of the log.
    #[serde(default)]
    pub enabled: bool,
    /// Target chat.
    #[serde(default)]
    pub chat_id: Option<i64>,
}

/// Resolved credentials for the Telegram sink.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramAppConfig {
    /// Resolve credentials from the process environment.
    ///
    /// # Errors
    ///
    /// See [`resolve_with`](Self::resolve_with).
    pub fn resolve(&self) -> Result<Option<TelegramCredentials>, ConfigError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve credentials using `lookup` for environment variables.
    ///
    /// Returns `None` when Telegram is disabled.
    ///
    /// # Errors
    ///
    /// Fails when enabled without a token or chat ID, or when
    /// `TELEGRAM_CHAT_ID` is not an integer.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Option<TelegramCredentials>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.enabled {
            return Ok(None);
        }

        let bot_token = lookup(BOT_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingField {
                field: BOT_TOKEN_VAR,
            })?;

        let chat_id = match lookup(CHAT_ID_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: CHAT_ID_VAR,
                    reason: format!("not an integer: {raw}"),
                })?,
            None => self.chat_id.ok_or(ConfigError::MissingField {
                field: "telegram.chat_id",
            })?,
        };

        Ok(Some(TelegramCredentials { bot_token, chat_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn disabled_needs_nothing() {
        let config = TelegramAppConfig::default();
        assert_eq!(config.resolve_with(env(&[])).unwrap(), None);
    }

    #[test]
    fn env_chat_id_overrides_config() {
        let config = TelegramAppConfig {
            enabled: true,
            chat_id: Some(1),
        };
        let creds = config
            .resolve_with(env(&[(BOT_TOKEN_VAR, "t"), (CHAT_ID_VAR, "-42")]))
            .unwrap()
            .unwrap();
        assert_eq!(creds.chat_id, -42);
        assert_eq!(creds.bot_token, "t");
    }

    #[test]
    fn config_chat_id_is_fallback() {
        let config = TelegramAppConfig {
            enabled: true,
            chat_id: Some(7),
        };
        let creds = config
            .resolve_with(env(&[(BOT_TOKEN_VAR, "t")]))
            .unwrap()
            .unwrap();
        assert_eq!(creds.chat_id, 7);
    }

    #[test]
    fn missing_token_is_an_error() {
        let config = TelegramAppConfig {
            enabled: true,
            chat_id: Some(7),
        };
        assert!(matches!(
            config.resolve_with(env(&[])),
            Err(ConfigError::MissingField { field: BOT_TOKEN_VAR })
        ));
    }

    #[test]
    fn bad_chat_id_is_an_error() {
        let config = TelegramAppConfig {
            enabled: true,
            chat_id: None,
        };
        assert!(matches!(
            config.resolve_with(env(&[(BOT_TOKEN_VAR, "t"), (CHAT_ID_VAR, "abc")])),
            Err(ConfigError::InvalidValue { field: CHAT_ID_VAR, .. })
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let creds = TelegramCredentials {
            bot_token: "123:secret".into(),
            chat_id: 1,
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
