//! Telegram chat notifier.
//!
//! Sends each rendered liquidation as a plain-text message. Delivery is a
//! single attempt; the caller decides what a failure means.

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::info;

use crate::error::NotifyError;
use crate::port::Notifier;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Credentials and target chat for the Telegram notifier.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for notifications.
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Notifier that posts to one Telegram chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        info!(chat_id = config.chat_id, "Telegram notifier ready");
        Self {
            bot: Bot::new(config.bot_token),
            chat_id: ChatId(config.chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.bot
            .send_message(self.chat_id, truncate(text, MAX_MESSAGE_CHARS))
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery {
                sink: "telegram",
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Cut `s` to at most `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let truncated: String = s.chars().take(keep).collect();
    format!("{truncated}...")
}
