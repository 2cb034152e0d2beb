//! Telegram notification sink.
//!
//! Requires the `telegram` feature.

pub mod notifier;

pub use notifier::{TelegramConfig, TelegramNotifier};
