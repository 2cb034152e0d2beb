//! Notification adapters.
//!
//! Implements the [`Notifier`](crate::port::Notifier) port for the log sink
//! and, with the `telegram` feature, a Telegram chat.

pub mod log;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use log::LogNotifier;
