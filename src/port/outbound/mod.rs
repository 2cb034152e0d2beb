//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the feed transport, the notification sink, and
//! durable storage for the statistics store.

pub mod feed;
pub mod notifier;
pub mod stats;
