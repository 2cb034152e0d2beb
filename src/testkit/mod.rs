//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`feed`] - Builders for feed messages and the scripted
//!   [`FeedStream`](crate::port::FeedStream) `ScriptedFeed`.
//! - [`notifier`] - Sinks that record or reject notifications.

pub mod feed;
pub mod notifier;
