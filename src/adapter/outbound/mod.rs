//! Outbound adapters (driven side).

pub mod bitmex;
pub mod json;
pub mod memory;
pub mod notifier;
