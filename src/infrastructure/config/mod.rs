//! Infrastructure configuration modules.

pub mod logging;
pub mod reconnection;
pub mod settings;
pub mod telegram;

pub use settings::{Config, DedupConfig, StatisticsConfig};
