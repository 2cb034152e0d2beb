//! JSON file persistence.

pub mod store;

pub use store::{JsonFileStatsRepository, StateFile, STATE_VERSION};
