//! Durable storage port for the statistics store.

use crate::domain::StatisticsStore;
use crate::error::StoreError;

/// Loads and flushes the [`StatisticsStore`].
///
/// Both operations are synchronous and bounded; the pipeline calls `save`
/// after every message that produced a decoration.
pub trait StatsRepository: Send + Sync {
    /// Load the persisted store, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<StatisticsStore, StoreError>;

    /// Persist the full store.
    fn save(&self, store: &StatisticsStore) -> Result<(), StoreError>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}
