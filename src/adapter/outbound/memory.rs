//! In-memory statistics repository.
//!
//! Used when `[statistics] persist = false`, and by tests to observe flushes.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::domain::StatisticsStore;
use crate::error::StoreError;
use crate::port::StatsRepository;

/// Keeps the last saved store in memory.
#[derive(Default)]
pub struct MemoryStatsRepository {
    saved: Mutex<StatisticsStore>,
    saves: AtomicUsize,
    fail_writes: bool,
}

impl MemoryStatsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing store.
    #[must_use]
    pub fn with_store(store: StatisticsStore) -> Self {
        Self {
            saved: Mutex::new(store),
            ..Self::default()
        }
    }

    /// Repository whose every `save` fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the last saved store.
    pub fn snapshot(&self) -> StatisticsStore {
        self.saved.lock().clone()
    }
}

impl StatsRepository for MemoryStatsRepository {
    fn load(&self) -> Result<StatisticsStore, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, store: &StatisticsStore) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write {
                path: self.describe(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "writes disabled"),
            });
        }
        *self.saved.lock() = store.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_snapshot() {
        let repo = MemoryStatsRepository::new();
        assert!(repo.load().unwrap().is_empty());

        let mut store = StatisticsStore::new();
        store.entry(&"XBTUSD".into());
        repo.save(&store).unwrap();

        assert_eq!(repo.saves(), 1);
        assert_eq!(repo.load().unwrap(), store);
    }

    #[test]
    fn with_store_loads_seeded_state() {
        let mut store = StatisticsStore::new();
        store.entry(&"ETHUSD".into());

        let repo = MemoryStatsRepository::with_store(store.clone());

        assert_eq!(repo.load().unwrap(), store);
        assert_eq!(repo.saves(), 0);
    }

    #[test]
    fn failing_repository_keeps_previous_state() {
        let repo = MemoryStatsRepository::failing();
        let mut store = StatisticsStore::new();
        store.entry(&"XBTUSD".into());

        assert!(matches!(repo.save(&store), Err(StoreError::Write { .. })));
        assert_eq!(repo.saves(), 0);
        assert!(repo.snapshot().is_empty());
    }
}
