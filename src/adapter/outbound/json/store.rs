//! JSON file statistics repository.
//!
//! The whole store lives in one file:
//!
//! ```json
//! {
//!   "version": 1,
//!   "updated_at": "2024-05-01T12:00:00Z",
//!   "symbols": { "XBTUSD": { "count": 3, "total_quantity": 1500, ... } }
//! }
//! ```
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the target,
//! so a crash mid-write leaves the previous state intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::StatisticsStore;
use crate::error::StoreError;
use crate::port::StatsRepository;

/// Current on-disk format version.
pub const STATE_VERSION: u32 = 1;

/// On-disk envelope around the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    pub symbols: StatisticsStore,
}

#[derive(Serialize)]
struct StateFileRef<'a> {
    version: u32,
    updated_at: DateTime<Utc>,
    symbols: &'a StatisticsStore,
}

/// Repository backed by a single JSON file.
pub struct JsonFileStatsRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStatsRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file with its envelope, `None` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON, or was written
    /// by an unknown format version.
    pub fn read(&self) -> Result<Option<StateFile>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.describe(),
                    source,
                })
            }
        };

        let file: StateFile = serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
            path: self.describe(),
            source,
        })?;

        if file.version != STATE_VERSION {
            return Err(StoreError::Version {
                found: file.version.to_string(),
            });
        }

        Ok(Some(file))
    }

    fn write_atomic(&self, json: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;
        Ok(())
    }
}

impl StatsRepository for JsonFileStatsRepository {
    fn load(&self) -> Result<StatisticsStore, StoreError> {
        match self.read()? {
            Some(file) => {
                info!(
                    path = %self.path.display(),
                    symbols = file.symbols.len(),
                    liquidations = file.symbols.total_count(),
                    updated_at = %file.updated_at,
                    "Loaded statistics"
                );
                Ok(file.symbols)
            }
            None => {
                info!(path = %self.path.display(), "No statistics file yet, starting empty");
                Ok(StatisticsStore::new())
            }
        }
    }

    fn save(&self, store: &StatisticsStore) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&StateFileRef {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            symbols: store,
        })
        .map_err(|e| StoreError::Write {
            path: self.describe(),
            source: e.into(),
        })?;

        let _guard = self.write_lock.lock();
        self.write_atomic(&json).map_err(|source| StoreError::Write {
            path: self.describe(),
            source,
        })?;

        debug!(path = %self.path.display(), symbols = store.len(), "Saved statistics");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LiquidationEvent, OrderId, Side, Symbol};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn store_with_one() -> StatisticsStore {
        let mut store = StatisticsStore::new();
        let event = LiquidationEvent::try_new(
            OrderId::new("a"),
            Symbol::new("XBTUSD"),
            Side::Sell,
            dec!(9876.5),
            1200,
        )
        .unwrap();
        store.entry(event.symbol()).apply(&event);
        store
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let repo = JsonFileStatsRepository::new(dir.path().join("state.json"));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_is_exact() {
        let dir = tempdir().unwrap();
        let repo = JsonFileStatsRepository::new(dir.path().join("nested/state.json"));
        let store = store_with_one();

        repo.save(&store).unwrap();

        assert_eq!(repo.load().unwrap(), store);
        assert!(!dir.path().join("nested/state.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStatsRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"version":99,"updated_at":"2024-05-01T12:00:00Z","symbols":{}}"#,
        )
        .unwrap();

        let err = JsonFileStatsRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Version { ref found } if found == "99"));
    }
}
