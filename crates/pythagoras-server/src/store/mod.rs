//! Ranking persistence. Two interchangeable backends sit behind
//! [`RankingBackend`]; [`RankingStore`] picks one at startup.

mod json_file;
mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use pythagoras_core::ranking::RankingEntry;

use crate::config::{StoreConfig, StoreKind};

/// Any fault raised by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ranking file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ranking file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage contract shared by every backend.
///
/// Mutations are atomic with respect to each other: two concurrent calls can
/// never leave two entries for one case-insensitive name, and neither write
/// is lost.
pub trait RankingBackend: Send + Sync {
    /// Every persisted entry, score descending, earlier insertions first
    /// among equal scores.
    fn list_all(&self) -> Result<Vec<RankingEntry>, StoreError>;

    /// Remove any entry whose name matches `entry` case-insensitively, insert
    /// `entry`, then evict the lowest-scoring entries beyond `retain`, all as
    /// one unit. Returns the number of evicted entries.
    fn upsert(&self, entry: &RankingEntry, retain: usize) -> Result<usize, StoreError>;

    /// Case-insensitive membership check.
    fn exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Remove every entry.
    fn clear(&self) -> Result<(), StoreError>;

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list_all()?.len())
    }

    fn kind(&self) -> StoreKind;
}

/// The backend chosen by configuration.
pub enum RankingStore {
    Sqlite(SqliteStore),
    JsonFile(JsonFileStore),
}

impl RankingStore {
    /// Open the configured backend. The SQLite schema is created if missing;
    /// the flat file is only touched on first write.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.kind {
            StoreKind::Sqlite => Ok(Self::Sqlite(SqliteStore::open(&config.sqlite_path)?)),
            StoreKind::File => Ok(Self::JsonFile(JsonFileStore::new(&config.file_path))),
        }
    }

    fn backend(&self) -> &dyn RankingBackend {
        match self {
            Self::Sqlite(store) => store,
            Self::JsonFile(store) => store,
        }
    }
}

impl RankingBackend for RankingStore {
    fn list_all(&self) -> Result<Vec<RankingEntry>, StoreError> {
        self.backend().list_all()
    }

    fn upsert(&self, entry: &RankingEntry, retain: usize) -> Result<usize, StoreError> {
        self.backend().upsert(entry, retain)
    }

    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        self.backend().exists(name)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.backend().clear()
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.backend().count()
    }

    fn kind(&self) -> StoreKind {
        self.backend().kind()
    }
}
