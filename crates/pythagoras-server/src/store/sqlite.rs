use std::path::Path;

use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, TransactionBehavior, params};

use pythagoras_core::ranking::{RankingEntry, name_key};

use super::{RankingBackend, StoreError};
use crate::config::StoreKind;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS ranking (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    score INTEGER NOT NULL,
    date TEXT NOT NULL
)";

/// Relational backend: a single SQLite connection, one transaction per
/// mutation.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        // SQLite's LOWER() only folds ASCII; route case folding through the
        // same function the rest of the crate uses.
        conn.create_scalar_function(
            "name_key",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let name: String = ctx.get(0)?;
                Ok(name_key(&name))
            },
        )?;
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RankingBackend for SqliteStore {
    fn list_all(&self) -> Result<Vec<RankingEntry>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT name, score, date FROM ranking ORDER BY score DESC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(RankingEntry {
                name: row.get(0)?,
                score: row.get(1)?,
                recorded_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn upsert(&self, entry: &RankingEntry, retain: usize) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM ranking WHERE name_key(name) = name_key(?1)",
            params![entry.name],
        )?;
        tx.execute(
            "INSERT INTO ranking (name, score, date) VALUES (?1, ?2, ?3)",
            params![entry.name, entry.score, entry.recorded_at],
        )?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM ranking", [], |row| row.get(0))?;
        let surplus = usize::try_from(count).unwrap_or(0).saturating_sub(retain);
        let evicted = if surplus > 0 {
            tx.execute(
                "DELETE FROM ranking WHERE id IN (
                    SELECT id FROM ranking ORDER BY score ASC, id ASC LIMIT ?1
                )",
                params![i64::try_from(surplus).unwrap_or(i64::MAX)],
            )?
        } else {
            0
        };

        tx.commit()?;
        Ok(evicted)
    }

    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM ranking WHERE name_key(name) = name_key(?1))",
            params![name],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM ranking", [])?;
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ranking", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }
}
