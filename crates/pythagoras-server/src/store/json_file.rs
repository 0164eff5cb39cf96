use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use pythagoras_core::ranking::{
    RankingEntry, evict_surplus, name_key, replace_by_name, sort_ranking,
};

use super::{RankingBackend, StoreError};
use crate::config::StoreKind;

/// Flat-file backend: one JSON array of `{name, score, date}` in insertion
/// order, rewritten wholesale on every mutation.
///
/// Writers are serialized through `write_lock`. Readers take no lock; every
/// write lands in a sibling temp file that is renamed over the target, so a
/// reader sees either the previous or the next complete array.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the array in insertion order. A missing or blank file is an empty
    /// ranking.
    fn load(&self) -> Result<Vec<RankingEntry>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn persist(&self, entries: &[RankingEntry]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(entries)?;
        let tmp = self.temp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("ranking.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read-modify-write under the writer lock.
    fn mutate<T>(&self, apply: impl FnOnce(&mut Vec<RankingEntry>) -> T) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        let out = apply(&mut entries);
        self.persist(&entries)?;
        Ok(out)
    }
}

impl RankingBackend for JsonFileStore {
    fn list_all(&self) -> Result<Vec<RankingEntry>, StoreError> {
        let mut entries = self.load()?;
        sort_ranking(&mut entries);
        Ok(entries)
    }

    fn upsert(&self, entry: &RankingEntry, retain: usize) -> Result<usize, StoreError> {
        self.mutate(|entries| {
            replace_by_name(entries, entry.clone());
            evict_surplus(entries, retain)
        })
    }

    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let key = name_key(name);
        Ok(self.load()?.iter().any(|e| e.key() == key))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.mutate(Vec::clear)
    }

    fn kind(&self) -> StoreKind {
        StoreKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    fn with_store(check: impl FnOnce(&JsonFileStore)) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("ranking.json"));
        check(&store);
    }

    #[test]
    fn empty_store_lists_nothing() {
        with_store(|s| contract::empty_store_lists_nothing(s));
    }

    #[test]
    fn upsert_replaces_case_insensitively() {
        with_store(|s| contract::upsert_replaces_case_insensitively(s));
    }

    #[test]
    fn ties_keep_insertion_order() {
        with_store(|s| contract::ties_keep_insertion_order(s));
    }

    #[test]
    fn upsert_evicts_beyond_retain() {
        with_store(|s| contract::upsert_evicts_beyond_retain(s));
    }

    #[test]
    fn eviction_drops_oldest_among_equal_lowest() {
        with_store(|s| contract::eviction_drops_oldest_among_equal_lowest(s));
    }

    #[test]
    fn clear_removes_everything() {
        with_store(|s| contract::clear_removes_everything(s));
    }

    #[test]
    fn preserves_recorded_at() {
        with_store(|s| contract::preserves_recorded_at(s));
    }

    #[test]
    fn keeps_full_width_scores() {
        with_store(|s| contract::keeps_full_width_scores(s));
    }

    #[test]
    fn concurrent_same_name_leaves_one_entry() {
        with_store(|s| contract::concurrent_same_name_leaves_one_entry(s));
    }

    #[test]
    fn concurrent_distinct_names_are_not_lost() {
        with_store(|s| contract::concurrent_distinct_names_are_not_lost(s));
    }

    #[test]
    fn file_layout_is_a_json_array() {
        with_store(|s| {
            s.upsert(&RankingEntry::new("alice", 42, "2026-10-19 10:00:00"), 10)
                .unwrap();
            let raw: serde_json::Value =
                serde_json::from_slice(&fs::read(s.path()).unwrap()).unwrap();
            assert_eq!(
                raw,
                serde_json::json!([{"name": "alice", "score": 42, "date": "2026-10-19 10:00:00"}])
            );
            assert!(!s.temp_path().exists());
        });
    }

    #[test]
    fn blank_file_is_empty_ranking() {
        with_store(|s| {
            fs::write(s.path(), "  \n").unwrap();
            assert!(s.list_all().unwrap().is_empty());
        });
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        with_store(|s| {
            fs::write(s.path(), "{not json").unwrap();
            assert!(matches!(s.list_all(), Err(StoreError::Corrupt(_))));
            let entry = RankingEntry::new("x", 1, "t");
            assert!(s.upsert(&entry, 10).is_err());
            // the bad file is left for an operator to inspect
            assert_eq!(fs::read_to_string(s.path()).unwrap(), "{not json");
        });
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.list_all(), Err(StoreError::Io(_))));
    }
}
