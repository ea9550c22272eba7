//! Redb (Rust embedded database) backend for the scan history.
//!
//! Records are stored in a single table keyed by their `u64` id, so redb's
//! key ordering gives ascending-id iteration and cheap oldest-first eviction.
//! Values are JSON-encoded [`HistoryRecord`]s.
//!
//! # Configuration Example
//! ```yaml
//! history:
//!   backend: "redb"
//!   path: "/data/history.redb"
//! ```

use crate::{HistoryBackend, HistoryError, HistoryRecord};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use std::sync::Arc;

const HISTORY_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("scan_history");

/// Redb backend for persistent history storage.
///
/// Every operation runs in its own transaction and is durable once it returns.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create a Redb database at the given path.
    ///
    /// ```no_run
    /// use history::RedbBackend;
    ///
    /// let backend = RedbBackend::open("/tmp/history.redb").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let db = Database::create(path).map_err(|e| HistoryError::backend(e.to_string()))?;

        let write_txn = db
            .begin_write()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        {
            // Opening the table creates it on first use.
            let _table = write_txn
                .open_table(HISTORY_TABLE)
                .map_err(|e| HistoryError::backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| HistoryError::backend(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl HistoryBackend for RedbBackend {
    fn insert_capped(
        &self,
        record: &HistoryRecord,
        max_records: usize,
    ) -> Result<usize, HistoryError> {
        let bytes = serde_json::to_vec(record)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        // Insert and eviction share one write transaction. Any error drops it
        // uncommitted, which aborts both.
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| HistoryError::backend(e.to_string()))?;

        let mut evicted = 0;
        {
            let mut table = write_txn
                .open_table(HISTORY_TABLE)
                .map_err(|e| HistoryError::backend(e.to_string()))?;
            table
                .insert(record.id, bytes.as_slice())
                .map_err(|e| HistoryError::backend(e.to_string()))?;

            let mut len = table
                .len()
                .map_err(|e| HistoryError::backend(e.to_string()))?;
            while len > max_records as u64 {
                let popped = table
                    .pop_first()
                    .map_err(|e| HistoryError::backend(e.to_string()))?;
                if popped.is_none() {
                    break;
                }
                len -= 1;
                evicted += 1;
            }
        }

        write_txn
            .commit()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        Ok(evicted)
    }

    fn max_id(&self) -> Result<Option<u64>, HistoryError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .map_err(|e| HistoryError::backend(e.to_string()))?;

        let last = table
            .last()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        Ok(last.map(|(key, _)| key.value()))
    }

    fn count(&self) -> Result<usize, HistoryError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .map_err(|e| HistoryError::backend(e.to_string()))?;

        let len = table
            .len()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        Ok(len as usize)
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(HistoryRecord) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| HistoryError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(HISTORY_TABLE)
            .map_err(|e| HistoryError::backend(e.to_string()))?;

        for item in table
            .iter()
            .map_err(|e| HistoryError::backend(e.to_string()))?
        {
            let (_, value) = item.map_err(|e| HistoryError::backend(e.to_string()))?;
            let record: HistoryRecord = serde_json::from_slice(value.value())
                .map_err(|e| HistoryError::Serialization(e.to_string()))?;
            visitor(record)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingredients::ClassificationResult;
    use tempfile::NamedTempFile;

    fn record(id: u64, status: ClassificationResult) -> HistoryRecord {
        HistoryRecord {
            id,
            icon_url: format!("https://images.example/{id}.jpg"),
            product_name: format!("product {id}"),
            status,
        }
    }

    fn collect_ids(backend: &RedbBackend) -> Vec<u64> {
        let mut ids = Vec::new();
        backend
            .scan(&mut |r| {
                ids.push(r.id);
                Ok(())
            })
            .unwrap();
        ids
    }

    #[test]
    fn test_redb_backend_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        let stored = record(1, ClassificationResult::NonCompliant);
        assert_eq!(backend.insert_capped(&stored, 10).unwrap(), 0);

        let mut seen = Vec::new();
        backend
            .scan(&mut |r| {
                seen.push(r);
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![stored]);
    }

    #[test]
    fn test_redb_backend_max_id_and_count() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();
        assert_eq!(backend.max_id().unwrap(), None);

        for id in [2, 10, 4] {
            backend
                .insert_capped(&record(id, ClassificationResult::Compliant), 10)
                .unwrap();
        }
        assert_eq!(backend.max_id().unwrap(), Some(10));
        assert_eq!(backend.count().unwrap(), 3);
        assert_eq!(collect_ids(&backend), vec![2, 4, 10]);
    }

    #[test]
    fn test_redb_backend_evicts_in_same_transaction() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();
        for id in 1..=4 {
            backend
                .insert_capped(&record(id, ClassificationResult::Indeterminate), 4)
                .unwrap();
        }

        let evicted = backend
            .insert_capped(&record(5, ClassificationResult::Compliant), 2)
            .unwrap();
        assert_eq!(evicted, 3);
        assert_eq!(collect_ids(&backend), vec![4, 5]);
        assert_eq!(backend.count().unwrap(), 2);
    }

    #[test]
    fn test_redb_backend_survives_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        {
            let backend = RedbBackend::open(temp_file.path()).unwrap();
            backend
                .insert_capped(&record(7, ClassificationResult::Compliant), 10)
                .unwrap();
        }
        let backend = RedbBackend::open(temp_file.path()).unwrap();
        assert_eq!(backend.max_id().unwrap(), Some(7));
    }
}
