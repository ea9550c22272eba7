use crate::{HistoryError, HistoryRecord};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Storage for history records keyed by id.
///
/// Backends do not assign ids; [`HistoryStore`] does that while holding its
/// writer lock.
///
/// [`HistoryStore`]: crate::HistoryStore
pub trait HistoryBackend: Send + Sync {
    /// Persist a record under its id, then delete records with the smallest
    /// ids until at most `max_records` remain. Returns how many were deleted.
    ///
    /// Insert and eviction are one atomic step: on `Err` the stored records
    /// are exactly what they were before the call.
    fn insert_capped(
        &self,
        record: &HistoryRecord,
        max_records: usize,
    ) -> Result<usize, HistoryError>;
    /// Highest id currently stored, `None` when empty.
    fn max_id(&self) -> Result<Option<u64>, HistoryError>;
    /// Number of stored records.
    fn count(&self) -> Result<usize, HistoryError>;
    /// Visit every record in ascending id order.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(HistoryRecord) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError>;
}

/// Configuration for selecting and building a backend.
///
/// ```
/// use history::BackendConfig;
///
/// let config = BackendConfig::in_memory();
/// let config = BackendConfig::redb("/data/history.redb");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Redb database file at `path`. Requires the `backend-redb` feature
    /// (enabled by default).
    Redb { path: String },
    /// Records live only as long as the store.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Build the backend described by this configuration.
    pub fn build(&self) -> Result<Box<dyn HistoryBackend>, HistoryError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(HistoryError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a `BTreeMap`.
pub struct InMemoryBackend {
    records: RwLock<BTreeMap<u64, HistoryRecord>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBackend for InMemoryBackend {
    fn insert_capped(
        &self,
        record: &HistoryRecord,
        max_records: usize,
    ) -> Result<usize, HistoryError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| HistoryError::backend("poisoned lock"))?;
        guard.insert(record.id, record.clone());

        let mut evicted = 0;
        while guard.len() > max_records && guard.pop_first().is_some() {
            evicted += 1;
        }
        Ok(evicted)
    }

    fn max_id(&self) -> Result<Option<u64>, HistoryError> {
        let guard = self
            .records
            .read()
            .map_err(|_| HistoryError::backend("poisoned lock"))?;
        Ok(guard.keys().next_back().copied())
    }

    fn count(&self) -> Result<usize, HistoryError> {
        let guard = self
            .records
            .read()
            .map_err(|_| HistoryError::backend("poisoned lock"))?;
        Ok(guard.len())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(HistoryRecord) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError> {
        let guard = self
            .records
            .read()
            .map_err(|_| HistoryError::backend("poisoned lock"))?;
        for record in guard.values() {
            visitor(record.clone())?;
        }
        Ok(())
    }
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbBackend;
