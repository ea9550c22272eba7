//! # Scan History
//!
//! A capped, append-only log of classification outcomes.
//!
//! The [`HistoryStore`] is the only writer of its records. It assigns ids,
//! fills in a placeholder name for unnamed products, and evicts the oldest
//! records once the store grows past its cap (100 by default). Storage is
//! pluggable through the [`HistoryBackend`] trait:
//!
//! - an in-memory `BTreeMap` backend, useful for tests and ephemeral runs
//! - a redb backend for on-disk persistence (`backend-redb` feature, on by default)
//!
//! ## Concurrency
//!
//! Appends on one store are serialized by a writer lock so that the
//! id assignment and the capped insert cannot interleave with another append. Reads do
//! not take the writer lock. The store is constructed explicitly and shared by
//! reference (`Arc<HistoryStore>`); there is no process-wide instance.
//!
//! ## Example Usage
//!
//! ```
//! use history::{BackendConfig, HistoryRecordInput, HistoryStore};
//! use ingredients::ClassificationResult;
//!
//! let store = HistoryStore::new(&BackendConfig::in_memory(), 100).unwrap();
//! let record = store
//!     .append(HistoryRecordInput::new("", "", ClassificationResult::Compliant))
//!     .unwrap();
//! assert_eq!(record.id, 1);
//! assert_eq!(record.product_name, "Scanned Product #1");
//! ```

mod backend;

pub use backend::{BackendConfig, HistoryBackend, InMemoryBackend};
#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;

use std::sync::Mutex;

use ingredients::ClassificationResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Default number of records kept before the oldest are evicted.
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// Errors surfaced by the history store and its backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history backend error: {0}")]
    Backend(String),
    #[error("history record encoding failed: {0}")]
    Serialization(String),
    #[error("invalid history config: {0}")]
    InvalidConfig(String),
}

impl HistoryError {
    pub fn backend<S: Into<String>>(message: S) -> Self {
        HistoryError::Backend(message.into())
    }
}

/// One persisted classification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Assigned by the store: one more than the highest id present.
    pub id: u64,
    /// Product thumbnail URL, empty when unknown.
    pub icon_url: String,
    pub product_name: String,
    /// Stored as `Halal`, `Haram`, or `Unknown`.
    pub status: ClassificationResult,
}

/// What callers supply when recording an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecordInput {
    pub product_name: String,
    pub icon_url: String,
    pub status: ClassificationResult,
}

impl HistoryRecordInput {
    pub fn new(
        product_name: impl Into<String>,
        icon_url: impl Into<String>,
        status: ClassificationResult,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            icon_url: icon_url.into(),
            status,
        }
    }
}

/// Placeholder name for a record whose product name was empty.
pub fn placeholder_name(id: u64) -> String {
    format!("Scanned Product #{id}")
}

/// Capped history store over a pluggable backend.
pub struct HistoryStore {
    backend: Box<dyn HistoryBackend>,
    max_records: usize,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Build a store from a backend configuration.
    pub fn new(config: &BackendConfig, max_records: usize) -> Result<Self, HistoryError> {
        Self::with_backend(config.build()?, max_records)
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(
        backend: Box<dyn HistoryBackend>,
        max_records: usize,
    ) -> Result<Self, HistoryError> {
        if max_records == 0 {
            return Err(HistoryError::InvalidConfig(
                "max_records must be at least 1".into(),
            ));
        }
        Ok(Self {
            backend,
            max_records,
            write_lock: Mutex::new(()),
        })
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Persist a new record and evict the oldest ones beyond the cap.
    ///
    /// The returned record carries the assigned id and the final product name.
    /// On `Err` nothing was stored and nothing was evicted.
    pub fn append(&self, input: HistoryRecordInput) -> Result<HistoryRecord, HistoryError> {
        let _writer = self
            .write_lock
            .lock()
            .map_err(|_| HistoryError::backend("poisoned writer lock"))?;

        let id = self.backend.max_id()?.unwrap_or(0) + 1;
        let product_name = if input.product_name.is_empty() {
            placeholder_name(id)
        } else {
            input.product_name
        };
        let record = HistoryRecord {
            id,
            icon_url: input.icon_url,
            product_name,
            status: input.status,
        };

        let evicted = self.backend.insert_capped(&record, self.max_records)?;
        debug!(id, status = %record.status, "history_append");
        if evicted > 0 {
            info!(evicted, max_records = self.max_records, "history_evicted");
        }

        Ok(record)
    }

    /// All records in ascending id order.
    pub fn list_all(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let mut records = Vec::new();
        self.backend.scan(&mut |record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    /// All records, newest first, as a history screen shows them.
    pub fn list_recent_first(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let mut records = self.list_all()?;
        records.reverse();
        Ok(records)
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        self.backend.count()
    }
}
