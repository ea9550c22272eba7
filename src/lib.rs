//! Umbrella crate for the halal scanner.
//!
//! This crate stitches the classification engine, the scan history, and the
//! product catalog together behind a single [`Scanner`]. A scan runs in three
//! steps: resolve ingredient tokens (typed text, label text, or a barcode
//! lookup), classify them, then record the outcome in the history.
//!
//! Recording is best effort. A history failure is logged and reported as a
//! missing record; the verdict is still returned.

pub mod config;

pub use config::{
    CONFIG_ENV_VAR, ConfigLoadError, DEFAULT_HISTORY_PATH, HalalScanConfig, HistoryYamlConfig,
    LexiconYamlConfig, LoggingYamlConfig,
};
pub use history::{
    BackendConfig, DEFAULT_MAX_RECORDS, HistoryBackend, HistoryError, HistoryRecord,
    HistoryRecordInput, HistoryStore, InMemoryBackend,
};
pub use ingredients::{
    ClassificationResult, Lexicon, LexiconCategory, LexiconError, MANUAL_SEPARATORS,
    SCANNED_SEPARATORS, classify, classify_with, extract_ingredient_section, normalize,
    split_ingredients,
};
pub use lookup::{LookupConfig, LookupError, OpenFoodFactsClient, ProductInfo, ProductLookup};

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{Level, debug, info, warn};

/// Errors that stop a scan before a verdict is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    Lookup(LookupError),
    /// The input held no ingredient tokens after splitting.
    NoIngredients,
    Lexicon(LexiconError),
    History(HistoryError),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Lookup(err) => write!(f, "product lookup failed: {err}"),
            ScanError::NoIngredients => write!(f, "no ingredients provided"),
            ScanError::Lexicon(err) => write!(f, "invalid lexicon: {err}"),
            ScanError::History(err) => write!(f, "history store unavailable: {err}"),
        }
    }
}

impl Error for ScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScanError::Lookup(err) => Some(err),
            ScanError::Lexicon(err) => Some(err),
            ScanError::History(err) => Some(err),
            ScanError::NoIngredients => None,
        }
    }
}

impl From<LookupError> for ScanError {
    fn from(value: LookupError) -> Self {
        ScanError::Lookup(value)
    }
}

impl From<LexiconError> for ScanError {
    fn from(value: LexiconError) -> Self {
        ScanError::Lexicon(value)
    }
}

impl From<HistoryError> for ScanError {
    fn from(value: HistoryError) -> Self {
        ScanError::History(value)
    }
}

/// Observer for scan stages. Installed per scanner.
pub trait ScanMetrics: Send + Sync {
    fn record_classify(&self, latency: Duration, status: ClassificationResult);
    fn record_history(&self, latency: Duration, result: Result<(), HistoryError>);
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub status: ClassificationResult,
    /// `None` when the history append failed.
    pub record: Option<HistoryRecord>,
}

/// Classification pipeline over an explicitly owned history store.
#[derive(Clone)]
pub struct Scanner {
    lexicon: Arc<Lexicon>,
    history: Arc<HistoryStore>,
    metrics: Option<Arc<dyn ScanMetrics>>,
}

impl Scanner {
    /// Scanner using the built-in lexicon.
    pub fn new(history: Arc<HistoryStore>) -> Self {
        Self {
            lexicon: Lexicon::shared_builtin(),
            history,
            metrics: None,
        }
    }

    /// Build the lexicon and history store described by `config`.
    pub fn from_config(config: &HalalScanConfig) -> Result<Self, ScanError> {
        let lexicon = config.lexicon.build()?;
        let store = HistoryStore::new(
            &config.history.backend_config(),
            config.history.max_records,
        )?;
        Ok(Self::new(Arc::new(store)).with_lexicon(lexicon))
    }

    pub fn with_lexicon(mut self, lexicon: Arc<Lexicon>) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn ScanMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Classify without recording anything.
    pub fn classify<I, S>(&self, ingredients: I) -> ClassificationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        let status = classify_with(&self.lexicon, ingredients);
        let elapsed = start.elapsed();
        debug!(status = %status, elapsed_micros = elapsed.as_micros() as u64, "classify_verdict");
        if let Some(metrics) = &self.metrics {
            metrics.record_classify(elapsed, status);
        }
        status
    }

    /// Append an outcome to the history. Failures are logged, not returned.
    pub fn record(
        &self,
        product_name: &str,
        icon_url: &str,
        status: ClassificationResult,
    ) -> Option<HistoryRecord> {
        let start = Instant::now();
        let result = self
            .history
            .append(HistoryRecordInput::new(product_name, icon_url, status));
        let elapsed = start.elapsed();

        if let Some(metrics) = &self.metrics {
            let observed = result.as_ref().map(|_| ()).map_err(|err| err.clone());
            metrics.record_history(elapsed, observed);
        }

        match result {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(
                    error = %err,
                    status = %status,
                    elapsed_micros = elapsed.as_micros() as u64,
                    "history_append_failed"
                );
                None
            }
        }
    }

    /// [`Scanner::record`] on a blocking worker, so storage I/O does not hold
    /// up the async caller.
    pub async fn record_async(
        &self,
        product_name: String,
        icon_url: String,
        status: ClassificationResult,
    ) -> Option<HistoryRecord> {
        let scanner = self.clone();
        match tokio::task::spawn_blocking(move || {
            scanner.record(&product_name, &icon_url, status)
        })
        .await
        {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, status = %status, "history_append_failed");
                None
            }
        }
    }

    /// Classify resolved ingredient tokens and record the outcome.
    pub fn scan_ingredients<I, S>(
        &self,
        product_name: &str,
        icon_url: &str,
        ingredients: I,
    ) -> ScanOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let span = tracing::span!(Level::INFO, "scan.ingredients", product = %product_name);
        let _guard = span.enter();

        let status = self.classify(ingredients);
        let record = self.record(product_name, icon_url, status);
        info!(status = %status, recorded = record.is_some(), "scan_complete");
        ScanOutcome { status, record }
    }

    /// Split a combined ingredient string, then scan it.
    ///
    /// Text with no tokens is rejected rather than classified as compliant.
    pub fn scan_text(
        &self,
        product_name: &str,
        text: &str,
        separators: &[char],
    ) -> Result<ScanOutcome, ScanError> {
        let tokens = split_ingredients(text, separators);
        if tokens.is_empty() {
            return Err(ScanError::NoIngredients);
        }
        Ok(self.scan_ingredients(product_name, "", &tokens))
    }

    /// Scan recognized label text: take the part after the `ingredients`
    /// marker and split it with [`SCANNED_SEPARATORS`].
    pub fn scan_label(&self, product_name: &str, label: &str) -> Result<ScanOutcome, ScanError> {
        let section = extract_ingredient_section(label).ok_or(ScanError::NoIngredients)?;
        self.scan_text(product_name, section, SCANNED_SEPARATORS)
    }

    /// Look a barcode up, classify its ingredients, and record the outcome.
    ///
    /// Lookup failures are returned as-is; nothing is classified or recorded.
    pub async fn scan_barcode(
        &self,
        lookup: &dyn ProductLookup,
        barcode: &str,
    ) -> Result<ScanOutcome, ScanError> {
        let product = lookup.lookup(barcode).await?;

        let status = self.classify(&product.ingredients);
        let record = self
            .record_async(product.name, product.icon_url, status)
            .await;
        info!(
            barcode,
            status = %status,
            recorded = record.is_some(),
            "scan_complete"
        );
        Ok(ScanOutcome { status, record })
    }
}
