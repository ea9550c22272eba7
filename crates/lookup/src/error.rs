use thiserror::Error;

/// Why a barcode lookup produced no usable ingredient data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The catalog could not be reached (connection refused, DNS, timeout).
    #[error("no internet connection")]
    NoConnectivity,
    /// The catalog answered with a non-success status other than 404.
    #[error("product catalog unavailable (status {0})")]
    ServiceUnavailable(u16),
    #[error("product not found")]
    NotFound,
    /// The product exists but has no ingredient list.
    #[error("ingredients not found")]
    MissingIngredients,
    #[error("invalid barcode: {0:?}")]
    InvalidBarcode(String),
    #[error("failed to parse catalog response: {0}")]
    Parse(String),
    #[error("lookup failed: {0}")]
    Other(String),
}

impl LookupError {
    /// Whether retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::NoConnectivity | LookupError::ServiceUnavailable(_)
        )
    }
}
