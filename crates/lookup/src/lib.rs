//! Product catalog lookup.
//!
//! Resolves a barcode to a product name, its ingredient list, and a thumbnail
//! URL. Every way a lookup can fail maps to a distinct [`LookupError`]; callers
//! treat all of them as "no usable ingredient data" and do not classify.
//!
//! The [`ProductLookup`] trait is the seam: [`OpenFoodFactsClient`] talks to
//! the Open Food Facts v2 API, tests and hosts can plug in their own source.

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use crate::client::{LookupConfig, OpenFoodFactsClient};
pub use crate::error::LookupError;
pub use crate::types::ProductInfo;

/// A source of product data keyed by barcode.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError>;
}
