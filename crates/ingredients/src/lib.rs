//! Halal ingredient classification.
//!
//! This crate decides whether a product is halal, haram, or unknown from its
//! list of ingredient names. It is the whole decision engine: everything that
//! produces ingredient text (barcode lookup, label recognition, typed entry)
//! and everything that shows or stores the result lives elsewhere.
//!
//! ## What we do
//!
//! - Normalize raw tokens (lowercase, parentheses removed)
//! - Look them up in two disjoint lexicons: forbidden and possibly-derived
//! - Apply the priority rules: forbidden beats possibly-derived beats nothing
//! - Split combined ingredient text into tokens for callers that need it
//!
//! ## Pure function guarantee
//!
//! [`normalize`] and [`classify`] do no I/O, hold no mutable state, and never
//! fail. They can be called from any number of threads at once.
//!
//! ## Invariants worth knowing
//!
//! - Matching is exact string equality after normalization. `"beef gelatin"`
//!   does not match `"gelatin"`.
//! - An empty ingredient list classifies as compliant. Treat it as "nothing
//!   provided", not as "verified".
//!
//! ```
//! use ingredients::{classify, ClassificationResult};
//!
//! assert_eq!(
//!     classify(["water", "sugar", "gelatin", "salt"]),
//!     ClassificationResult::NonCompliant
//! );
//! assert_eq!(
//!     classify(["water", "sugar", "lecithin", "salt"]),
//!     ClassificationResult::Indeterminate
//! );
//! assert_eq!(classify(["water", "sugar", "salt"]), ClassificationResult::Compliant);
//! ```

mod classify;
mod error;
mod lexicon;
mod normalize;
mod split;
mod verdict;

pub use crate::classify::{classify, classify_with};
pub use crate::error::LexiconError;
pub use crate::lexicon::{Lexicon, LexiconCategory};
pub use crate::normalize::normalize;
pub use crate::split::{
    clean_catalog_ingredient, extract_ingredient_section, split_ingredients, MANUAL_SEPARATORS,
    SCANNED_SEPARATORS,
};
pub use crate::verdict::ClassificationResult;
