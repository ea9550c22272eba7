use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of classifying one ingredient list.
///
/// Serialized with the labels shown to users: `Halal`, `Haram`, `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationResult {
    /// No forbidden or possibly-derived ingredient was found.
    #[serde(rename = "Halal")]
    Compliant,
    /// At least one forbidden ingredient was found.
    #[serde(rename = "Haram")]
    NonCompliant,
    /// No forbidden ingredient, but at least one possibly-derived one.
    #[serde(rename = "Unknown")]
    Indeterminate,
}

impl ClassificationResult {
    pub fn label(self) -> &'static str {
        match self {
            ClassificationResult::Compliant => "Halal",
            ClassificationResult::NonCompliant => "Haram",
            ClassificationResult::Indeterminate => "Unknown",
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
