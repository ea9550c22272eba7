use thiserror::Error;

/// Errors that can occur while building a custom lexicon.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexiconError {
    #[error("ingredient `{0}` appears in both the forbidden and possibly-derived lists")]
    Overlap(String),
    #[error("lexicon entries must be non-empty after normalization")]
    EmptyEntry,
}
