/// Canonical comparable form of an ingredient token.
///
/// Lower-cases the whole string and removes every `(` and `)`. Nothing else is
/// touched: no trimming, no whitespace collapsing. Splitting a combined
/// ingredient string into tokens is the caller's job (see
/// [`split_ingredients`](crate::split_ingredients)).
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|ch| !matches!(ch, '(' | ')'))
        .collect()
}
