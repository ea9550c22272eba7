/// Separators for ingredient lists typed by hand.
pub const MANUAL_SEPARATORS: &[char] = &[','];

/// Separators for ingredient lists read off a label image. Recognized text
/// often uses `/` between alternatives.
pub const SCANNED_SEPARATORS: &[char] = &[',', '/'];

const SECTION_MARKER: &str = "ingredients";

/// Split a combined ingredient string into trimmed, non-empty tokens.
pub fn split_ingredients(text: &str, separators: &[char]) -> Vec<String> {
    text.split(separators)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Return the part of recognized label text that follows the first
/// `ingredients` marker (any case), without a leading `:`.
///
/// `None` when the marker is missing.
pub fn extract_ingredient_section(text: &str) -> Option<&str> {
    let start = find_ascii_case_insensitive(text, SECTION_MARKER)? + SECTION_MARKER.len();
    let rest = text[start..].trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    Some(rest.trim())
}

/// Clean an ingredient text as delivered by the product catalog.
///
/// Underscores (used by the catalog to mark allergens) are dropped, hyphens
/// become spaces, standalone `or` / `and` words are removed, and whitespace is
/// collapsed.
pub fn clean_catalog_ingredient(text: &str) -> String {
    let replaced: String = text
        .chars()
        .filter(|ch| *ch != '_')
        .map(|ch| if ch == '-' { ' ' } else { ch })
        .collect();

    replaced
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("or") && !word.eq_ignore_ascii_case("and"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
