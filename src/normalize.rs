//! Place-reference normalization
//!
//! Turns a free-text place reference into a matching key:
//! - Unicode compatibility decomposition (NFKD)
//! - Lowercase conversion
//! - Combining marks stripped (accents go away)
//! - Punctuation and whitespace stripped entirely
//!
//! Two references that differ only by case, accents, punctuation or spacing
//! share a key: "Côte d'Ivoire", "COTE DIVOIRE" and "cote-d'ivoire" all
//! become `cotedivoire`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a place reference into its matching key.
///
/// # Examples
///
/// ```
/// use place_resolver::normalize::normalize_key;
///
/// assert_eq!(normalize_key("Côte d'Ivoire"), "cotedivoire");
/// assert_eq!(normalize_key("  Cabo  Verde "), "caboverde");
/// ```
pub fn normalize_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Absent references stay absent.
pub fn normalize(s: Option<&str>) -> Option<String> {
    s.map(normalize_key)
}
