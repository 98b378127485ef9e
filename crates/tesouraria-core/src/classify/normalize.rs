//! Search-corpus normalization: diacritics stripped, lowercased.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block (U+0300..=U+036F).
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Strip diacritics and lowercase a single string.
///
/// Canonical decomposition (NFD) splits accented letters into base letter
/// plus combining mark; the marks are then dropped.
pub fn fold(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_diacritic(*c)).collect();
    stripped
        .to_lowercase()
        .chars()
        .filter(|c| !is_diacritic(*c))
        .collect()
}

/// Join corpus parts with a single space and fold the result.
///
/// Empty parts still contribute their separator, so the output for
/// `["", ""]` is `" "`. Never fails.
pub fn normalize<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    fold(&joined)
}
