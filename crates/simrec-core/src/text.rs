//! Text normalization for corpus construction and queries.
//!
//! The catalog mixes free text with Vietnamese-language fields whose script
//! uses combining diacritics heavily. Without canonicalization, identical
//! words encoded differently (precomposed vs. combining marks, full-width
//! forms) score as distinct tokens and silently degrade similarity quality.

use unicode_normalization::UnicodeNormalization;

/// Canonicalize raw text: NFKC Unicode normalization, then lowercase.
///
/// Pure and idempotent; empty input yields the empty string.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}
