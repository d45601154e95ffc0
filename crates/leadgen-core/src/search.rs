//! Canonical form and format rules shared by generation and reconciliation.

use std::sync::LazyLock;

use regex::Regex;

/// Shortest accepted search, in characters, after canonicalization.
pub const MIN_SEARCH_LEN: usize = 6;
/// Longest accepted search, in characters, after canonicalization.
pub const MAX_SEARCH_LEN: usize = 80;

static SEARCH_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9 \-]+$").expect("valid search charset regex"));

/// Trim surrounding whitespace and lower-case.
///
/// Two searches are the same search exactly when their canonical forms are
/// equal.
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns `true` if `raw` is an acceptable search query.
///
/// The canonical form must be 6 to 80 characters long and contain only
/// lowercase ASCII letters, digits, spaces and hyphens.
#[must_use]
pub fn validate_search(raw: &str) -> bool {
    is_canonical_search_valid(&canonicalize(raw))
}

pub(crate) fn is_canonical_search_valid(canonical: &str) -> bool {
    let len = canonical.chars().count();
    (MIN_SEARCH_LEN..=MAX_SEARCH_LEN).contains(&len) && SEARCH_CHARSET.is_match(canonical)
}
