//! Restaurant name normalization for search predicates.
//!
//! Published names are inconsistent about articles and possessives ("The
//! Vincent's Restaurant" vs "Vincent Restaurant"), so the search term is
//! reduced to a canonical form before it is used in a `like` predicate.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a word-final possessive, straight or typographic apostrophe.
static POSSESSIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"['\x{2019}]s\b").expect("valid regex"));

/// Matches one or more leading "the " articles.
static LEADING_THE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:the )+").expect("valid regex"));

/// Normalizes a restaurant name for searching.
///
/// The pipeline:
/// 1. Lowercase
/// 2. Drop word-final `'s` / `’s`
/// 3. Replace control characters with spaces, collapse whitespace, trim
/// 4. Strip leading "the " (a bare "the" or "theatre" is kept)
///
/// The result is idempotent: `normalize(&normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let without_possessive = POSSESSIVE_RE.replace_all(&lower, "");

    let cleaned: String = without_possessive
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    LEADING_THE_RE.replace(&collapsed, "").into_owned()
}
