pub mod engine;
mod matching;
pub mod report;
pub mod store;

use std::collections::BTreeSet;

/// Trimmed, lower-cased, non-empty tokens of a comma-separated field, in input order.
pub fn interest_tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
}

/// The interest set of a comma-separated field.
pub fn normalize_interests(raw: &str) -> BTreeSet<String> {
    interest_tokens(raw).collect()
}
