//! Deterministic ordering helpers.
//!
//! Deduplication across the model always keeps the first occurrence and the
//! original order, so identical payloads produce identical output.

use std::collections::HashSet;
use std::hash::Hash;

/// Drop repeated strings, keeping first-seen order.
pub fn dedupe_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    dedupe_by_key(items, |s| s.clone())
}

/// Drop items whose key was already seen, keeping first-seen order.
pub fn dedupe_by_key<T, K, I, F>(items: I, mut key: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Append `line` unless an identical line is already present.
pub fn push_unique(lines: &mut Vec<String>, line: String) {
    if !lines.contains(&line) {
        lines.push(line);
    }
}
