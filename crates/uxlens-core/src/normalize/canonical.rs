//! Fuzzy mapping of free-form heuristic titles onto Nielsen's ten headings.

use once_cell::sync::Lazy;

use crate::text::case::normalize_identifier;

pub const CANONICAL_HEURISTICS: [&str; 10] = [
    "Visibility of system status",
    "Match between system and the real world",
    "User control and freedom",
    "Consistency and standards",
    "Error prevention",
    "Recognition rather than recall",
    "Flexibility and efficiency of use",
    "Aesthetic and minimalist design",
    "Help users recognize, diagnose, and recover from errors",
    "Help and documentation",
];

/// Minimum normalized length for containment matching.
const MIN_FUZZY_LEN: usize = 4;

static CANONICAL_IDS: Lazy<Vec<String>> = Lazy::new(|| {
    CANONICAL_HEURISTICS
        .iter()
        .map(|h| normalize_identifier(h))
        .collect()
});

/// Index into [`CANONICAL_HEURISTICS`] for `title`, if it matches one.
///
/// An exact normalized match wins. Otherwise the heading with the largest
/// containment overlap (either string containing the other) is chosen;
/// equal overlaps resolve to the earlier heading.
pub fn match_canonical(title: &str) -> Option<usize> {
    let id = normalize_identifier(title);
    if id.is_empty() {
        return None;
    }

    if let Some(idx) = CANONICAL_IDS.iter().position(|c| *c == id) {
        return Some(idx);
    }
    if id.chars().count() < MIN_FUZZY_LEN {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, canonical) in CANONICAL_IDS.iter().enumerate() {
        let overlap = if canonical.contains(&id) {
            id.len()
        } else if id.contains(canonical.as_str()) {
            canonical.len()
        } else {
            continue;
        };
        if best.is_none_or(|(_, b)| overlap > b) {
            best = Some((idx, overlap));
        }
    }
    best.map(|(idx, _)| idx)
}
