//! Heuristic evaluation normalization.
//!
//! Candidates are collected from whatever shape the payload uses, converted to
//! items, then folded onto the ten canonical headings. The result always lists
//! every canonical heading exactly once, in fixed order, followed by any items
//! that matched none of them.

use serde_json::Value;

use super::canonical::{CANONICAL_HEURISTICS, match_canonical};
use super::shape::{
    COLLECTION_KEYS, Candidate, CandidateQuery, CandidateRecord, collect_candidates,
    keyed_shape_keys,
};
use crate::analysis::model::{Item, MetadataValue};
use crate::observe::{NormalizeEvent, Observer};
use crate::text::numeric::{format_score, parse_score, severity_from_score};
use crate::text::sanitize::{as_string_array, clean_text, first_string};
use crate::util::deterministic::push_unique;

pub const HEURISTIC_QUERY: CandidateQuery = CandidateQuery {
    collection_keys: COLLECTION_KEYS,
    marker_keys: &[
        "description",
        "summary",
        "name",
        "title",
        "insights",
        "recommendations",
        "score",
        "severity",
        "intent",
    ],
    nested_depth: 1,
};

/// Title given to untitled records that match no canonical heading.
const UNTITLED_HEURISTIC: &str = "Heuristic Insight";

/// Metadata key listing the raw titles merged into a canonical heading.
pub const MATCHED_TITLES_KEY: &str = "matchedTitles";

pub fn normalize_heuristics(value: &Value, observer: &dyn Observer) -> Vec<Item> {
    if let Some(keys) = keyed_shape_keys(value) {
        observer.observe(&NormalizeEvent::KeyedSectionShape {
            section: "heuristics",
            keys,
        });
    }

    let candidates = collect_candidates(value, &HEURISTIC_QUERY);
    let items: Vec<Item> = candidates.iter().filter_map(candidate_to_item).collect();
    let canonical = canonicalize(items);

    let normalized = canonical.iter().filter(|i| !i.is_empty()).count();
    if normalized != candidates.len() {
        observer.observe(&NormalizeEvent::CountDrift {
            section: "heuristics",
            raw: candidates.len(),
            normalized,
        });
    }

    canonical
}

fn candidate_to_item(candidate: &Candidate<'_>) -> Option<Item> {
    let record = match candidate.record {
        CandidateRecord::Text(text) => {
            let text = clean_text(text)?;
            return Some(match &candidate.fallback_title {
                Some(title) => Item {
                    title: title.clone(),
                    description: Some(text),
                    ..Default::default()
                },
                None => Item::placeholder(text),
            });
        }
        CandidateRecord::Object(record) => record,
    };

    let mut lines: Vec<String> = first_string(record, &["description", "summary"])
        .into_iter()
        .collect();
    if let Some(insights) = record.get("insights") {
        lines.extend(as_string_array(insights));
    }
    if let Some(recommendations) = record.get("recommendations") {
        lines.extend(
            as_string_array(recommendations)
                .into_iter()
                .map(|r| format!("Next Steps: {r}")),
        );
    }
    let score = ["score", "scoreValue", "rating"]
        .iter()
        .find_map(|k| record.get(*k).and_then(parse_score));
    if let Some(score) = score {
        lines.push(format!("Score: {}/5", format_score(score)));
    }
    let description = (!lines.is_empty()).then(|| lines.join("\n"));

    let title = first_string(record, &["name", "title", "heuristic"])
        .or_else(|| candidate.fallback_title.clone())
        .or_else(|| {
            description
                .as_deref()
                .and_then(match_canonical)
                .map(|idx| CANONICAL_HEURISTICS[idx].to_string())
        });
    let title = match (title, &description) {
        (Some(title), _) => title,
        (None, Some(_)) => UNTITLED_HEURISTIC.to_string(),
        (None, None) => return None,
    };

    Some(Item {
        title,
        description,
        severity: first_string(record, &["severity", "intent"])
            .or_else(|| score.map(|s| severity_from_score(s).to_string())),
        score,
        ..Default::default()
    })
}

/// Fold items onto the canonical headings.
///
/// Items matching the same heading merge: description lines are concatenated
/// without repeating identical lines and the later severity and score win.
/// Unmatched items follow the ten headings untouched, in input order.
pub fn canonicalize(items: Vec<Item>) -> Vec<Item> {
    let mut buckets: [Option<Item>; 10] = Default::default();
    let mut extras = Vec::new();

    for item in items {
        match match_canonical(&item.title) {
            Some(idx) => {
                let bucket =
                    buckets[idx].get_or_insert_with(|| Item::placeholder(CANONICAL_HEURISTICS[idx]));
                merge_into(bucket, item);
            }
            None => extras.push(item),
        }
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(idx, bucket)| bucket.unwrap_or_else(|| Item::placeholder(CANONICAL_HEURISTICS[idx])))
        .chain(extras)
        .collect()
}

fn merge_into(target: &mut Item, item: Item) {
    let mut lines: Vec<String> = target.description_lines().map(str::to_string).collect();
    for line in item.description_lines() {
        push_unique(&mut lines, line.to_string());
    }
    target.description = (!lines.is_empty()).then(|| lines.join("\n"));

    if item.severity.is_some() {
        target.severity = item.severity;
    }
    if item.score.is_some() {
        target.score = item.score;
    }

    let matched = target
        .metadata
        .entry(MATCHED_TITLES_KEY.to_string())
        .or_insert_with(|| MetadataValue::List(Vec::new()));
    if let MetadataValue::List(titles) = matched {
        push_unique(titles, item.title);
    }

    for (key, value) in item.metadata {
        if key != MATCHED_TITLES_KEY {
            target.metadata.insert(key, value);
        }
    }
}
