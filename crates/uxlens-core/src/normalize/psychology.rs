//! Persuasion technique and behavioral trigger normalization.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::shape::{
    COLLECTION_KEYS, Candidate, CandidateQuery, CandidateRecord, collect_candidates,
    keyed_shape_keys,
};
use crate::analysis::model::{Item, MetadataValue};
use crate::observe::{NormalizeEvent, Observer};
use crate::text::sanitize::{as_string_array, clean_text, first_string};

pub const PSYCHOLOGY_QUERY: CandidateQuery = CandidateQuery {
    collection_keys: COLLECTION_KEYS,
    marker_keys: &[
        "title",
        "name",
        "summary",
        "description",
        "recommendations",
        "signals",
        "intent",
    ],
    nested_depth: 2,
};

/// Payload key and default item title for each psychology bucket.
pub const PSYCHOLOGY_BUCKETS: &[(&str, &str)] = &[
    ("persuasionTechniques", "Persuasion Technique"),
    ("behavioralTriggers", "Behavioral Trigger"),
];

pub const PSYCHOLOGY_INSIGHT: &str = "Psychology Insight";

/// Once any item exists the list is padded to this length.
pub const PSYCHOLOGY_MINIMUM: usize = 3;

pub const PLACEHOLDER_TITLES: [&str; 3] =
    ["Persuasion Technique", "Behavioral Trigger", PSYCHOLOGY_INSIGHT];

pub fn normalize_psychology(value: &Value, observer: &dyn Observer) -> Vec<Item> {
    let mut items = Vec::new();
    let mut raw_count = 0;

    match value {
        Value::Object(map) => {
            for (key, default_title) in PSYCHOLOGY_BUCKETS {
                let Some(bucket) = map.get(*key) else {
                    continue;
                };
                if let Some(keys) = keyed_shape_keys(bucket) {
                    observer.observe(&NormalizeEvent::KeyedSectionShape {
                        section: "psychology",
                        keys,
                    });
                }
                let candidates = collect_candidates(bucket, &PSYCHOLOGY_QUERY);
                raw_count += candidates.len();
                items.extend(
                    candidates
                        .iter()
                        .filter_map(|c| candidate_to_item(c, key, default_title)),
                );
            }
            if items.is_empty() {
                items.extend(prose_fallback(map));
            }
        }
        Value::Array(_) | Value::String(_) => {
            let candidates = collect_candidates(value, &PSYCHOLOGY_QUERY);
            raw_count += candidates.len();
            items.extend(
                candidates
                    .iter()
                    .filter_map(|c| candidate_to_item(c, "psychology", PSYCHOLOGY_INSIGHT)),
            );
        }
        _ => {}
    }

    if raw_count > 0 && raw_count != items.len() {
        observer.observe(&NormalizeEvent::CountDrift {
            section: "psychology",
            raw: raw_count,
            normalized: items.len(),
        });
    }

    pad_to_minimum(&mut items);
    items
}

fn candidate_to_item(candidate: &Candidate<'_>, bucket: &str, default_title: &str) -> Option<Item> {
    let mut metadata = BTreeMap::new();
    metadata.insert("bucket".to_string(), MetadataValue::Text(bucket.to_string()));

    let record = match candidate.record {
        CandidateRecord::Text(text) => {
            return Some(Item {
                title: candidate
                    .fallback_title
                    .clone()
                    .unwrap_or_else(|| default_title.to_string()),
                description: Some(clean_text(text)?),
                metadata,
                ..Default::default()
            });
        }
        CandidateRecord::Object(record) => record,
    };

    let signals = record.get("signals").map(as_string_array).unwrap_or_default();
    let lines = prose_lines(
        first_string(record, &["summary", "description"]),
        record.get("recommendations").map(as_string_array).unwrap_or_default(),
        &signals,
    );

    let explicit_title = first_string(record, &["title", "name"]);
    if explicit_title.is_none() && candidate.fallback_title.is_none() && lines.is_empty() {
        return None;
    }

    if !signals.is_empty() {
        metadata.insert("signals".to_string(), MetadataValue::List(signals));
    }

    Some(Item {
        title: explicit_title
            .or_else(|| candidate.fallback_title.clone())
            .unwrap_or_else(|| default_title.to_string()),
        description: (!lines.is_empty()).then(|| lines.join("\n")),
        severity: first_string(record, &["intent"]),
        metadata,
        ..Default::default()
    })
}

/// Summary, then one `Next Steps:` line, then one `Signals:` line.
fn prose_lines(
    summary: Option<String>,
    recommendations: Vec<String>,
    signals: &[String],
) -> Vec<String> {
    let mut lines: Vec<String> = summary.into_iter().collect();
    if !recommendations.is_empty() {
        lines.push(format!("Next Steps: {}", recommendations.join("; ")));
    }
    if !signals.is_empty() {
        lines.push(format!("Signals: {}", signals.join(", ")));
    }
    lines
}

/// One `Psychology Insight` built only from loose prose on the raw object.
fn prose_fallback(map: &Map<String, Value>) -> Option<Item> {
    let mut lines: Vec<String> = ["summary", "overview"]
        .iter()
        .filter_map(|k| first_string(map, &[*k]))
        .collect();
    if let Some(notes) = map.get("notes") {
        lines.extend(as_string_array(notes));
    }
    lines.extend(first_string(map, &["guardrail"]));

    let recommendations = map.get("recommendations").map(as_string_array).unwrap_or_default();
    let signals = map.get("signals").map(as_string_array).unwrap_or_default();
    lines.extend(prose_lines(None, recommendations, &signals));

    if lines.is_empty() {
        return None;
    }

    let mut item = Item::placeholder(PSYCHOLOGY_INSIGHT);
    item.description = Some(lines.join("\n"));
    if !signals.is_empty() {
        item.metadata
            .insert("signals".to_string(), MetadataValue::List(signals));
    }
    Some(item)
}

/// Pad a non-empty list with title-only placeholders, rotating through
/// [`PLACEHOLDER_TITLES`] by position.
fn pad_to_minimum(items: &mut Vec<Item>) {
    if items.is_empty() {
        return;
    }
    while items.len() < PSYCHOLOGY_MINIMUM {
        let title = PLACEHOLDER_TITLES[items.len() % PLACEHOLDER_TITLES.len()];
        items.push(Item::placeholder(title));
    }
}
