//! Citation ("receipt") normalization and deduplication.

use serde_json::{Map, Value};

use super::heuristics::HEURISTIC_QUERY;
use super::psychology::{PSYCHOLOGY_BUCKETS, PSYCHOLOGY_QUERY};
use super::shape::collect_candidates;
use crate::analysis::model::Source;
use crate::text::numeric::coerce_year;
use crate::text::sanitize::first_string;
use crate::util::deterministic::dedupe_by_key;

/// Normalize an array of citation objects.
///
/// Entries need a `title` or a `url`; a missing title falls back to the url.
/// Anything else is dropped.
pub fn normalize_receipts(value: &Value) -> Vec<Source> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .filter_map(normalize_source)
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_source(record: &Map<String, Value>) -> Option<Source> {
    let url = first_string(record, &["url", "href", "link"]);
    let title = first_string(record, &["title", "name"]).or_else(|| url.clone())?;

    Some(Source {
        title,
        url,
        domain_tier: first_string(record, &["domainTier", "domain_tier", "tier"]),
        used_for: first_string(record, &["usedFor", "used_for"]),
        published_year: ["publishedYear", "published_year", "year"]
            .iter()
            .find_map(|k| record.get(*k).and_then(coerce_year)),
    })
}

/// Harvest `sources[]` nested inside heuristic records, impact areas and
/// psychology entries, in that order.
pub fn gather_section_sources(raw: &Value) -> Vec<Source> {
    let mut out = Vec::new();

    if let Some(heuristics) = raw.get("heuristics") {
        for candidate in collect_candidates(heuristics, &HEURISTIC_QUERY) {
            if let Some(record) = candidate.as_object() {
                out.extend(record_sources(record));
            }
        }
    }

    if let Some(Value::Array(areas)) = raw.pointer("/impact/areas") {
        for area in areas.iter().filter_map(Value::as_object) {
            out.extend(record_sources(area));
        }
    }

    if let Some(psychology) = raw.get("psychology") {
        for (key, _) in PSYCHOLOGY_BUCKETS {
            let Some(bucket) = psychology.get(*key) else {
                continue;
            };
            for candidate in collect_candidates(bucket, &PSYCHOLOGY_QUERY) {
                if let Some(record) = candidate.as_object() {
                    out.extend(record_sources(record));
                }
            }
        }
    }

    out
}

fn record_sources(record: &Map<String, Value>) -> Vec<Source> {
    record.get("sources").map(normalize_receipts).unwrap_or_default()
}

/// Keep the first source per case-insensitive `title|url` pair.
pub fn dedupe_sources(sources: Vec<Source>) -> Vec<Source> {
    dedupe_by_key(sources, |s| {
        format!(
            "{}|{}",
            s.title.to_lowercase(),
            s.url.as_deref().unwrap_or_default().to_lowercase()
        )
    })
}
