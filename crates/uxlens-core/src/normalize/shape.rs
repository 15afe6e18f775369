//! Payload shape classification and candidate collection.
//!
//! The analysis service returns the same concept as an array, an object keyed
//! by slug, an object wrapping an array, or a bare string. Every section is
//! first classified into a [`SectionShape`] and candidates are then pulled out
//! by one walker, so field extraction never has to guess at structure.

use serde_json::{Map, Value};

use crate::text::case::humanize_key;

/// Keys under which a wrapper object holds its real list.
pub const COLLECTION_KEYS: &[&str] = &["items", "entries", "list", "values", "heuristics"];

/// A string under any of these names marks an object as a single record.
/// Slug-keyed maps never carry one.
pub const RECORD_TITLE_KEYS: &[&str] = &["title", "name", "heuristic"];

#[derive(Debug, Clone, Copy)]
pub enum SectionShape<'a> {
    Records(&'a [Value]),
    Keyed(&'a Map<String, Value>),
    Plain(&'a str),
    Absent,
}

pub fn classify(value: &Value) -> SectionShape<'_> {
    match value {
        Value::Array(items) => SectionShape::Records(items),
        Value::Object(map) => SectionShape::Keyed(map),
        Value::String(s) if !s.trim().is_empty() => SectionShape::Plain(s),
        _ => SectionShape::Absent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateRecord<'a> {
    Object(&'a Map<String, Value>),
    Text(&'a str),
}

/// A not-yet-validated record pulled out of a section payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub record: CandidateRecord<'a>,
    /// Title implied by the key the record was found under, if any.
    pub fallback_title: Option<String>,
}

impl<'a> Candidate<'a> {
    fn new(record: CandidateRecord<'a>, fallback_title: Option<String>) -> Self {
        Self {
            record,
            fallback_title,
        }
    }

    pub fn as_object(&self) -> Option<&'a Map<String, Value>> {
        match self.record {
            CandidateRecord::Object(map) => Some(map),
            CandidateRecord::Text(_) => None,
        }
    }
}

/// How deep and by which markers a section's candidates are searched.
#[derive(Debug, Clone, Copy)]
pub struct CandidateQuery {
    pub collection_keys: &'static [&'static str],
    /// A keyed object holding any of these is itself a candidate.
    pub marker_keys: &'static [&'static str],
    /// Levels of keyed nesting searched below the first keyed object.
    pub nested_depth: usize,
}

impl CandidateQuery {
    fn looks_like_candidate(&self, map: &Map<String, Value>) -> bool {
        self.marker_keys.iter().any(|k| map.contains_key(*k))
    }

    /// Titled and not wrapping one of the collection lists.
    fn is_lone_record(&self, map: &Map<String, Value>) -> bool {
        let titled = RECORD_TITLE_KEYS
            .iter()
            .any(|k| map.get(*k).is_some_and(Value::is_string));
        let wraps_list = self
            .collection_keys
            .iter()
            .any(|k| map.get(*k).is_some_and(Value::is_array));
        titled && !wraps_list
    }
}

/// Collect every candidate record from `value`, in payload order.
pub fn collect_candidates<'a>(value: &'a Value, query: &CandidateQuery) -> Vec<Candidate<'a>> {
    let mut out = Vec::new();
    match classify(value) {
        SectionShape::Records(items) => push_records(items, None, &mut out),
        SectionShape::Keyed(map) if query.is_lone_record(map) => {
            out.push(Candidate::new(CandidateRecord::Object(map), None));
        }
        SectionShape::Keyed(map) => {
            collect_keyed(map, query, query.nested_depth, &mut out);
            // An untitled record that is not keyed by slug at all.
            if out.is_empty() && query.looks_like_candidate(map) {
                out.push(Candidate::new(CandidateRecord::Object(map), None));
            }
        }
        SectionShape::Plain(text) => out.push(Candidate::new(CandidateRecord::Text(text), None)),
        SectionShape::Absent => {}
    }
    out
}

fn collect_keyed<'a>(
    map: &'a Map<String, Value>,
    query: &CandidateQuery,
    depth: usize,
    out: &mut Vec<Candidate<'a>>,
) {
    for key in query.collection_keys {
        if let Some(Value::Array(items)) = map.get(*key) {
            push_records(items, None, out);
        }
    }

    for (key, value) in map {
        let is_wrapper_list =
            query.collection_keys.contains(&key.as_str()) && value.is_array();
        if is_wrapper_list {
            continue;
        }
        match value {
            Value::Array(items) => push_records(items, Some(key.clone()), out),
            Value::Object(inner) if query.looks_like_candidate(inner) => out.push(Candidate::new(
                CandidateRecord::Object(inner),
                Some(humanize_key(key)),
            )),
            Value::Object(inner) if depth > 0 => collect_keyed(inner, query, depth - 1, out),
            _ => {}
        }
    }
}

fn push_records<'a>(items: &'a [Value], fallback: Option<String>, out: &mut Vec<Candidate<'a>>) {
    for item in items {
        match item {
            Value::Object(map) => {
                out.push(Candidate::new(CandidateRecord::Object(map), fallback.clone()))
            }
            Value::String(text) if !text.trim().is_empty() => {
                out.push(Candidate::new(CandidateRecord::Text(text), fallback.clone()))
            }
            _ => {}
        }
    }
}

/// Top-level keys of a keyed payload, for shape diagnostics.
pub fn keyed_shape_keys(value: &Value) -> Option<Vec<String>> {
    match classify(value) {
        SectionShape::Keyed(map) => Some(map.keys().cloned().collect()),
        _ => None,
    }
}
