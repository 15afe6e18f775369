use serde_json::{Map, Value};

use super::sources::normalize_receipts;
use crate::analysis::model::{Copywriting, Section};
use crate::text::sanitize::{as_string_array, clean_text, first_string, split_into_paragraphs};

pub fn normalize_copywriting(value: &Value) -> Copywriting {
    let Some(record) = value.as_object() else {
        return Copywriting::default();
    };

    Copywriting {
        heading: first_string(record, &["heading", "title"]),
        summary: first_string(record, &["summary"]),
        guidance: record.get("guidance").map(as_string_array).unwrap_or_default(),
        sources: record.get("sources").map(normalize_receipts).unwrap_or_default(),
        sections: record
            .get("sections")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(section).collect())
            .unwrap_or_default(),
    }
}

fn section(value: &Value) -> Option<Section> {
    match value {
        Value::String(text) => {
            let paragraphs = paragraphs_of(clean_text(text));
            (!paragraphs.is_empty()).then_some(Section {
                heading: None,
                paragraphs,
            })
        }
        Value::Object(record) => section_from_record(record),
        _ => None,
    }
}

fn section_from_record(record: &Map<String, Value>) -> Option<Section> {
    let heading = first_string(record, &["heading", "title"]);

    // Pre-split paragraphs are taken as given.
    let mut paragraphs = record.get("paragraphs").map(as_string_array).unwrap_or_default();
    if paragraphs.is_empty() {
        paragraphs = paragraphs_of(first_string(record, &["body", "text", "content", "summary"]));
    }

    if heading.is_none() && paragraphs.is_empty() {
        return None;
    }
    Some(Section {
        heading,
        paragraphs,
    })
}

fn paragraphs_of(text: Option<String>) -> Vec<String> {
    text.map(|t| split_into_paragraphs(&t)).unwrap_or_default()
}
