use serde_json::Value;

use crate::analysis::model::Item;
use crate::text::numeric::parse_score;
use crate::text::sanitize::{as_string_array, first_string};

/// Normalize a plain array of loosely-typed records into section items.
///
/// Non-object entries are dropped, as are records with neither a title nor a
/// description. Records without a title get `fallback_title`.
pub fn normalize_section_items(value: &Value, fallback_title: &str) -> Vec<Item> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| {
            let title = first_string(record, &["title", "name"]);

            let mut lines: Vec<String> = first_string(record, &["description", "summary"])
                .into_iter()
                .collect();
            if let Some(insights) = record.get("insights") {
                lines.extend(as_string_array(insights));
            }
            let description = (!lines.is_empty()).then(|| lines.join("\n"));

            if title.is_none() && description.is_none() {
                return None;
            }

            Some(Item {
                title: title.unwrap_or_else(|| fallback_title.to_string()),
                description,
                severity: first_string(record, &["severity", "intent", "status"]),
                score: record.get("score").and_then(parse_score),
                ..Default::default()
            })
        })
        .collect()
}
