use serde_json::{Map, Value};

use super::sections::normalize_section_items;
use crate::analysis::model::{Item, MetadataValue};
use crate::text::sanitize::{as_string_array, first_string};

const IMPACT_FALLBACK: &str = "Impact";

/// An `Overview` item from the summary followed by one item per impact area.
/// Arrays go through the generic section normalizer instead.
pub fn normalize_impact(value: &Value) -> Vec<Item> {
    match value {
        Value::Array(_) => normalize_section_items(value, IMPACT_FALLBACK),
        Value::Object(record) => {
            let overview = first_string(record, &["summary"]).map(|summary| Item {
                title: "Overview".to_string(),
                description: Some(summary),
                ..Default::default()
            });
            let areas = record
                .get("areas")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_object)
                .filter_map(area_item);
            overview.into_iter().chain(areas).collect()
        }
        _ => Vec::new(),
    }
}

fn area_item(area: &Map<String, Value>) -> Option<Item> {
    let category = first_string(area, &["category"]);

    let mut lines: Vec<String> = first_string(area, &["summary"]).into_iter().collect();
    let recommendations = area
        .get("recommendations")
        .map(as_string_array)
        .unwrap_or_default();
    if !recommendations.is_empty() {
        lines.push(format!("Next Steps: {}", recommendations.join("; ")));
    }

    if category.is_none() && lines.is_empty() {
        return None;
    }

    let mut item = Item::placeholder(category.clone().unwrap_or_else(|| IMPACT_FALLBACK.to_string()));
    item.severity = first_string(area, &["severity"]);
    item.description = (!lines.is_empty()).then(|| lines.join("\n"));
    if let Some(category) = category {
        item.metadata
            .insert("category".to_string(), MetadataValue::Text(category));
    }
    Some(item)
}
