use serde_json::{Map, Value};

use super::sections::normalize_section_items;
use super::sources::normalize_receipts;
use crate::analysis::model::{AccessibilityExtras, Item, MetadataValue};
use crate::observe::{NormalizeEvent, Observer};
use crate::text::numeric::{clamp_contrast_score, parse_score};
use crate::text::sanitize::{as_string, as_string_array, first_string};

const ACCESSIBILITY_INSIGHT: &str = "Accessibility Insight";

/// Accessibility items plus the record-level extras that sit beside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessibilityOutcome {
    pub items: Vec<Item>,
    pub extras: AccessibilityExtras,
}

pub fn normalize_accessibility(value: &Value, observer: &dyn Observer) -> AccessibilityOutcome {
    match value {
        Value::Array(entries) => AccessibilityOutcome {
            items: items_from_array(value, entries, observer),
            extras: AccessibilityExtras::default(),
        },
        Value::Object(record) => AccessibilityOutcome {
            items: record
                .get("categories")
                .and_then(Value::as_array)
                .map(|cats| cats.iter().filter_map(Value::as_object).map(category_item).collect())
                .unwrap_or_default(),
            extras: extras(record),
        },
        _ => AccessibilityOutcome::default(),
    }
}

fn items_from_array(value: &Value, entries: &[Value], observer: &dyn Observer) -> Vec<Item> {
    let mut items = normalize_section_items(value, ACCESSIBILITY_INSIGHT);

    let bare: Vec<String> = entries.iter().filter_map(as_string).collect();
    if bare.is_empty() {
        return items;
    }

    observer.observe(&NormalizeEvent::BareAccessibilityEntries { count: bare.len() });
    let numbered = bare.len() > 1;
    items.extend(bare.into_iter().enumerate().map(|(idx, text)| Item {
        title: if numbered {
            format!("{ACCESSIBILITY_INSIGHT} {}", idx + 1)
        } else {
            ACCESSIBILITY_INSIGHT.to_string()
        },
        description: Some(text),
        ..Default::default()
    }));
    items
}

fn extras(record: &Map<String, Value>) -> AccessibilityExtras {
    AccessibilityExtras {
        contrast_score: record.get("contrastScore").and_then(clamp_contrast_score),
        summary: first_string(record, &["summary"]),
        issues: record.get("issues").map(as_string_array).unwrap_or_default(),
        recommendations: record
            .get("recommendations")
            .map(as_string_array)
            .unwrap_or_default(),
        sources: record.get("sources").map(normalize_receipts).unwrap_or_default(),
    }
}

fn category_item(category: &Map<String, Value>) -> Item {
    let mut item = Item::placeholder(
        first_string(category, &["title", "id"]).unwrap_or_else(|| ACCESSIBILITY_INSIGHT.to_string()),
    );
    item.severity = first_string(category, &["status"]);
    item.score = category.get("score").and_then(parse_score);

    let mut lines: Vec<String> = first_string(category, &["summary"]).into_iter().collect();
    for (key, label) in [
        ("checks", "Checks"),
        ("issues", "Issues"),
        ("recommendations", "Recommendations"),
    ] {
        let entries = category.get(key).map(as_string_array).unwrap_or_default();
        if entries.is_empty() {
            continue;
        }
        lines.push(format!("{label}: {}", entries.join("; ")));
        item.metadata
            .insert(key.to_string(), MetadataValue::List(entries));
    }
    item.description = (!lines.is_empty()).then(|| lines.join("\n"));
    item
}
