//! Classification and provenance fields that sit beside the analysis sections.

use serde_json::Value;

use crate::analysis::model::Confidence;
use crate::text::sanitize::{as_string, first_string};

/// `None` unless a level or rationale survives trimming. A bare string is
/// taken as the level.
pub fn normalize_confidence(value: &Value) -> Option<Confidence> {
    let confidence = match value {
        Value::String(_) => Confidence {
            level: as_string(value),
            rationale: None,
        },
        Value::Object(record) => Confidence {
            level: first_string(record, &["level"]),
            rationale: first_string(record, &["rationale", "reason"]),
        },
        _ => return None,
    };
    (confidence.level.is_some() || confidence.rationale.is_some()).then_some(confidence)
}

/// Prompt version as text; numbers are rendered as written.
pub fn normalize_prompt_version(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        _ => as_string(value),
    }
}
