use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static OBS_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bOBS-\d+\b").unwrap());

/// Number of `OBS-<n>` evidence anchors across every string leaf of `value`.
/// Object keys are not counted.
pub fn count_observation_tokens(value: &Value) -> usize {
    match value {
        Value::String(s) => OBS_ANCHOR.find_iter(s).count(),
        Value::Array(items) => items.iter().map(count_observation_tokens).sum(),
        Value::Object(map) => map.values().map(count_observation_tokens).sum(),
        _ => 0,
    }
}
