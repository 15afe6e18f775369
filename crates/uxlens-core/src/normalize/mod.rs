//! Normalization of raw analysis payloads into [`StructuredAnalysis`].
//!
//! Every function in this module is total: absent, `null` or wrongly typed
//! fields read as "no data" and never fail. Diagnostics go through an
//! [`Observer`] and never change the result.

pub mod accessibility;
pub mod bracket;
pub mod canonical;
pub mod chips;
pub mod copywriting;
pub mod evidence;
pub mod heuristics;
pub mod impact;
pub mod meta;
pub mod psychology;
pub mod recommendations;
pub mod sections;
pub mod shape;
pub mod sources;

use serde_json::Value;

use crate::analysis::model::StructuredAnalysis;
use crate::observe::{Observer, TracingObserver};
use crate::text::sanitize::{as_string, as_string_array};

use self::accessibility::normalize_accessibility;
use self::copywriting::normalize_copywriting;
use self::evidence::count_observation_tokens;
use self::heuristics::normalize_heuristics;
use self::impact::normalize_impact;
use self::meta::{normalize_confidence, normalize_prompt_version};
use self::psychology::normalize_psychology;
use self::recommendations::{
    CrossSection, aggregate_recommendations, normalize_recommendations, recommendation_chips,
};
use self::sources::{dedupe_sources, gather_section_sources, normalize_receipts};

/// Top-level keys whose array form marks a value as the analysis itself.
const ANALYSIS_SECTIONS: &[&str] = &[
    "heuristics",
    "accessibility",
    "psychology",
    "impact",
    "recommendations",
];

static NULL: Value = Value::Null;

/// The analysis object inside a response envelope.
///
/// A value exposing any analysis section as an array is used as-is. Otherwise
/// a nested `analysis` object is preferred, falling back to the value itself.
pub fn unwrap_analysis_payload(value: &Value) -> &Value {
    let exposes_sections = ANALYSIS_SECTIONS
        .iter()
        .any(|key| value.get(*key).is_some_and(Value::is_array));
    if exposes_sections {
        return value;
    }
    match value.get("analysis") {
        Some(inner @ Value::Object(_)) => inner,
        _ => value,
    }
}

pub fn normalize_analysis(raw: &Value) -> StructuredAnalysis {
    normalize_analysis_with(raw, &TracingObserver)
}

pub fn normalize_analysis_with(raw: &Value, observer: &dyn Observer) -> StructuredAnalysis {
    let heuristics = normalize_heuristics(field(raw, "heuristics"), observer);
    let accessibility = normalize_accessibility(field(raw, "accessibility"), observer);
    let psychology = normalize_psychology(field(raw, "psychology"), observer);
    let impact = normalize_impact(field(raw, "impact"));

    let explicit = field(raw, "recommendations");
    let recommendations = aggregate_recommendations(
        normalize_recommendations(explicit, observer),
        &CrossSection {
            psychology: &psychology,
            impact: &impact,
            heuristics: &heuristics,
            accessibility_recommendations: &accessibility.extras.recommendations,
        },
        observer,
    );

    let mut receipts = normalize_receipts(field(raw, "receipts"));
    receipts.extend(gather_section_sources(raw));

    let obs_count = count_observation_tokens(raw);

    StructuredAnalysis {
        summary: as_string(field(raw, "summary")),
        scope_note: as_string(field(raw, "scopeNote")),
        receipts: dedupe_sources(receipts),
        copywriting: normalize_copywriting(field(raw, "copywriting")),
        accessibility_extras: accessibility.extras,
        heuristics,
        accessibility: accessibility.items,
        psychology,
        impact,
        recommendations,
        recommendation_chips: recommendation_chips(explicit),
        content_type: as_string(field(raw, "contentType")),
        flows: as_string_array(field(raw, "flows")),
        industries: as_string_array(field(raw, "industries")),
        ui_elements: as_string_array(field(raw, "uiElements")),
        psychology_tags: as_string_array(field(raw, "psychologyTags")),
        suggested_title: as_string(field(raw, "suggestedTitle")),
        suggested_tags: as_string_array(field(raw, "suggestedTags")),
        suggested_collection: as_string(field(raw, "suggestedCollection")),
        confidence: normalize_confidence(field(raw, "confidence")),
        obs_count: (obs_count > 0).then_some(obs_count),
        prompt_version: normalize_prompt_version(field(raw, "promptVersion")),
    }
}

fn field<'a>(raw: &'a Value, key: &str) -> &'a Value {
    raw.get(key).unwrap_or(&NULL)
}
