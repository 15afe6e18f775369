use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical, render-ready result of normalizing one analysis payload.
///
/// Built once per payload by `normalize::normalize_analysis` and never
/// mutated afterwards. A new payload produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_note: Option<String>,

    /// Citations merged from the top level and from nested sections.
    pub receipts: Vec<Source>,
    pub copywriting: Copywriting,
    pub accessibility_extras: AccessibilityExtras,

    /// Always the ten canonical headings in fixed order, then extras.
    pub heuristics: Vec<Item>,
    pub accessibility: Vec<Item>,
    pub psychology: Vec<Item>,
    pub impact: Vec<Item>,

    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendation_chips: Vec<RecommendationChips>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub flows: Vec<String>,
    pub industries: Vec<String>,
    pub ui_elements: Vec<String>,
    pub psychology_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_title: Option<String>,
    pub suggested_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_version: Option<String>,
}

/// One entry of a section list (heuristic, psychology insight, impact area...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// In `[1, 5]`, rounded to one decimal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl Item {
    /// Title-only item with no body.
    pub fn placeholder(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// True when the item carries nothing besides its title.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.severity.is_none()
            && self.score.is_none()
            && self.metadata.is_empty()
    }

    /// Description split into its individual lines.
    pub fn description_lines(&self) -> impl Iterator<Item = &str> {
        self.description
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

/// A citation backing a claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Copywriting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub guidance: Vec<String>,
    pub sources: Vec<Source>,
    pub sections: Vec<Section>,
}

/// A copywriting block split into display paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityExtras {
    /// Clamped to `[1, 5]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Chip values pulled from the bracket metadata of one recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationChips {
    /// The sanitized recommendation these chips belong to.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<String>,
}

impl RecommendationChips {
    pub fn is_empty(&self) -> bool {
        self.impact.is_none() && self.effort.is_none() && self.refs.is_empty()
    }
}
