//! Recommendation text sanitation and cross-section aggregation.
//!
//! Recommendation strings carry bracketed metadata (`[impact:high]`,
//! `[Refs: heuristics[9]]`), priority tags and trailing footers such as
//! `Validation: ...`. Sanitizing drops the metadata, canonicalizes the
//! priority tags and normalizes the footers so the text can be shown as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::bracket::{Segment, priority_tag, scan_brackets, split_label};
use super::chips::extract_chips;
use crate::analysis::model::{Item, RecommendationChips};
use crate::observe::{NormalizeEvent, Observer, SilentObserver, TracingObserver};
use crate::text::sanitize::{as_string, as_string_array, first_string, strip_observation_tokens};
use crate::util::deterministic::{dedupe_by_key, dedupe_preserving_order};

/// Upper bound on sanitize passes before the text is considered settled.
const MAX_PASSES: usize = 16;

pub const FOOTER_LABELS: &[&str] = &[
    "Validation",
    "Rationale",
    "Evidence",
    "Observation",
    "Outcome",
    "Note",
];

static LEADING_IMPACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*impact\s*:\s*").unwrap());

static LEADING_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s,;:|\-\u{2013}\u{2014}]+").unwrap());

static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:^|[.!?;]\s+|\n\s*)(?P<label>{})\s*(?::|-\s)\s*",
        FOOTER_LABELS.join("|")
    ))
    .unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([,.;:!?])").unwrap());

static NEXT_STEPS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Next\s+Steps:\s*(.*)$").unwrap());

static RECOMMENDATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Recommendation:\s*(.*)$").unwrap());

/// Sanitize one recommendation string for display.
///
/// Idempotent: sanitizing the output again returns it unchanged.
pub fn sanitize_recommendation_text(raw: &str) -> String {
    sanitize_recommendation_text_with(raw, &TracingObserver)
}

pub fn sanitize_recommendation_text_with(raw: &str, observer: &dyn Observer) -> String {
    let mut current = sanitize_pass(raw, observer);
    // Later passes only settle text the first pass exposed; their events
    // would repeat the first pass's.
    for _ in 0..MAX_PASSES {
        let next = sanitize_pass(&current, &SilentObserver);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn sanitize_pass(text: &str, observer: &dyn Observer) -> String {
    // Bracket and separator removal can expose new tokens or empty parens.
    let text = strip_observation_tokens(text);
    let rewritten = rewrite_brackets(&text, observer);
    let body = strip_leading_fragments(&rewritten);
    let (body, footers) = split_footers(&body);

    let mut out = tidy(&body);
    for (label, value) in footers {
        let value = tidy(&value);
        if value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("{label}: {value}"));
    }
    out
}

/// Drop labelled metadata blocks, canonicalize priority blocks and keep
/// unlabelled blocks verbatim.
fn rewrite_brackets(text: &str, observer: &dyn Observer) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in scan_brackets(text) {
        match segment {
            Segment::Text(t) => out.push_str(t),
            Segment::Block(content) => match split_label(content) {
                Some((label, rest)) => {
                    if let Some(tag) = priority_tag(label) {
                        out.push_str(tag);
                        out.push(' ');
                        out.push_str(&rewrite_brackets(rest, observer));
                    }
                    out.push(' ');
                }
                None => match priority_tag(content) {
                    Some(tag) => out.push_str(tag),
                    None => {
                        out.push('[');
                        out.push_str(content);
                        out.push(']');
                    }
                },
            },
            Segment::Unterminated { offset, rest } => {
                observer.observe(&NormalizeEvent::UnterminatedBracket {
                    text: text.to_string(),
                    offset,
                });
                out.push_str(rest);
            }
        }
    }
    out
}

fn strip_leading_fragments(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let without_impact = LEADING_IMPACT.replace(&current, "");
        let stripped = LEADING_SEPARATORS.replace(&without_impact, "").into_owned();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

/// Peel `Label: value` footers off the end, returning them in original order.
fn split_footers(text: &str) -> (String, Vec<(String, String)>) {
    let mut body = text.trim_end().to_string();
    let mut footers = Vec::new();

    while let Some((cut, label, value)) = last_footer(&body) {
        footers.push((label, value));
        body = body[..cut].trim_end().to_string();
    }

    footers.reverse();
    (body, footers)
}

/// Byte offset, label and value of the final footer. A footer needs a body in
/// front of it and a non-empty value.
fn last_footer(body: &str) -> Option<(usize, String, String)> {
    let caps = FOOTER.captures_iter(body).last()?;
    let whole = caps.get(0)?;
    let label = caps.name("label")?;
    if label.start() == 0 {
        return None;
    }
    let value = body[whole.end()..].trim();
    if value.is_empty() {
        return None;
    }
    Some((label.start(), label.as_str().to_string(), value.to_string()))
}

fn tidy(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    SPACE_BEFORE_PUNCT
        .replace_all(&collapsed, "$1")
        .trim()
        .to_string()
}

/// Sanitized, deduplicated explicit recommendations.
///
/// Arrays are taken entry by entry. Objects with `priority`, `immediate[]`
/// and `longTerm[]` become an `Overall priority:` line followed by tagged
/// `[Immediate]` and `[Long-term]` entries.
pub fn normalize_recommendations(value: &Value, observer: &dyn Observer) -> Vec<String> {
    dedupe_preserving_order(
        explicit_entries(value)
            .iter()
            .map(|raw| sanitize_recommendation_text_with(raw, observer))
            .filter(|s| !s.is_empty()),
    )
}

/// Chip metadata for each explicit recommendation that carries any.
pub fn recommendation_chips(value: &Value) -> Vec<RecommendationChips> {
    let chips = explicit_entries(value).into_iter().filter_map(|raw| {
        let mut chips = extract_chips(&raw);
        if chips.is_empty() {
            return None;
        }
        chips.text = sanitize_recommendation_text_with(&raw, &SilentObserver);
        (!chips.text.is_empty()).then_some(chips)
    });
    dedupe_by_key(chips, |c| c.text.clone())
}

/// Raw explicit entries, priority-tagged but not yet sanitized.
fn explicit_entries(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(entry_text).collect(),
        Value::String(_) => as_string(value).into_iter().collect(),
        Value::Object(record) => {
            let mut out = Vec::new();
            if let Some(priority) = first_string(record, &["priority"]) {
                out.push(format!("Overall priority: {priority}"));
            }
            for (keys, tag) in [
                (&["immediate"][..], "[Immediate]"),
                (&["longTerm", "long_term"][..], "[Long-term]"),
            ] {
                for key in keys {
                    let entries = record.get(*key).map(as_string_array).unwrap_or_default();
                    out.extend(entries.into_iter().map(|e| tagged(tag, e)));
                }
            }
            out
        }
        _ => Vec::new(),
    }
}

fn entry_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => as_string(value),
        Value::Object(record) => first_string(
            record,
            &["text", "recommendation", "title", "summary", "description"],
        ),
        _ => None,
    }
}

fn tagged(tag: &str, text: String) -> String {
    if text.to_lowercase().starts_with(&tag.to_lowercase()) {
        text
    } else {
        format!("{tag} {text}")
    }
}

/// `Next Steps:` / `Recommendation:` fragments from item descriptions,
/// split on `"; "` and sanitized.
pub fn harvest_next_steps(items: &[Item], observer: &dyn Observer) -> Vec<String> {
    items
        .iter()
        .flat_map(Item::description_lines)
        .filter_map(|line| {
            NEXT_STEPS_LINE
                .captures(line)
                .or_else(|| RECOMMENDATION_LINE.captures(line))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
        .flat_map(|rest| rest.split("; "))
        .map(|fragment| sanitize_recommendation_text_with(fragment, observer))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalized sections whose next steps feed the recommendation list.
#[derive(Debug, Clone, Copy)]
pub struct CrossSection<'a> {
    pub psychology: &'a [Item],
    pub impact: &'a [Item],
    pub heuristics: &'a [Item],
    pub accessibility_recommendations: &'a [String],
}

/// Merge explicit recommendations with next steps harvested from the other
/// sections, in fixed precedence, without repeating any string.
pub fn aggregate_recommendations(
    base: Vec<String>,
    sections: &CrossSection<'_>,
    observer: &dyn Observer,
) -> Vec<String> {
    let harvested = [sections.psychology, sections.impact, sections.heuristics]
        .into_iter()
        .flat_map(|items| harvest_next_steps(items, observer));
    let accessibility = sections
        .accessibility_recommendations
        .iter()
        .map(|r| sanitize_recommendation_text_with(r, observer))
        .filter(|s| !s.is_empty());

    dedupe_preserving_order(base.into_iter().chain(harvested).chain(accessibility))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::CollectingObserver;
    use serde_json::json;

    fn sanitize(raw: &str) -> String {
        sanitize_recommendation_text_with(raw, &SilentObserver)
    }

    #[test]
    fn removes_metadata_blocks_including_nested_refs() {
        assert_eq!(
            sanitize(
                "[impact:medium][effort:low][Refs: heuristics[9], impact:Anxiety] Restore a visible focus indicator on the primary CTA."
            ),
            "Restore a visible focus indicator on the primary CTA."
        );
    }

    #[test]
    fn relabels_priority_blocks() {
        assert_eq!(
            sanitize("[Immediate Actions: Add inline validation] [effort:low]"),
            "[Immediate] Add inline validation"
        );
        assert_eq!(
            sanitize("[long term: Build a design system]"),
            "[Long-term] Build a design system"
        );
        assert_eq!(sanitize("[immediate] Fix it"), "[Immediate] Fix it");
    }

    #[test]
    fn nested_metadata_inside_priority_block_is_dropped() {
        assert_eq!(
            sanitize("[Immediate: Fix contrast [Refs: a[1]]]"),
            "[Immediate] Fix contrast"
        );
    }

    #[test]
    fn priority_tag_followed_by_refs_keeps_tag_and_chips() {
        let raw = "[Immediate][Refs: a[1]] Fix focus";
        assert_eq!(sanitize(raw), "[Immediate] Fix focus");

        let chips = recommendation_chips(&json!([raw]));
        assert_eq!(chips[0].text, "[Immediate] Fix focus");
        assert_eq!(chips[0].refs, vec!["a[1]"]);
    }

    #[test]
    fn unlabelled_blocks_are_preserved() {
        assert_eq!(
            sanitize("Follow step [3] of the checklist"),
            "Follow step [3] of the checklist"
        );
    }

    #[test]
    fn unterminated_bracket_is_logged_and_kept() {
        let observer = CollectingObserver::new();
        let out = sanitize_recommendation_text_with("Shorten the form [effort: low", &observer);
        assert_eq!(out, "Shorten the form [effort: low");

        let events = observer.into_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            NormalizeEvent::UnterminatedBracket { offset: 17, .. }
        ));
    }

    #[test]
    fn strips_leading_impact_fragment_and_separators() {
        assert_eq!(sanitize("impact: - Reduce steps"), "Reduce steps");
        assert_eq!(sanitize(" ;  Reduce steps"), "Reduce steps");
    }

    #[test]
    fn footers_are_normalized_in_original_order() {
        assert_eq!(
            sanitize("Add a progress bar. Rationale - users abandon uploads.   Validation:  track completion."),
            "Add a progress bar. Rationale: users abandon uploads. Validation: track completion."
        );
    }

    #[test]
    fn footer_on_its_own_line_is_reattached() {
        assert_eq!(
            sanitize("Add undo to delete.\nOutcome: fewer support tickets"),
            "Add undo to delete. Outcome: fewer support tickets"
        );
    }

    #[test]
    fn leading_footer_label_is_body_text() {
        assert_eq!(
            sanitize("Evidence-based copy tweaks"),
            "Evidence-based copy tweaks"
        );
        assert_eq!(sanitize("Note: keep it short"), "Note: keep it short");
    }

    #[test]
    fn collapses_whitespace_and_fixes_punctuation_spacing() {
        assert_eq!(sanitize("Use  clear\tlabels ,  always ."), "Use clear labels, always.");
    }

    #[test]
    fn strips_observation_tokens() {
        assert_eq!(sanitize("Add skip link (OBS-12)."), "Add skip link.");
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let inputs = [
            "[impact:medium][effort:low][Refs: heuristics[9], impact:Anxiety] Restore a visible focus indicator on the primary CTA.",
            "[Immediate: Fix contrast [Refs: a[1]]] Validation - rerun audit",
            "impact: impact: [long term: x] y. Note: z. Outcome: w",
            "Shorten the form [effort: low",
            "Follow step [3] [see: x]of the checklist ,",
            "[a [b] c] d",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn sanitizing_generated_text_is_idempotent() {
        const FRAGMENTS: &[&str] = &[
            "[", "]", "[impact:high]", "[Immediate:", "[long term]", "Note:", "Validation - ",
            "effort:low", "OBS-1", "OBS-12", "(", ")", "(OBS-3)", ",", " ", ". ", "\n", "x", "Y",
            "impact:", "; ", "|", "-", "a[1]", "Refs:", "?", "! ",
        ];
        // xorshift64, fixed seed so failures reproduce.
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move |bound: usize| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % bound as u64) as usize
        };

        for _ in 0..20_000 {
            let len = 1 + next(10);
            let raw: String = (0..len).map(|_| FRAGMENTS[next(FRAGMENTS.len())]).collect();

            let stripped = strip_observation_tokens(&raw);
            assert_eq!(strip_observation_tokens(&stripped), stripped, "strip: {raw:?}");

            let once = sanitize(&raw);
            assert_eq!(sanitize(&once), once, "sanitize: {raw:?}");
        }
    }

    #[test]
    fn text_with_glued_token_settles_in_one_call() {
        let once = sanitize("long term(\n)Noteeffort:lowOBS-1");
        assert_eq!(once, "long term( )Noteeffort:lowOBS-1");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn array_recommendations_are_sanitized_and_deduplicated() {
        let recs = normalize_recommendations(
            &json!([
                "[impact:high] Add labels",
                "Add labels",
                {"text": "Raise contrast"},
                "   ",
                "[effort:low]",
                42
            ]),
            &SilentObserver,
        );
        assert_eq!(recs, vec!["Add labels", "Raise contrast"]);
    }

    #[test]
    fn priority_object_is_tagged() {
        let recs = normalize_recommendations(
            &json!({
                "priority": "High",
                "immediate": ["Fix focus ring", "[Immediate] Add alt text"],
                "longTerm": ["Adopt tokens [effort:high]"]
            }),
            &SilentObserver,
        );
        assert_eq!(
            recs,
            vec![
                "Overall priority: High",
                "[Immediate] Fix focus ring",
                "[Immediate] Add alt text",
                "[Long-term] Adopt tokens",
            ]
        );
    }

    #[test]
    fn chips_are_reported_per_sanitized_text() {
        let chips = recommendation_chips(&json!([
            "[impact:medium][effort:low][Refs: heuristics[9], impact:Anxiety] Restore focus.",
            "No metadata here"
        ]));
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].text, "Restore focus.");
        assert_eq!(chips[0].impact.as_deref(), Some("medium"));
        assert_eq!(chips[0].effort.as_deref(), Some("low"));
        assert_eq!(chips[0].refs, vec!["heuristics[9]", "impact:Anxiety"]);
    }

    #[test]
    fn harvests_next_steps_and_recommendation_lines() {
        let items = vec![
            Item {
                title: "A".into(),
                description: Some(
                    "Summary\nNext Steps: Add logos; [effort:low] Quantify users\nRecommendation: Trim copy\nNext steps: ignored case"
                        .into(),
                ),
                ..Default::default()
            },
            Item::placeholder("B"),
        ];
        assert_eq!(
            harvest_next_steps(&items, &SilentObserver),
            vec!["Add logos", "Quantify users", "Trim copy"]
        );
    }

    #[test]
    fn aggregation_follows_precedence_and_dedupes() {
        let psychology = vec![Item {
            title: "P".into(),
            description: Some("Next Steps: Shared; Psych only".into()),
            ..Default::default()
        }];
        let impact = vec![Item {
            title: "I".into(),
            description: Some("Next Steps: Impact only".into()),
            ..Default::default()
        }];
        let heuristics = vec![Item {
            title: "H".into(),
            description: Some("Next Steps: Shared\nNext Steps: Heuristic only".into()),
            ..Default::default()
        }];
        let accessibility = vec!["Alt text (OBS-2)".to_string(), "Base".to_string()];

        let merged = aggregate_recommendations(
            vec!["Base".into(), "Shared".into()],
            &CrossSection {
                psychology: &psychology,
                impact: &impact,
                heuristics: &heuristics,
                accessibility_recommendations: &accessibility,
            },
            &SilentObserver,
        );

        assert_eq!(
            merged,
            vec![
                "Base",
                "Shared",
                "Psych only",
                "Impact only",
                "Heuristic only",
                "Alt text"
            ]
        );
    }
}
