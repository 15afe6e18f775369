use super::bracket::{Segment, priority_tag, scan_brackets, split_label, split_top_level_commas};
use crate::analysis::model::RecommendationChips;
use crate::text::sanitize::clean_text;
use crate::util::deterministic::push_unique;

/// Impact, effort and reference chips from a raw recommendation's bracket
/// metadata. `text` is left empty for the caller to fill.
///
/// Only allowlisted labels produce chips. The first `impact` and `effort`
/// win; refs accumulate. Priority blocks are searched too.
pub fn extract_chips(raw: &str) -> RecommendationChips {
    let mut chips = RecommendationChips::default();
    collect(raw, &mut chips);
    chips
}

fn collect(text: &str, chips: &mut RecommendationChips) {
    for segment in scan_brackets(text) {
        let Segment::Block(content) = segment else {
            continue;
        };
        let Some((label, value)) = split_label(content) else {
            continue;
        };
        if priority_tag(label).is_some() {
            collect(value, chips);
            continue;
        }

        match label.to_lowercase().as_str() {
            "impact" => {
                if chips.impact.is_none() {
                    chips.impact = clean_text(value);
                }
            }
            "effort" => {
                if chips.effort.is_none() {
                    chips.effort = clean_text(value);
                }
            }
            "refs" | "ref" | "references" => {
                for reference in split_top_level_commas(value).into_iter().filter_map(clean_text) {
                    push_unique(&mut chips.refs, reference);
                }
            }
            _ => {}
        }
    }
}
