use crate::TOOL_NAME;
use crate::analysis::model::{Item, Source};
use crate::report::model::Report;
use crate::text::numeric::format_score;

/// Plain-text summary of a report for terminals.
pub fn render_text(report: &Report) -> String {
    let analysis = &report.analysis;
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    out.push_str(&format!(
        "Payload: {} ({} bytes, {} {})\n",
        report.payload.path.as_deref().unwrap_or("<stdin>"),
        report.payload.size_bytes,
        report.payload.hash.algorithm,
        short_hash(&report.payload.hash.value),
    ));
    out.push_str(&format!("Status: {}\n", report.diagnostics.status));
    for warning in &report.diagnostics.warnings {
        out.push_str(&format!("  ! {warning}\n"));
    }
    if let Some(count) = report.diagnostics.obs_count {
        out.push_str(&format!("Evidence anchors: {count}\n"));
    }
    if let Some(summary) = &analysis.summary {
        out.push_str(&format!("Summary: {summary}\n"));
    }

    out.push_str("Heuristics:\n");
    for item in &analysis.heuristics {
        let mark = if item.is_empty() { ' ' } else { 'x' };
        out.push_str(&format!("  [{mark}] {}{}\n", item.title, qualifiers(item)));
    }

    push_items(&mut out, "Psychology", &analysis.psychology);
    push_items(&mut out, "Accessibility", &analysis.accessibility);
    if let Some(score) = analysis.accessibility_extras.contrast_score {
        out.push_str(&format!("  Contrast score: {score}/5\n"));
    }
    push_items(&mut out, "Impact", &analysis.impact);

    if !analysis.recommendations.is_empty() {
        out.push_str("Recommendations:\n");
        for rec in &analysis.recommendations {
            out.push_str(&format!("  - {rec}\n"));
        }
    }

    if !analysis.receipts.is_empty() {
        out.push_str("Receipts:\n");
        for source in &analysis.receipts {
            out.push_str(&format!("  - {}\n", receipt_line(source)));
        }
    }
    out
}

fn push_items(out: &mut String, heading: &str, items: &[Item]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{heading}:\n"));
    for item in items {
        out.push_str(&format!("  - {}{}\n", item.title, qualifiers(item)));
        if let Some(first) = item.description_lines().next() {
            out.push_str(&format!("      {first}\n"));
        }
    }
}

/// ` (high, 2/5)` style suffix, or nothing.
fn qualifiers(item: &Item) -> String {
    let parts: Vec<String> = item
        .severity
        .iter()
        .cloned()
        .chain(item.score.map(|s| format!("{}/5", format_score(s))))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn receipt_line(source: &Source) -> String {
    let mut line = source.title.clone();
    if let Some(year) = source.published_year {
        line.push_str(&format!(" ({year})"));
    }
    if let Some(url) = source.url.as_deref().filter(|u| *u != source.title) {
        line.push_str(&format!(" <{url}>"));
    }
    line
}

fn short_hash(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::StructuredAnalysis;
    use crate::normalize::normalize_analysis_with;
    use crate::observe::SilentObserver;
    use crate::report::model::{DiagnosticsInfo, PayloadHash, PayloadInfo, ToolInfo};
    use serde_json::json;

    fn report_for(analysis: StructuredAnalysis) -> Report {
        Report::new(
            ToolInfo {
                name: "uxlens".into(),
                version: "0.1.0".into(),
            },
            PayloadInfo {
                path: Some("audit.json".into()),
                size_bytes: 42,
                hash: PayloadHash {
                    algorithm: "sha256".into(),
                    value: "91eb060ae89c761643ca0931e6ba5383".into(),
                },
            },
            DiagnosticsInfo::ok(),
            analysis,
        )
    }

    #[test]
    fn renders_checklist_and_sections() {
        let analysis = normalize_analysis_with(
            &json!({
                "summary": "Checkout audit",
                "heuristics": [{"title": "Error prevention", "score": 2, "description": "No confirm step"}],
                "impact": {"areas": [{"category": "Conversion", "summary": "Drop-off at payment"}]},
                "recommendations": ["Add a confirm step"],
                "receipts": [{"title": "Baymard", "url": "https://baymard.com", "publishedYear": 2023}]
            }),
            &SilentObserver,
        );
        let text = render_text(&report_for(analysis));

        assert!(text.starts_with("uxlens 0.1.0\n"));
        assert!(text.contains("Payload: audit.json (42 bytes, sha256 91eb060ae89c)\n"));
        assert!(text.contains("Status: ok\n"));
        assert!(text.contains("Summary: Checkout audit\n"));
        assert!(text.contains("  [x] Error prevention (high, 2/5)\n"));
        assert!(text.contains("  [ ] Help and documentation\n"));
        assert!(text.contains("Impact:\n  - Conversion\n      Drop-off at payment\n"));
        assert!(text.contains("Recommendations:\n  - Add a confirm step\n"));
        assert!(text.contains("  - Baymard (2023) <https://baymard.com>\n"));
        assert!(!text.contains("Psychology:"));
    }

    #[test]
    fn empty_analysis_still_lists_headings() {
        let analysis = normalize_analysis_with(&json!({}), &SilentObserver);
        let text = render_text(&report_for(analysis));
        assert_eq!(text.matches("  [ ] ").count(), 10);
        assert!(!text.contains("Recommendations:"));
    }
}
