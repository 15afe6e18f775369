use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use uxlens_core::analysis::model::MetadataValue;
use uxlens_core::normalize::canonical::CANONICAL_HEURISTICS;
use uxlens_core::report::model::{DiagnosticStatus, PayloadHash, PayloadInfo, Report, ToolInfo};

/// Path to the fixtures directory relative to the crate root.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "uxlens".into(),
        version: "0.1.0-test".into(),
    }
}

/// Runs the full inspect pipeline over a fixture file.
fn inspect_fixture(name: &str) -> Report {
    uxlens_core::inspect(&fixtures_dir().join(name), tool()).expect("inspect should succeed")
}

fn titles(items: &[uxlens_core::analysis::model::Item]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

#[test]
fn full_audit_is_unwrapped_and_normalized() {
    let report = inspect_fixture("full_audit.json");
    let analysis = &report.analysis;

    assert_eq!(report.diagnostics.status, DiagnosticStatus::Ok);
    assert!(report.diagnostics.warnings.is_empty());
    assert_eq!(analysis.summary.as_deref(), Some("Checkout flow audit."));
    assert_eq!(analysis.content_type.as_deref(), Some("flow"));
    assert_eq!(analysis.prompt_version.as_deref(), Some("2025-03"));
    assert_eq!(
        analysis.confidence.as_ref().and_then(|c| c.rationale.as_deref()),
        Some("Single session.")
    );
}

#[test]
fn full_audit_heuristics_follow_canonical_order() {
    let report = inspect_fixture("full_audit.json");
    let heuristics = &report.analysis.heuristics;

    assert_eq!(heuristics.len(), 11);
    assert_eq!(&titles(heuristics)[..10], &CANONICAL_HEURISTICS[..]);
    assert_eq!(heuristics[10].title, "Delight");

    let visibility = &heuristics[0];
    assert_eq!(visibility.score, Some(2.0));
    assert_eq!(visibility.severity.as_deref(), Some("high"));
    assert_eq!(
        visibility.description.as_deref(),
        Some("Spinner has no label.\nScore: 2/5")
    );
    assert_eq!(
        visibility.metadata.get("matchedTitles"),
        Some(&MetadataValue::List(vec!["Visibility of System Status".into()]))
    );

    assert_eq!(heuristics[4].severity.as_deref(), Some("medium"));
    assert!(heuristics[1].is_empty());
}

#[test]
fn full_audit_sections() {
    let report = inspect_fixture("full_audit.json");
    let analysis = &report.analysis;

    assert_eq!(
        titles(&analysis.psychology),
        vec!["Scarcity", "Loss aversion", "Psychology Insight"]
    );
    assert_eq!(analysis.psychology[0].severity.as_deref(), Some("negative"));

    assert_eq!(titles(&analysis.accessibility), vec!["contrast"]);
    assert_eq!(analysis.accessibility_extras.contrast_score, Some(2));

    assert_eq!(titles(&analysis.impact), vec!["Overview", "Conversion"]);
}

#[test]
fn full_audit_recommendations_and_chips() {
    let report = inspect_fixture("full_audit.json");
    let analysis = &report.analysis;

    assert_eq!(
        analysis.recommendations,
        vec![
            "Label the loading spinner",
            "[Long-term] Adopt a design system",
            "Offer guest checkout",
            "Confirm before deleting the cart",
            "Raise contrast on secondary buttons",
        ]
    );

    assert_eq!(analysis.recommendation_chips.len(), 1);
    let chips = &analysis.recommendation_chips[0];
    assert_eq!(chips.text, "Label the loading spinner");
    assert_eq!(chips.impact.as_deref(), Some("high"));
    assert_eq!(chips.effort.as_deref(), Some("medium"));
    assert_eq!(chips.refs, vec!["heuristics[1]"]);
}

#[test]
fn full_audit_receipts_and_evidence() {
    let report = inspect_fixture("full_audit.json");
    let receipts = &report.analysis.receipts;

    assert_eq!(receipts.len(), 2);
    assert_eq!(receipts[0].title, "NN/g");
    assert_eq!(receipts[1].title, "https://baymard.com/checkout");
    assert_eq!(receipts[1].published_year, Some(2024));

    assert_eq!(report.analysis.obs_count, Some(4));
    assert_eq!(report.diagnostics.obs_count, Some(4));
}

#[test]
fn keyed_sections_use_key_titles() {
    let report = inspect_fixture("keyed_sections.json");
    let analysis = &report.analysis;

    let control = &analysis.heuristics[2];
    assert_eq!(control.title, "User control and freedom");
    assert_eq!(control.description.as_deref(), Some("No undo after archiving"));
    assert_eq!(analysis.heuristics.len(), 11);
    assert_eq!(analysis.heuristics[10].title, "helpDocs");

    assert_eq!(
        titles(&analysis.psychology),
        vec!["Anchoring", "Behavioral Trigger", "Psychology Insight"]
    );
    // Shape notes are not warnings.
    assert_eq!(report.diagnostics.status, DiagnosticStatus::Ok);
}

#[test]
fn malformed_entries_degrade_but_still_normalize() {
    let report = inspect_fixture("degraded.json");

    assert_eq!(report.diagnostics.status, DiagnosticStatus::Degraded);
    assert_eq!(
        report.diagnostics.warnings,
        vec![
            "2 bare string accessibility entries promoted to insights".to_string(),
            "unterminated '[' at byte 17 in recommendation: Shorten the form [effort: low"
                .to_string(),
        ]
    );

    assert_eq!(
        titles(&report.analysis.accessibility),
        vec!["Accessibility Insight 1", "Accessibility Insight 2"]
    );
    assert_eq!(
        report.analysis.recommendations,
        vec!["Shorten the form [effort: low"]
    );
    assert!(!report.analysis.heuristics[7].is_empty());
}

#[test]
fn identical_bytes_produce_identical_reports() {
    let a = inspect_fixture("full_audit.json");
    let b = inspect_fixture("full_audit.json");

    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn temp_file_payload_is_fingerprinted() {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    tmp.write_all(br#"{"summary":"ok"}"#).expect("write payload");
    tmp.flush().expect("flush");

    let report = uxlens_core::inspect(tmp.path(), tool()).expect("inspect should succeed");

    assert_eq!(report.payload.size_bytes, 16);
    assert_eq!(report.payload.hash.algorithm, "sha256");
    assert_eq!(
        report.payload.hash.value,
        "91eb060ae89c761643ca0931e6ba538318e2505253b4f63a9ffee7670a1010fc"
    );
    assert_eq!(report.analysis.summary.as_deref(), Some("ok"));
    assert_eq!(report.analysis.heuristics.len(), 10);
}

#[test]
fn invalid_json_is_an_error() {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"{\"heuristics\": [").expect("write payload");
    tmp.flush().expect("flush");

    let err = uxlens_core::inspect(tmp.path(), tool()).unwrap_err();
    assert!(format!("{err:#}").contains("not valid JSON"));
}

#[test]
fn missing_file_is_an_error() {
    assert!(uxlens_core::inspect(&fixtures_dir().join("absent.json"), tool()).is_err());
}

#[test]
fn inspect_value_accepts_in_memory_payloads() {
    let payload = PayloadInfo {
        path: None,
        size_bytes: 0,
        hash: PayloadHash {
            algorithm: "sha256".into(),
            value: String::new(),
        },
    };
    let report = uxlens_core::inspect_value(
        &json!({"analysis": {"psychology": {"persuasionTechniques": ["Social proof"]}}}),
        tool(),
        payload,
    );

    assert_eq!(report.analysis.psychology.len(), 3);
    assert_eq!(report.analysis.psychology[0].title, "Persuasion Technique");
    assert_eq!(
        report.analysis.psychology[0].description.as_deref(),
        Some("Social proof")
    );
}

#[test]
fn report_json_uses_camel_case_keys() {
    let report = inspect_fixture("full_audit.json");
    let value = serde_json::to_value(&report).unwrap();

    assert!(value.get("schemaVersion").is_some());
    assert!(value["analysis"].get("accessibilityExtras").is_some());
    assert!(value["analysis"].get("recommendationChips").is_some());
    assert_eq!(value["analysis"]["obsCount"], json!(4));
    assert_eq!(value["diagnostics"]["status"], json!("ok"));
}
