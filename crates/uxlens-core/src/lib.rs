pub mod analysis;
pub mod normalize;
pub mod observe;
pub mod payload;
pub mod report;
pub mod text;
pub mod util;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::normalize::{normalize_analysis_with, unwrap_analysis_payload};
use crate::observe::CollectingObserver;
use crate::payload::read::read_payload;
use crate::report::model::{DiagnosticsInfo, PayloadInfo, Report, ToolInfo};

pub const TOOL_NAME: &str = "uxlens";

/// JSON schema version of uxlens reports.
/// Bumped only when the report or analysis shape changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Read a payload file, normalize it and wrap the result in a report.
pub fn inspect(path: &Path, tool: ToolInfo) -> Result<Report> {
    let ctx = read_payload(path)
        .with_context(|| format!("failed to load analysis payload: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        size_bytes = ctx.size_bytes,
        hash = %ctx.hash_hex,
        "payload loaded"
    );

    let (value, payload) = ctx.into_parts();
    Ok(inspect_value(&value, tool, payload))
}

/// Normalize an already parsed payload. Never fails; malformed sections are
/// reported through `diagnostics`.
pub fn inspect_value(value: &Value, tool: ToolInfo, payload: PayloadInfo) -> Report {
    let observer = CollectingObserver::new();
    let analysis = normalize_analysis_with(unwrap_analysis_payload(value), &observer);
    let diagnostics = DiagnosticsInfo::from_events(&observer.into_events(), analysis.obs_count);

    tracing::debug!(
        status = %diagnostics.status,
        warnings = diagnostics.warnings.len(),
        recommendations = analysis.recommendations.len(),
        "analysis normalized"
    );

    Report::new(tool, payload, diagnostics, analysis)
}
