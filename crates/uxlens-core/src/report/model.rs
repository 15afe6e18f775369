use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::analysis::model::StructuredAnalysis;
use crate::observe::NormalizeEvent;

/// Top-level uxlens report.
///
/// Wraps one normalized analysis with the identity of the payload it came
/// from. Deterministic for identical payload bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub payload: PayloadInfo,
    pub diagnostics: DiagnosticsInfo,
    pub analysis: StructuredAnalysis,
}

impl Report {
    pub fn new(
        tool: ToolInfo,
        payload: PayloadInfo,
        diagnostics: DiagnosticsInfo,
        analysis: StructuredAnalysis,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            payload,
            diagnostics,
            analysis,
        }
    }
}

/// Tool metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Payload metadata bound to this report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub size_bytes: u64,
    pub hash: PayloadHash,
}

/// Cryptographic payload fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadHash {
    pub algorithm: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStatus {
    #[default]
    Ok,
    /// The payload normalized, but parts of it were malformed.
    Degraded,
}

impl std::fmt::Display for DiagnosticStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticStatus::Ok => write!(f, "ok"),
            DiagnosticStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// Normalization status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsInfo {
    pub status: DiagnosticStatus,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs_count: Option<usize>,
}

impl DiagnosticsInfo {
    pub fn ok() -> Self {
        Self::default()
    }

    /// Warnings from the warning-level events; shape notes are left out.
    pub fn from_events(events: &[NormalizeEvent], obs_count: Option<usize>) -> Self {
        let warnings: Vec<String> = events
            .iter()
            .filter(|e| e.is_warning())
            .map(NormalizeEvent::describe)
            .collect();
        let status = if warnings.is_empty() {
            DiagnosticStatus::Ok
        } else {
            DiagnosticStatus::Degraded
        };
        Self {
            status,
            warnings,
            obs_count,
        }
    }
}
