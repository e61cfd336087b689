//! JSON serialization for analysis results.
//!
//! Note that serde_json renders non-finite floats as `null`, so a
//! saturated Fisher statistic and an undefined one are indistinguishable
//! in JSON output; the delimited-text renderer keeps them apart.

use crate::result::{AnalysisReport, LagSweepReport};

/// Serialize a correlation report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `AnalysisReport`).
pub fn to_json(report: &AnalysisReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a correlation report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `AnalysisReport`).
pub fn to_json_pretty(report: &AnalysisReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Serialize a lag sweep to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `LagSweepReport`).
pub fn sweep_to_json(report: &LagSweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}
