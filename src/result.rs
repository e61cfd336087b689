//! Result types for correlation runs and lag sweeps.

use serde::{Deserialize, Serialize};

use crate::analysis::align::AlignReport;
use crate::types::Timestamp;

/// Correlation statistics for one segment of rows.
///
/// All three statistics are `None` when fewer than the configured
/// minimum of valid paired samples were available, or when a channel had
/// zero variance; degenerate input is an undefined result, not an
/// error. A defined `z` may be infinite: the Fisher transform saturates
/// at `|r| = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Segment name (a phase label, or `"total"`).
    pub segment: String,
    /// Number of valid paired samples in the segment.
    pub n: usize,
    /// Pearson correlation coefficient.
    pub r: Option<f64>,
    /// Two-tailed significance.
    pub p: Option<f64>,
    /// Fisher statistic `atanh(r) * sqrt(n - 3)`.
    pub z: Option<f64>,
}

impl CorrelationResult {
    /// An all-undefined result for a degenerate segment.
    pub fn undefined(segment: impl Into<String>, n: usize) -> Self {
        Self {
            segment: segment.into(),
            n,
            r: None,
            p: None,
            z: None,
        }
    }

    /// Whether the coefficient was computable.
    pub fn is_defined(&self) -> bool {
        self.r.is_some()
    }
}

/// Derived contrast between exactly two phase segments.
///
/// Every field is an element-wise difference (or absolute sum, for
/// `z_flip`) of the two segments' statistics: diagnostic contrasts, not
/// independently computed tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseContrast {
    /// First segment name (subtrahend order: `a - b`).
    pub segment_a: String,
    /// Second segment name.
    pub segment_b: String,
    /// `r_a - r_b`, defined only when both are.
    pub r: Option<f64>,
    /// `p_a - p_b`, defined only when both are.
    pub p: Option<f64>,
    /// `z_a - z_b`, defined only when both are.
    pub z: Option<f64>,
    /// `|z_a| + |z_b|`, defined only when both are.
    pub z_flip: Option<f64>,
}

/// Diagnostic counts and parameters from a correlation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Channel correlated on the x side.
    pub channel_x: String,
    /// Channel correlated on the y side.
    pub channel_y: String,
    /// Join tolerance in microseconds (`None` = unbounded).
    pub tolerance: Option<Timestamp>,
    /// Alignment diagnostics (row counts, drops).
    pub alignment: AlignReport,
}

/// Complete result of a phase-segmented correlation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One result per phase label present, in label order.
    pub segments: Vec<CorrelationResult>,
    /// The unrestricted full-set result.
    pub total: CorrelationResult,
    /// Present when exactly two segments were found.
    pub contrast: Option<PhaseContrast>,
    /// Run diagnostics.
    pub metadata: Metadata,
}

/// One tested offset of a lag sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Offset applied to the reference series, in microseconds.
    pub offset: Timestamp,
    /// Valid pairs in the above-threshold partition.
    pub n_above: usize,
    /// Valid pairs in the at-or-below-threshold partition.
    pub n_below: usize,
    /// Pearson r of the above-threshold partition.
    pub r_above: Option<f64>,
    /// Pearson r of the at-or-below partition.
    pub r_below: Option<f64>,
    /// `|z_above| + |z_below|`; defined only when both partitions
    /// produced a coefficient.
    pub z_flip: Option<f64>,
}

/// Ordered sweep results plus the selected best offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagSweepReport {
    /// One point per tested offset, ascending by offset, no gaps.
    pub points: Vec<SweepPoint>,
    /// Offset with maximal `z_flip`. Ties resolve to the smallest
    /// absolute offset, then to the more negative one. `None` when no
    /// offset produced a defined `z_flip`.
    pub best_offset: Option<Timestamp>,
    /// Partition threshold used.
    pub threshold: f64,
}

impl LagSweepReport {
    /// The point at the selected best offset.
    pub fn best_point(&self) -> Option<&SweepPoint> {
        let best = self.best_offset?;
        self.points.iter().find(|p| p.offset == best)
    }
}
