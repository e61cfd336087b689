//! Main `PhaseAnalysis` entry point and pipeline orchestration.
//!
//! A run flows through the stages in order: restrict the primary series
//! to the overlap of the required channels, align by nearest match,
//! label phases from a reference channel, then compute per-segment and
//! total correlation statistics. Each run is a pure function of its
//! inputs and configuration; no state survives between calls.

use std::time::Instant;

use tracing::info;

use crate::analysis::align::{align, AlignChannel, AlignReport, AlignedTable};
use crate::analysis::segment::{label_macro, label_trend};
use crate::analysis::sweep::lag_sweep;
use crate::config::{Config, MissingPolicy, SweepParams};
use crate::error::EngineError;
use crate::result::{
    AnalysisReport, CorrelationResult, LagSweepReport, Metadata, PhaseContrast,
};
use crate::series::TimestampedSeries;
use crate::statistics::{fisher_z, pearson, two_tailed_p, valid_pairs, z_flip};
use crate::types::{MacroPhase, Timestamp, TrendPhase, MICROS_PER_SEC};

/// Which phase labeling drives the segmentation of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentBy {
    /// Ascending/descending trend of the reference channel.
    Trend,
    /// Apogean/perigean/unknown macro phase of a distance-like channel.
    Macro,
}

/// Phase-segmented correlation engine.
///
/// Configure with the builder methods, then call [`run`](Self::run) for
/// a full pipeline pass or [`sweep`](Self::sweep) for a lag sweep. The
/// granular stages ([`align`](Self::align), the segment labelers, the
/// statistics kernels) are public for callers that need only a part.
///
/// # Example
///
/// ```ignore
/// use phasecorr::{AlignChannel, PhaseAnalysis, SegmentBy};
///
/// let report = PhaseAnalysis::new()
///     .tolerance_secs(30)
///     .run(
///         &flow,
///         &[AlignChannel::required(&altitude)],
///         "moon_altitude_deg",
///         "flow_meter",
///         "moon_altitude_deg",
///         SegmentBy::Trend,
///     )?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PhaseAnalysis {
    config: Config,
}

impl PhaseAnalysis {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the join tolerance in seconds.
    pub fn tolerance_secs(mut self, secs: i64) -> Self {
        self.config.tolerance = Some(secs * MICROS_PER_SEC);
        self
    }

    /// Set the join tolerance in microseconds.
    pub fn tolerance_micros(mut self, micros: Timestamp) -> Self {
        self.config.tolerance = Some(micros);
        self
    }

    /// Accept the nearest sample at any distance.
    pub fn unbounded_tolerance(mut self) -> Self {
        self.config.tolerance = None;
        self
    }

    /// Set the minimum valid pair count for statistics.
    pub fn min_samples(mut self, n: usize) -> Self {
        self.config.min_samples = n;
        self
    }

    /// Set the missing-value policy for segmentation.
    pub fn missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.config.missing_policy = policy;
        self
    }

    /// Replace the sweep parameters.
    pub fn sweep_params(mut self, params: SweepParams) -> Self {
        self.config.sweep = params;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Restrict the primary series to the time range covered by every
    /// required channel.
    ///
    /// Rows outside the common overlap could never satisfy a required
    /// join, so they are cut before alignment and do not inflate the
    /// dropped-row count.
    pub fn overlap_restricted(
        &self,
        primary: &TimestampedSeries,
        channels: &[AlignChannel<'_>],
    ) -> TimestampedSeries {
        let mut start = i64::MIN;
        let mut end = i64::MAX;
        for channel in channels.iter().filter(|c| c.required) {
            match (channel.series.first_ts(), channel.series.last_ts()) {
                (Some(first), Some(last)) => {
                    start = start.max(first);
                    end = end.min(last);
                }
                // An empty required channel covers nothing.
                _ => return primary.restricted(1, 0),
            }
        }
        primary.restricted(start, end)
    }

    /// Align secondary channels onto the primary series' timestamps,
    /// after overlap restriction, using the configured tolerance.
    pub fn align(
        &self,
        primary: &TimestampedSeries,
        channels: &[AlignChannel<'_>],
    ) -> (AlignedTable, AlignReport) {
        let restricted = self.overlap_restricted(primary, channels);
        align(&restricted, channels, self.config.tolerance)
    }

    /// Correlation statistics over every row of the table, as the
    /// `"total"` segment.
    pub fn compute_stats(
        &self,
        table: &AlignedTable,
        x: &str,
        y: &str,
    ) -> Result<CorrelationResult, EngineError> {
        let xs = table.channel_values(x)?;
        let ys = table.channel_values(y)?;
        Ok(self.stats_from(&xs, &ys, "total"))
    }

    /// Full pipeline: restrict, align, label phases from `reference`,
    /// and correlate `x` against `y` per segment and overall.
    pub fn run(
        &self,
        primary: &TimestampedSeries,
        channels: &[AlignChannel<'_>],
        x: &str,
        y: &str,
        reference: &str,
        by: SegmentBy,
    ) -> Result<AnalysisReport, EngineError> {
        let started = Instant::now();

        let (mut table, alignment) = self.align(primary, channels);
        match by {
            SegmentBy::Trend => label_trend(&mut table, reference, self.config.missing_policy)?,
            SegmentBy::Macro => label_macro(&mut table, reference, self.config.missing_policy)?,
        }
        let report = self.correlate(&table, x, y, by, alignment)?;

        info!(
            x,
            y,
            reference,
            rows = table.len(),
            segments = report.segments.len(),
            runtime_secs = started.elapsed().as_secs_f64(),
            "analysis run complete"
        );
        Ok(report)
    }

    /// Per-segment and total statistics over an already-labeled table.
    pub fn correlate(
        &self,
        table: &AlignedTable,
        x: &str,
        y: &str,
        by: SegmentBy,
        alignment: AlignReport,
    ) -> Result<AnalysisReport, EngineError> {
        let xs = table.channel_values(x)?;
        let ys = table.channel_values(y)?;

        let mut segments = Vec::new();
        for label in segment_labels(by) {
            let mask: Vec<bool> = table
                .rows()
                .iter()
                .map(|row| match by {
                    SegmentBy::Trend => row.trend.map(TrendPhase::as_str) == Some(label),
                    SegmentBy::Macro => {
                        row.macro_phase.map(MacroPhase::as_str) == Some(label)
                    }
                })
                .collect();
            if !mask.iter().any(|&m| m) {
                continue;
            }
            let seg_x = masked(&xs, &mask);
            let seg_y = masked(&ys, &mask);
            segments.push(self.stats_from(&seg_x, &seg_y, label));
        }

        let total = self.stats_from(&xs, &ys, "total");
        let contrast = match segments.as_slice() {
            [a, b] => Some(contrast_of(a, b)),
            _ => None,
        };

        Ok(AnalysisReport {
            segments,
            total,
            contrast,
            metadata: Metadata {
                channel_x: x.to_string(),
                channel_y: y.to_string(),
                tolerance: self.config.tolerance,
                alignment,
            },
        })
    }

    /// Lag sweep of `reference` against `response` with the configured
    /// sweep parameters.
    pub fn sweep(
        &self,
        response: &TimestampedSeries,
        reference: &TimestampedSeries,
    ) -> Result<LagSweepReport, EngineError> {
        lag_sweep(
            response,
            reference,
            &self.config.sweep,
            self.config.min_samples,
        )
    }

    /// Statistics for one set of paired optional values.
    fn stats_from(
        &self,
        x: &[Option<f64>],
        y: &[Option<f64>],
        segment: &str,
    ) -> CorrelationResult {
        let (xs, ys) = valid_pairs(x, y);
        let n = xs.len();
        if n < self.config.min_samples.max(2) {
            return CorrelationResult::undefined(segment, n);
        }
        match pearson(&xs, &ys) {
            None => CorrelationResult::undefined(segment, n),
            Some(r) => CorrelationResult {
                segment: segment.to_string(),
                n,
                r: Some(r),
                p: two_tailed_p(r, n),
                z: Some(fisher_z(r, n)),
            },
        }
    }
}

/// Canonical segment ordering per labeling mode.
fn segment_labels(by: SegmentBy) -> &'static [&'static str] {
    match by {
        SegmentBy::Trend => &["ascending", "descending"],
        SegmentBy::Macro => &["unknown", "apogean", "perigean"],
    }
}

fn masked(values: &[Option<f64>], mask: &[bool]) -> Vec<Option<f64>> {
    values
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .map(|(v, _)| *v)
        .collect()
}

/// Element-wise contrast of two segments' statistics. Derived, never
/// independently computed.
fn contrast_of(a: &CorrelationResult, b: &CorrelationResult) -> PhaseContrast {
    let diff = |x: Option<f64>, y: Option<f64>| Some(x? - y?);
    PhaseContrast {
        segment_a: a.segment.clone(),
        segment_b: b.segment.clone(),
        r: diff(a.r, b.r),
        p: diff(a.p, b.p),
        z: diff(a.z, b.z),
        z_flip: match (a.z, b.z) {
            (Some(za), Some(zb)) => Some(z_flip(za, zb)),
            _ => None,
        },
    }
}
