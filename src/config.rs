//! Configuration for alignment and correlation runs.

use crate::types::{Timestamp, MICROS_PER_HOUR, MICROS_PER_SEC};

/// Configuration options for [`crate::PhaseAnalysis`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Join tolerance in microseconds (default: 30 s). `None` means the
    /// nearest secondary sample is accepted at any distance.
    pub tolerance: Option<Timestamp>,

    /// Minimum number of valid paired samples required before statistics
    /// are computed (default: 2). Below this the result is undefined,
    /// not an error.
    pub min_samples: usize,

    /// How phase labeling treats rows whose reference value is missing
    /// (default: [`MissingPolicy::Hold`]).
    pub missing_policy: MissingPolicy,

    /// Lag sweep parameters (default: -12 h..+12 h, 1 h step,
    /// threshold 0.0, unbounded re-join tolerance).
    pub sweep: SweepParams,
}

/// Behavior of the phase segmenter when a reference value is absent.
///
/// The upstream analyses disagreed on this point, so it is explicit
/// configuration rather than a hard-coded rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Carry the previous label and comparison state through the gap.
    Hold,
    /// Restart as at sequence start: the next present value is labeled
    /// `ascending` / `unknown` and becomes the new comparison baseline.
    Reset,
}

/// Parameters for the lag sweep.
#[derive(Debug, Clone)]
pub struct SweepParams {
    /// First offset tested, inclusive, in microseconds.
    pub start: Timestamp,
    /// Last offset tested, inclusive, in microseconds.
    pub end: Timestamp,
    /// Step between offsets in microseconds. Must be positive.
    pub step: Timestamp,
    /// Partition threshold: rows with a reference value strictly above it
    /// form one partition, the rest the other.
    pub threshold: f64,
    /// Join tolerance for the per-offset re-alignment. The sweep path
    /// defaults to unbounded nearest-match.
    pub tolerance: Option<Timestamp>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: Some(30 * MICROS_PER_SEC),
            min_samples: 2,
            missing_policy: MissingPolicy::Hold,
            sweep: SweepParams::default(),
        }
    }
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            start: -12 * MICROS_PER_HOUR,
            end: 12 * MICROS_PER_HOUR,
            step: MICROS_PER_HOUR,
            threshold: 0.0,
            tolerance: None,
        }
    }
}

impl SweepParams {
    /// All offsets in the configured range, ascending.
    ///
    /// The range is inclusive at both ends; `end` itself is produced only
    /// if it lies on the step grid.
    pub fn offsets(&self) -> Vec<Timestamp> {
        let mut out = Vec::new();
        if self.step <= 0 || self.start > self.end {
            return out;
        }
        let mut offset = self.start;
        while offset <= self.end {
            out.push(offset);
            offset += self.step;
        }
        out
    }
}
