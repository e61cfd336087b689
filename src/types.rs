//! Shared value types for timestamped series and phase labels.

use serde::{Deserialize, Serialize};

/// Timestamps are epoch microseconds, timezone-naive.
///
/// All arithmetic in the engine (tolerances, offsets, lags) happens in this
/// representation; `chrono` appears only at the parse/render boundary.
pub type Timestamp = i64;

/// Microseconds per second.
pub const MICROS_PER_SEC: i64 = 1_000_000;

/// Microseconds per minute.
pub const MICROS_PER_MIN: i64 = 60 * MICROS_PER_SEC;

/// Microseconds per hour.
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MIN;

/// A single observation: one timestamp, one numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation time in epoch microseconds.
    pub ts: Timestamp,
    /// Observed value. Always finite inside a [`crate::TimestampedSeries`].
    pub value: f64,
}

impl Sample {
    /// Create a sample.
    pub fn new(ts: Timestamp, value: f64) -> Self {
        Self { ts, value }
    }
}

/// Local trend of a reference channel, relative to the previous known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPhase {
    /// Reference value is increasing (also the fixed label for the first row).
    Ascending,
    /// Reference value is not increasing.
    Descending,
}

impl TrendPhase {
    /// Stable segment name used in result tables.
    pub fn as_str(self) -> &'static str {
        match self {
            TrendPhase::Ascending => "ascending",
            TrendPhase::Descending => "descending",
        }
    }
}

/// Macro phase of a distance-like channel, relative to the previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroPhase {
    /// No previous sample to compare against.
    Unknown,
    /// Farther than the previous sample.
    Apogean,
    /// Nearer than the previous sample.
    Perigean,
}

impl MacroPhase {
    /// Stable segment name used in result tables.
    pub fn as_str(self) -> &'static str {
        match self {
            MacroPhase::Unknown => "unknown",
            MacroPhase::Apogean => "apogean",
            MacroPhase::Perigean => "perigean",
        }
    }
}
