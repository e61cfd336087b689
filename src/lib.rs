//! # phasecorr
//!
//! Align irregularly sampled time series, label them with phases, and
//! measure phase-segmented correlation.
//!
//! This crate provides the batch machinery for asking "does this event
//! meter track that astronomical/tidal channel, and does the answer flip
//! between phases?":
//! - nearest-match-within-tolerance joining of timestamped series
//! - trend (`ascending`/`descending`) and macro (`apogean`/`perigean`)
//!   phase labeling
//! - Pearson r with two-tailed significance and the Fisher z statistic,
//!   per segment and overall
//! - lag sweeps locating the offset of strongest phase divergence
//! - per-day peak-to-peak lag estimation and lag-adjusted shifting
//!
//! Every run is a pure function of its inputs and configuration: no
//! shared state, no time-of-day dependence, identical output for
//! identical input.
//!
//! ## Quick Start
//!
//! ```ignore
//! use phasecorr::{AlignChannel, PhaseAnalysis, SegmentBy, TimestampedSeries};
//!
//! let report = PhaseAnalysis::new()
//!     .tolerance_secs(30)
//!     .run(
//!         &flow,                                  // primary series
//!         &[AlignChannel::required(&altitude)],   // joined channels
//!         "moon_altitude_deg",                    // x channel
//!         "flow_meter",                           // y channel
//!         "moon_altitude_deg",                    // segmentation reference
//!         SegmentBy::Trend,
//!     )?;
//!
//! println!("{}", phasecorr::output::format_report(&report));
//! ```
//!
//! ## Degenerate input
//!
//! Fewer than the minimum valid pairs, or zero variance in a channel,
//! produces an *undefined* result (`None` fields, rendered as empty),
//! never an error and never a silent zero. At `|r| = 1` the Fisher
//! statistic saturates to signed infinity instead of raising.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod engine;
mod error;
mod result;
mod series;
mod types;

// Functional modules
pub mod analysis;
pub mod ingest;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use analysis::{
    align, apply_daily_lags, estimate_daily_lags, label_macro, label_trend, lag_sweep,
    AlignChannel, AlignReport, AlignedRow, AlignedTable, DailyLag,
};
pub use config::{Config, MissingPolicy, SweepParams};
pub use engine::{PhaseAnalysis, SegmentBy};
pub use error::{EngineError, IngestError};
pub use ingest::{IngestReport, SeriesSchema};
pub use result::{
    AnalysisReport, CorrelationResult, LagSweepReport, Metadata, PhaseContrast, SweepPoint,
};
pub use series::TimestampedSeries;
pub use types::{
    MacroPhase, Sample, Timestamp, TrendPhase, MICROS_PER_HOUR, MICROS_PER_MIN, MICROS_PER_SEC,
};

/// Convenience function: correlate a response series against a reference
/// series with default configuration.
///
/// Joins `reference` onto `response`'s timestamps (required, 30 s
/// tolerance), labels trend phases from the reference, and correlates
/// reference against response per segment and overall.
///
/// # Errors
///
/// Returns an error only for configuration problems (unknown channel
/// names cannot occur here). Degenerate data yields an undefined
/// report, not an error.
pub fn analyze(
    response: &TimestampedSeries,
    reference: &TimestampedSeries,
) -> Result<AnalysisReport, EngineError> {
    PhaseAnalysis::new().run(
        response,
        &[AlignChannel::required(reference)],
        reference.name(),
        response.name(),
        reference.name(),
        SegmentBy::Trend,
    )
}
