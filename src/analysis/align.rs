//! Nearest-match-within-tolerance joining of timestamped series.
//!
//! The aligner anchors one or more secondary channels to the primary
//! series' timestamps. For each primary timestamp it selects the single
//! secondary sample nearest by absolute time distance; a sample farther
//! than the tolerance counts as absent. Rows missing a required channel
//! are dropped and counted, never silently lost.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::series::TimestampedSeries;
use crate::types::{MacroPhase, Timestamp, TrendPhase};

/// A secondary series to join, with its per-row missing-value policy.
#[derive(Debug, Clone, Copy)]
pub struct AlignChannel<'a> {
    /// The series to join against the primary timestamps.
    pub series: &'a TimestampedSeries,
    /// Required channels drop the whole row when no sample is within
    /// tolerance; optional channels leave the field absent.
    pub required: bool,
}

impl<'a> AlignChannel<'a> {
    /// A channel whose absence drops the row.
    pub fn required(series: &'a TimestampedSeries) -> Self {
        Self {
            series,
            required: true,
        }
    }

    /// A channel whose absence leaves a `None` field.
    pub fn optional(series: &'a TimestampedSeries) -> Self {
        Self {
            series,
            required: false,
        }
    }
}

/// One output row of the aligner: the primary sample plus one optional
/// value per joined channel, and the phase labels attached later by the
/// segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    /// The primary series' timestamp anchoring this row.
    pub ts: Timestamp,
    /// The primary series' value at that timestamp.
    pub primary: f64,
    /// Joined channel values, parallel to the table's channel names.
    /// `None` means no source sample fell within tolerance.
    pub channels: Vec<Option<f64>>,
    /// Trend phase label, set by the segmenter.
    pub trend: Option<TrendPhase>,
    /// Macro phase label, set by the segmenter.
    pub macro_phase: Option<MacroPhase>,
}

/// The aligned table: rows anchored at primary timestamps, with named
/// secondary channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    primary_name: String,
    channel_names: Vec<String>,
    rows: Vec<AlignedRow>,
}

/// Diagnostic counts from an alignment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignReport {
    /// Primary rows considered.
    pub rows_in: usize,
    /// Rows emitted.
    pub rows_out: usize,
    /// Rows dropped because a required channel had no sample within
    /// tolerance.
    pub rows_dropped: usize,
}

impl AlignedTable {
    /// Name of the primary channel.
    pub fn primary_name(&self) -> &str {
        &self.primary_name
    }

    /// Names of the joined secondary channels, in join order.
    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    /// The rows, ordered by timestamp.
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Mutable access for the segmenter.
    pub(crate) fn rows_mut(&mut self) -> &mut [AlignedRow] {
        &mut self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a secondary channel, or `None` for the primary name.
    ///
    /// Errors when the name matches neither.
    pub(crate) fn resolve(&self, name: &str) -> Result<Option<usize>, EngineError> {
        if name == self.primary_name {
            return Ok(None);
        }
        self.channel_names
            .iter()
            .position(|c| c == name)
            .map(Some)
            .ok_or_else(|| EngineError::UnknownChannel(name.to_string()))
    }

    /// Per-row values of a channel (primary values are always present).
    pub fn channel_values(&self, name: &str) -> Result<Vec<Option<f64>>, EngineError> {
        let idx = self.resolve(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| match idx {
                None => Some(row.primary),
                Some(i) => row.channels[i],
            })
            .collect())
    }
}

/// Cursor over one sorted secondary series.
///
/// Primary timestamps arrive in ascending order, so the nearest-sample
/// index only ever moves forward.
struct ChannelCursor<'a> {
    channel: AlignChannel<'a>,
    pos: usize,
}

impl ChannelCursor<'_> {
    /// Nearest sample value within `tolerance` of `ts`.
    ///
    /// Equidistant neighbors resolve to the earlier sample: the cursor
    /// only advances while the next sample is strictly nearer.
    fn nearest(&mut self, ts: Timestamp, tolerance: Option<Timestamp>) -> Option<f64> {
        let samples = self.channel.series.samples();
        if samples.is_empty() {
            return None;
        }
        while self.pos + 1 < samples.len()
            && (samples[self.pos + 1].ts - ts).abs() < (samples[self.pos].ts - ts).abs()
        {
            self.pos += 1;
        }
        let best = samples[self.pos];
        match tolerance {
            Some(tol) if (best.ts - ts).abs() > tol => None,
            _ => Some(best.value),
        }
    }
}

/// Join secondary channels onto the primary series' timestamps.
///
/// The tolerance boundary is inclusive: a sample exactly `tolerance` away
/// is matched. `tolerance = None` accepts the nearest sample at any
/// distance. An empty primary produces an empty table.
pub fn align(
    primary: &TimestampedSeries,
    channels: &[AlignChannel<'_>],
    tolerance: Option<Timestamp>,
) -> (AlignedTable, AlignReport) {
    let mut cursors: Vec<ChannelCursor<'_>> = channels
        .iter()
        .map(|&channel| ChannelCursor { channel, pos: 0 })
        .collect();

    let mut rows = Vec::with_capacity(primary.len());
    let mut dropped = 0usize;

    for sample in primary.samples() {
        let mut values = Vec::with_capacity(cursors.len());
        let mut missing_required = false;
        for cursor in &mut cursors {
            let value = cursor.nearest(sample.ts, tolerance);
            if value.is_none() && cursor.channel.required {
                missing_required = true;
            }
            values.push(value);
        }
        if missing_required {
            dropped += 1;
            continue;
        }
        rows.push(AlignedRow {
            ts: sample.ts,
            primary: sample.value,
            channels: values,
            trend: None,
            macro_phase: None,
        });
    }

    let report = AlignReport {
        rows_in: primary.len(),
        rows_out: rows.len(),
        rows_dropped: dropped,
    };
    info!(
        primary = primary.name(),
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        rows_dropped = report.rows_dropped,
        "aligned series"
    );

    let table = AlignedTable {
        primary_name: primary.name().to_string(),
        channel_names: channels
            .iter()
            .map(|c| c.series.name().to_string())
            .collect(),
        rows,
    };
    (table, report)
}
