//! Schema-validated ingestion of delimited-text time series.
//!
//! Input is header-first delimited text: one timestamp column and one
//! numeric value column, named up front in a [`SeriesSchema`] and
//! resolved against the header before any row is read. A missing column
//! is a fatal, contextual error; a malformed *row* (unparseable
//! timestamp or non-numeric value) is dropped and counted, with the
//! count surfaced in the [`IngestReport`] and logged; rows are never
//! lost silently. Fields carry no quoting: values are timestamps,
//! numbers and bare labels.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use tracing::{info, warn};

use crate::error::IngestError;
use crate::series::TimestampedSeries;
use crate::types::{Sample, Timestamp};

/// Declared column names for one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSchema {
    /// Header name of the timestamp column.
    pub timestamp: String,
    /// Header name of the numeric value column.
    pub value: String,
}

impl SeriesSchema {
    /// Declare a schema.
    pub fn new(timestamp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }
}

/// Row counts from one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Data rows read (header excluded).
    pub rows_read: usize,
    /// Rows that produced a sample.
    pub rows_kept: usize,
    /// Rows dropped as malformed.
    pub rows_dropped: usize,
}

/// Timestamp formats accepted after RFC 3339 fails. `%.f` also matches
/// an absent fraction.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse a textual timestamp to epoch microseconds.
///
/// Accepts RFC 3339 (offset-aware, normalized to UTC) and a handful of
/// naive ISO-8601 variants (taken as UTC).
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_micros());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }
    None
}

/// Read one series from delimited text.
///
/// The first line must be a header containing both schema columns;
/// otherwise reading fails before any data row is touched. If the input
/// had data rows but every one was dropped, that is reported as
/// [`IngestError::NoRows`]: an entirely malformed source is a fatal
/// input error, not an empty result.
pub fn read_series<R: BufRead>(
    reader: R,
    name: &str,
    schema: &SeriesSchema,
    delimiter: char,
) -> Result<(TimestampedSeries, IngestReport), IngestError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(IngestError::MissingHeader),
    };
    let columns: Vec<&str> = header.split(delimiter).map(str::trim).collect();
    let ts_idx = resolve_column(&columns, &schema.timestamp, &header)?;
    let value_idx = resolve_column(&columns, &schema.value, &header)?;

    let mut report = IngestReport::default();
    let mut samples = Vec::new();

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        report.rows_read += 1;

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        let parsed = fields
            .get(ts_idx)
            .and_then(|f| parse_timestamp(f))
            .zip(fields.get(value_idx).and_then(|f| f.parse::<f64>().ok()));
        match parsed {
            Some((ts, value)) if value.is_finite() => {
                samples.push(Sample::new(ts, value));
                report.rows_kept += 1;
            }
            _ => report.rows_dropped += 1,
        }
    }

    if report.rows_dropped > 0 {
        warn!(
            series = name,
            dropped = report.rows_dropped,
            read = report.rows_read,
            "dropped malformed rows"
        );
    }
    if report.rows_read > 0 && report.rows_kept == 0 {
        return Err(IngestError::NoRows {
            name: name.to_string(),
            dropped: report.rows_dropped,
        });
    }

    info!(
        series = name,
        rows = report.rows_kept,
        "ingested series"
    );
    Ok((TimestampedSeries::new(name, samples), report))
}

/// Read one series from a comma-delimited file.
pub fn read_series_from_path(
    path: impl AsRef<Path>,
    name: &str,
    schema: &SeriesSchema,
) -> Result<(TimestampedSeries, IngestReport), IngestError> {
    let file = File::open(path)?;
    read_series(BufReader::new(file), name, schema, ',')
}

fn resolve_column(
    columns: &[&str],
    wanted: &str,
    header: &str,
) -> Result<usize, IngestError> {
    columns
        .iter()
        .position(|c| *c == wanted)
        .ok_or_else(|| IngestError::MissingColumn {
            column: wanted.to_string(),
            header: header.to_string(),
        })
}
