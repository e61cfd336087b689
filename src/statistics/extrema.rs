//! Local extremum detection on timestamped series.
//!
//! Used for lag estimation from an altitude-like channel: detect the
//! troughs of a resampled, gap-interpolated series, or the peak inside a
//! bounded search window. Comparisons are strict (`<` / `>`), so a
//! multi-sample plateau never produces an extremum. Deterministic by
//! construction, with no duplicate detections.

use crate::series::TimestampedSeries;
use crate::types::{Sample, Timestamp};

/// Samples strictly below both neighbors.
///
/// The first and last sample have only one neighbor and are never
/// reported. Series with fewer than three samples have no interior and
/// yield nothing. Callers working with irregular data should resample to
/// a fixed step first (see [`TimestampedSeries::resampled`]) so that
/// "neighbor" means a fixed time distance.
pub fn local_minima(series: &TimestampedSeries) -> Vec<Sample> {
    extrema(series, |mid, side| mid < side)
}

/// Samples strictly above both neighbors.
pub fn local_maxima(series: &TimestampedSeries) -> Vec<Sample> {
    extrema(series, |mid, side| mid > side)
}

fn extrema(series: &TimestampedSeries, beats: impl Fn(f64, f64) -> bool) -> Vec<Sample> {
    let samples = series.samples();
    if samples.len() < 3 {
        return Vec::new();
    }
    samples
        .windows(3)
        .filter(|w| beats(w[1].value, w[0].value) && beats(w[1].value, w[2].value))
        .map(|w| w[1])
        .collect()
}

/// The maximum-valued sample with `start < ts <= end`.
///
/// Ties resolve to the earliest such sample. Returns `None` when the
/// window contains no samples.
pub fn max_in_window(
    series: &TimestampedSeries,
    start: Timestamp,
    end: Timestamp,
) -> Option<Sample> {
    series
        .samples()
        .iter()
        .filter(|s| s.ts > start && s.ts <= end)
        .copied()
        .reduce(|best, s| if s.value > best.value { s } else { best })
}

/// The maximum-valued sample of the whole series, earliest on ties.
pub fn max_sample(series: &TimestampedSeries) -> Option<Sample> {
    series
        .samples()
        .iter()
        .copied()
        .reduce(|best, s| if s.value > best.value { s } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(i64, f64)]) -> TimestampedSeries {
        TimestampedSeries::from_pairs("alt", pairs.iter().copied())
    }

    #[test]
    fn finds_interior_minimum() {
        let s = series(&[(0, 3.0), (1, 1.0), (2, 2.0), (3, 0.5), (4, 4.0)]);
        let minima = local_minima(&s);
        assert_eq!(minima.len(), 2);
        assert_eq!(minima[0].ts, 1);
        assert_eq!(minima[1].ts, 3);
    }

    #[test]
    fn finds_interior_maximum() {
        let s = series(&[(0, 0.0), (1, 5.0), (2, 1.0)]);
        let maxima = local_maxima(&s);
        assert_eq!(maxima, vec![Sample::new(1, 5.0)]);
    }

    #[test]
    fn plateau_yields_no_extremum() {
        let s = series(&[(0, 3.0), (1, 1.0), (2, 1.0), (3, 3.0)]);
        assert!(local_minima(&s).is_empty());
    }

    #[test]
    fn endpoints_are_never_extrema() {
        let s = series(&[(0, 0.0), (1, 1.0), (2, 2.0)]);
        assert!(local_minima(&s).is_empty());
        assert!(local_maxima(&s).is_empty());
    }

    #[test]
    fn short_series_has_no_extrema() {
        assert!(local_minima(&series(&[(0, 1.0), (1, 0.0)])).is_empty());
        assert!(local_minima(&series(&[])).is_empty());
    }

    #[test]
    fn window_max_is_exclusive_then_inclusive() {
        let s = series(&[(0, 9.0), (5, 2.0), (10, 7.0), (15, 3.0)]);
        // ts = 0 is excluded (start is exclusive), ts = 10 included.
        let peak = max_in_window(&s, 0, 10).unwrap();
        assert_eq!(peak.ts, 10);
        assert!(max_in_window(&s, 15, 30).is_none());
    }

    #[test]
    fn window_max_ties_take_earliest() {
        let s = series(&[(1, 5.0), (2, 5.0)]);
        assert_eq!(max_in_window(&s, 0, 10).unwrap().ts, 1);
        assert_eq!(max_sample(&s).unwrap().ts, 1);
    }
}
