//! Timestamped series storage and derived-series transforms.
//!
//! A [`TimestampedSeries`] is one numeric channel: an ordered sequence of
//! `(timestamp, value)` pairs, sorted ascending, with finite values only.
//! The transforms here replace the derived columns the upstream analyses
//! recomputed ad hoc per run: successive differences, rates of change,
//! centered rolling means, z-scores, product indices, fixed-grid
//! resampling and running-total folds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Sample, Timestamp, MICROS_PER_SEC};

/// An ordered, deduplicated sequence of timestamped values.
///
/// Invariants, established at construction and preserved by every
/// transform:
/// - timestamps strictly increasing (duplicates resolved last-wins),
/// - every value finite (non-finite inputs are treated as absent and
///   dropped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedSeries {
    name: String,
    samples: Vec<Sample>,
}

impl TimestampedSeries {
    /// Build a series from raw samples.
    ///
    /// Sorts by timestamp, drops non-finite values and resolves duplicate
    /// timestamps by keeping the last sample seen for that timestamp.
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        let name = name.into();
        let raw_len = samples.len();

        let mut samples: Vec<Sample> = samples
            .into_iter()
            .filter(|s| s.value.is_finite())
            .collect();
        // Stable sort keeps insertion order among equal timestamps, so
        // "last wins" below means last in input order.
        samples.sort_by_key(|s| s.ts);
        let mut deduped: Vec<Sample> = Vec::with_capacity(samples.len());
        for sample in samples {
            match deduped.last_mut() {
                Some(prev) if prev.ts == sample.ts => *prev = sample,
                _ => deduped.push(sample),
            }
        }

        if deduped.len() != raw_len {
            debug!(
                series = %name,
                kept = deduped.len(),
                dropped = raw_len - deduped.len(),
                "dropped non-finite or duplicate samples"
            );
        }

        Self {
            name,
            samples: deduped,
        }
    }

    /// Build a series from `(timestamp, value)` pairs.
    pub fn from_pairs(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (Timestamp, f64)>,
    ) -> Self {
        Self::new(
            name,
            pairs
                .into_iter()
                .map(|(ts, value)| Sample::new(ts, value))
                .collect(),
        )
    }

    /// Fold a sequence of signed event deltas into a cumulative series.
    ///
    /// This is the running "meter" of the upstream event log, expressed as
    /// an explicit fold over the event sequence instead of an object with
    /// hidden mutable state: each output sample is the sum of all deltas
    /// up to and including its timestamp.
    pub fn running_total(
        name: impl Into<String>,
        deltas: impl IntoIterator<Item = (Timestamp, f64)>,
    ) -> Self {
        let mut total = 0.0;
        let pairs: Vec<(Timestamp, f64)> = deltas
            .into_iter()
            .map(|(ts, delta)| {
                total += delta;
                (ts, total)
            })
            .collect();
        Self::from_pairs(name, pairs)
    }

    /// Series name, used as the channel name when aligning.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The samples, sorted ascending by timestamp.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// First timestamp, if any.
    pub fn first_ts(&self) -> Option<Timestamp> {
        self.samples.first().map(|s| s.ts)
    }

    /// Last timestamp, if any.
    pub fn last_ts(&self) -> Option<Timestamp> {
        self.samples.last().map(|s| s.ts)
    }

    /// Iterator over values in timestamp order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    /// Rename the series.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The sub-series with `start <= ts <= end`.
    pub fn restricted(&self, start: Timestamp, end: Timestamp) -> Self {
        Self {
            name: self.name.clone(),
            samples: self
                .samples
                .iter()
                .copied()
                .filter(|s| s.ts >= start && s.ts <= end)
                .collect(),
        }
    }

    /// The same series with every timestamp shifted by `offset`.
    pub fn shifted(&self, offset: Timestamp) -> Self {
        Self {
            name: self.name.clone(),
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(s.ts + offset, s.value))
                .collect(),
        }
    }

    /// Successive value differences, anchored at the later timestamp.
    ///
    /// The first sample has no predecessor and is dropped, so the result
    /// has `len() - 1` samples. This is the derivative-per-step used to
    /// turn a cumulative tide prediction into a tidal-rate channel.
    pub fn differenced(&self) -> Self {
        Self::from_pairs(
            format!("{}_delta", self.name),
            self.samples
                .windows(2)
                .map(|w| (w[1].ts, w[1].value - w[0].value)),
        )
    }

    /// Successive value differences divided by elapsed seconds.
    ///
    /// Zero-elapsed pairs cannot occur (timestamps are strictly
    /// increasing), so every output value is finite.
    pub fn rate_of_change(&self) -> Self {
        Self::from_pairs(
            format!("{}_rate", self.name),
            self.samples.windows(2).map(|w| {
                let dt_secs = (w[1].ts - w[0].ts) as f64 / MICROS_PER_SEC as f64;
                (w[1].ts, (w[1].value - w[0].value) / dt_secs)
            }),
        )
    }

    /// Centered rolling mean over `window` samples, full windows only.
    ///
    /// Each output sample sits at the center timestamp of its window
    /// (for even windows, the later of the two central samples), so the
    /// result shrinks by `window - 1` samples. `window == 0` yields an
    /// empty series; `window == 1` is the identity.
    pub fn rolling_mean(&self, window: usize) -> Self {
        let name = format!("{}_smooth", self.name);
        if window == 0 || self.samples.len() < window {
            return Self {
                name,
                samples: Vec::new(),
            };
        }
        Self::from_pairs(
            name,
            self.samples.windows(window).map(|w| {
                let mean = w.iter().map(|s| s.value).sum::<f64>() / window as f64;
                (w[window / 2].ts, mean)
            }),
        )
    }

    /// Z-score normalization: `(x - mean) / sd` with sample standard
    /// deviation.
    ///
    /// Returns `None` for degenerate input (fewer than two samples, or
    /// zero variance) rather than producing silent zeros or infinities.
    pub fn zscored(&self) -> Option<Self> {
        let n = self.samples.len();
        if n < 2 {
            return None;
        }
        let mean = self.values().sum::<f64>() / n as f64;
        let var = self
            .values()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / (n - 1) as f64;
        if var <= 0.0 {
            return None;
        }
        let sd = var.sqrt();
        Some(Self::from_pairs(
            format!("{}_z", self.name),
            self.samples.iter().map(|s| (s.ts, (s.value - mean) / sd)),
        ))
    }

    /// Element-wise product with another series on exactly-equal
    /// timestamps.
    ///
    /// Timestamps present in only one series are skipped. Used to build
    /// composite indices such as the product of a z-scored level and a
    /// z-scored rate.
    pub fn product_with(&self, other: &Self) -> Self {
        let name = format!("{}_x_{}", self.name, other.name);
        let mut pairs = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.samples.len() && j < other.samples.len() {
            let a = self.samples[i];
            let b = other.samples[j];
            match a.ts.cmp(&b.ts) {
                std::cmp::Ordering::Equal => {
                    pairs.push((a.ts, a.value * b.value));
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        Self::from_pairs(name, pairs)
    }

    /// Resample onto a fixed grid of `step`-wide bins.
    ///
    /// Each populated bin takes the mean of its samples, anchored at the
    /// bin's left edge (bins start at multiples of `step`). Empty bins
    /// strictly between populated ones are filled by linear
    /// interpolation, so the output grid has no interior gaps. Returns an
    /// empty series when `step <= 0` or the input is empty.
    pub fn resampled(&self, step: Timestamp) -> Self {
        let name = format!("{}_resampled", self.name);
        if step <= 0 || self.samples.is_empty() {
            return Self {
                name,
                samples: Vec::new(),
            };
        }

        let first_bin = self.samples[0].ts.div_euclid(step);
        let last_bin = self.samples[self.samples.len() - 1].ts.div_euclid(step);
        let bin_count = (last_bin - first_bin + 1) as usize;

        let mut sums = vec![0.0; bin_count];
        let mut counts = vec![0usize; bin_count];
        for sample in &self.samples {
            let bin = (sample.ts.div_euclid(step) - first_bin) as usize;
            sums[bin] += sample.value;
            counts[bin] += 1;
        }

        let mut values: Vec<f64> = (0..bin_count)
            .map(|bin| {
                if counts[bin] > 0 {
                    sums[bin] / counts[bin] as f64
                } else {
                    f64::NAN
                }
            })
            .collect();
        interpolate_gaps(&mut values);

        Self::from_pairs(
            name,
            values
                .into_iter()
                .enumerate()
                .map(|(bin, value)| ((first_bin + bin as i64) * step, value)),
        )
    }
}

/// Fill NaN runs strictly between finite neighbors by linear
/// interpolation. Leading and trailing NaNs are left in place (the caller
/// drops them when rebuilding a series).
fn interpolate_gaps(values: &mut [f64]) {
    let n = values.len();
    let mut i = 0;
    while i < n {
        if values[i].is_nan() {
            let gap_start = i;
            while i < n && values[i].is_nan() {
                i += 1;
            }
            if gap_start == 0 || i == n {
                continue;
            }
            let left = values[gap_start - 1];
            let right = values[i];
            let span = (i - gap_start + 1) as f64;
            for (k, value) in values[gap_start..i].iter_mut().enumerate() {
                let frac = (k + 1) as f64 / span;
                *value = left + (right - left) * frac;
            }
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(i64, f64)]) -> TimestampedSeries {
        TimestampedSeries::from_pairs("test", pairs.iter().copied())
    }

    #[test]
    fn construction_sorts_and_drops_non_finite() {
        let s = series(&[(30, 3.0), (10, 1.0), (20, f64::NAN), (40, f64::INFINITY)]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.samples()[0], Sample::new(10, 1.0));
        assert_eq!(s.samples()[1], Sample::new(30, 3.0));
    }

    #[test]
    fn duplicate_timestamps_last_wins() {
        let s = series(&[(10, 1.0), (10, 2.0), (20, 5.0)]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.samples()[0].value, 2.0);
    }

    #[test]
    fn running_total_folds_deltas() {
        let s = TimestampedSeries::running_total(
            "meter",
            vec![(1, 1.0), (2, -1.0), (3, 1.0), (4, 1.0)],
        );
        let values: Vec<f64> = s.values().collect();
        assert_eq!(values, vec![1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn differenced_drops_first() {
        let s = series(&[(10, 1.0), (20, 4.0), (30, 2.0)]);
        let d = s.differenced();
        assert_eq!(d.name(), "test_delta");
        assert_eq!(d.samples(), &[Sample::new(20, 3.0), Sample::new(30, -2.0)]);
    }

    #[test]
    fn rate_of_change_divides_by_elapsed_seconds() {
        let s = series(&[(0, 0.0), (2 * MICROS_PER_SEC, 4.0)]);
        let r = s.rate_of_change();
        assert_eq!(r.len(), 1);
        assert!((r.samples()[0].value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_mean_centers_full_windows() {
        let s = series(&[(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0), (4, 5.0)]);
        let m = s.rolling_mean(3);
        assert_eq!(m.len(), 3);
        assert_eq!(m.samples()[0], Sample::new(1, 2.0));
        assert_eq!(m.samples()[2], Sample::new(3, 4.0));
    }

    #[test]
    fn rolling_mean_short_input_is_empty() {
        let s = series(&[(0, 1.0), (1, 2.0)]);
        assert!(s.rolling_mean(3).is_empty());
        assert!(s.rolling_mean(0).is_empty());
    }

    #[test]
    fn zscore_normalizes() {
        let s = series(&[(0, 2.0), (1, 4.0), (2, 6.0)]);
        let z = s.zscored().unwrap();
        let values: Vec<f64> = z.values().collect();
        assert!((values[1]).abs() < 1e-12);
        assert!((values[0] + values[2]).abs() < 1e-12);
    }

    #[test]
    fn zscore_degenerate_is_none() {
        assert!(series(&[(0, 1.0)]).zscored().is_none());
        assert!(series(&[(0, 3.0), (1, 3.0), (2, 3.0)]).zscored().is_none());
    }

    #[test]
    fn product_joins_on_equal_timestamps() {
        let a = series(&[(0, 2.0), (1, 3.0), (2, 4.0)]);
        let b = TimestampedSeries::from_pairs("other", vec![(1, 10.0), (3, 7.0)]);
        let p = a.product_with(&b);
        assert_eq!(p.samples(), &[Sample::new(1, 30.0)]);
    }

    #[test]
    fn restricted_is_inclusive() {
        let s = series(&[(0, 1.0), (10, 2.0), (20, 3.0)]);
        let r = s.restricted(0, 10);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn shifted_moves_timestamps() {
        let s = series(&[(0, 1.0), (10, 2.0)]);
        let moved = s.shifted(-5);
        assert_eq!(moved.first_ts(), Some(-5));
        assert_eq!(moved.last_ts(), Some(5));
    }

    #[test]
    fn resample_bins_and_interpolates() {
        // Bins of 10: [0..10) populated, [10..20) empty, [20..30) populated.
        let s = series(&[(2, 1.0), (4, 3.0), (25, 6.0)]);
        let r = s.resampled(10);
        assert_eq!(r.len(), 3);
        assert_eq!(r.samples()[0], Sample::new(0, 2.0));
        assert_eq!(r.samples()[1], Sample::new(10, 4.0)); // interpolated
        assert_eq!(r.samples()[2], Sample::new(20, 6.0));
    }

    #[test]
    fn resample_empty_or_bad_step() {
        assert!(series(&[]).resampled(10).is_empty());
        assert!(series(&[(0, 1.0)]).resampled(0).is_empty());
    }

    #[test]
    fn resample_negative_timestamps_use_floor_bins() {
        let s = series(&[(-15, 2.0), (-5, 4.0)]);
        let r = s.resampled(10);
        assert_eq!(r.samples()[0].ts, -20);
        assert_eq!(r.samples()[1].ts, -10);
    }
}
