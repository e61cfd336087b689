//! Daily lag estimation between a reference peak and a response peak.
//!
//! For each calendar day of the reference series, find the day's maximum
//! (for a lunar-altitude channel, the lunar noon), then the response
//! series' maximum strictly after it within a bounded search window. The
//! distance between the two peaks is that day's lag. Days whose window
//! holds no response sample inherit the previous day's estimate; samples
//! dated before the first estimate are backfilled with it when the lags
//! are applied.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::series::TimestampedSeries;
use crate::statistics::{max_in_window, max_sample};
use crate::types::{Sample, Timestamp};

/// One day's lag estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLag {
    /// Calendar day (UTC) of the reference peak.
    pub day: NaiveDate,
    /// Timestamp of the reference peak.
    pub reference_peak: Timestamp,
    /// Timestamp of the matched response peak; `None` when the lag was
    /// inherited from the previous day.
    pub response_peak: Option<Timestamp>,
    /// Lag in microseconds (response peak minus reference peak).
    pub lag: Timestamp,
}

/// Calendar day of a timestamp, UTC.
fn day_of(ts: Timestamp) -> Option<NaiveDate> {
    DateTime::from_timestamp_micros(ts).map(|dt| dt.date_naive())
}

/// Estimate one lag per calendar day of the reference series.
///
/// `max_lag` bounds the search window: the response peak is looked for in
/// `(reference_peak, reference_peak + max_lag]`, which may reach into the
/// following day.
pub fn estimate_daily_lags(
    reference: &TimestampedSeries,
    response: &TimestampedSeries,
    max_lag: Timestamp,
) -> Vec<DailyLag> {
    let mut lags: Vec<DailyLag> = Vec::new();

    for day_series in split_by_day(reference) {
        let Some(peak) = max_sample(&day_series.1) else {
            continue;
        };
        let day = day_series.0;

        match max_in_window(response, peak.ts, peak.ts + max_lag) {
            Some(response_peak) => {
                lags.push(DailyLag {
                    day,
                    reference_peak: peak.ts,
                    response_peak: Some(response_peak.ts),
                    lag: response_peak.ts - peak.ts,
                });
            }
            None => {
                // No response peak in the window: inherit yesterday's
                // estimate if there is one, otherwise leave the day out.
                if let Some(prev) = lags.last().copied() {
                    warn!(%day, inherited_lag = prev.lag, "no response peak; inheriting lag");
                    lags.push(DailyLag {
                        day,
                        reference_peak: peak.ts,
                        response_peak: None,
                        lag: prev.lag,
                    });
                } else {
                    warn!(%day, "no response peak and no prior estimate; skipping day");
                }
            }
        }
    }

    info!(
        reference = reference.name(),
        response = response.name(),
        days = lags.len(),
        "estimated daily lags"
    );
    lags
}

/// Shift each response sample earlier by its day's lag.
///
/// A sample's day uses the most recent estimate at or before it;
/// samples dated before the first estimate are backfilled with that first
/// estimate. With no estimates at all the series is returned unshifted.
pub fn apply_daily_lags(response: &TimestampedSeries, lags: &[DailyLag]) -> TimestampedSeries {
    let name = format!("{}_lagged", response.name());
    if lags.is_empty() {
        return response.clone().renamed(name);
    }

    let shifted: Vec<Sample> = response
        .samples()
        .iter()
        .filter_map(|s| {
            let day = day_of(s.ts)?;
            let lag = lag_for_day(lags, day);
            Some(Sample::new(s.ts - lag, s.value))
        })
        .collect();
    TimestampedSeries::new(name, shifted)
}

/// Lag for a day: the last estimate with `day <= target`, else the first.
fn lag_for_day(lags: &[DailyLag], target: NaiveDate) -> Timestamp {
    let idx = lags.partition_point(|l| l.day <= target);
    if idx == 0 {
        lags[0].lag
    } else {
        lags[idx - 1].lag
    }
}

/// Split a series into per-day sub-series, in day order.
fn split_by_day(series: &TimestampedSeries) -> Vec<(NaiveDate, TimestampedSeries)> {
    let mut out: Vec<(NaiveDate, Vec<Sample>)> = Vec::new();
    for sample in series.samples() {
        let Some(day) = day_of(sample.ts) else {
            continue;
        };
        match out.last_mut() {
            Some((current, bucket)) if *current == day => bucket.push(*sample),
            _ => out.push((day, vec![*sample])),
        }
    }
    out.into_iter()
        .map(|(day, samples)| (day, TimestampedSeries::new(series.name(), samples)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MICROS_PER_HOUR, MICROS_PER_MIN};

    const DAY: i64 = 24 * MICROS_PER_HOUR;

    /// Reference peaks at hour 12 of each day; response peaks `lag_min`
    /// minutes later.
    fn peaked(days: i64, lag_min: i64) -> (TimestampedSeries, TimestampedSeries) {
        let mut reference = Vec::new();
        let mut response = Vec::new();
        for d in 0..days {
            for h in 0..24 {
                let ts = d * DAY + h * MICROS_PER_HOUR;
                // Triangle with maximum at h == 12.
                let value = 12.0 - (h as f64 - 12.0).abs();
                reference.push((ts, value));
                response.push((ts + lag_min * MICROS_PER_MIN, value));
            }
        }
        (
            TimestampedSeries::from_pairs("alt", reference),
            TimestampedSeries::from_pairs("rate", response),
        )
    }

    #[test]
    fn estimates_constant_lag() {
        let (reference, response) = peaked(3, 42);
        let lags = estimate_daily_lags(&reference, &response, 10 * MICROS_PER_HOUR);
        assert_eq!(lags.len(), 3);
        for lag in &lags {
            assert_eq!(lag.lag, 42 * MICROS_PER_MIN);
            assert!(lag.response_peak.is_some());
        }
    }

    #[test]
    fn missing_window_inherits_previous_lag() {
        let (reference, full_response) = peaked(2, 30);
        // Truncate the response before day 1's window so its peak search
        // comes up empty.
        let response = full_response.restricted(0, DAY - MICROS_PER_HOUR);
        let lags = estimate_daily_lags(&reference, &response, 10 * MICROS_PER_HOUR);
        assert_eq!(lags.len(), 2);
        assert_eq!(lags[1].lag, lags[0].lag);
        assert_eq!(lags[1].response_peak, None);
    }

    #[test]
    fn no_prior_estimate_skips_day() {
        let (reference, _) = peaked(1, 30);
        let empty = TimestampedSeries::from_pairs("rate", Vec::<(i64, f64)>::new());
        let lags = estimate_daily_lags(&reference, &empty, 10 * MICROS_PER_HOUR);
        assert!(lags.is_empty());
    }

    #[test]
    fn applies_and_backfills_lags() {
        let (reference, response) = peaked(2, 60);
        let lags = estimate_daily_lags(&reference, &response, 10 * MICROS_PER_HOUR);
        let adjusted = apply_daily_lags(&response, &lags);

        // Every adjusted timestamp moved one hour earlier.
        assert_eq!(adjusted.len(), response.len());
        for (orig, adj) in response.samples().iter().zip(adjusted.samples()) {
            assert_eq!(adj.ts, orig.ts - MICROS_PER_HOUR);
        }
    }

    #[test]
    fn empty_lags_leave_series_unshifted() {
        let (_, response) = peaked(1, 30);
        let adjusted = apply_daily_lags(&response, &[]);
        assert_eq!(adjusted.samples(), response.samples());
        assert_eq!(adjusted.name(), "rate_lagged");
    }

    #[test]
    fn lag_lookup_backfills_before_first_day() {
        let lags = vec![
            DailyLag {
                day: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
                reference_peak: 0,
                response_peak: Some(10),
                lag: 10,
            },
            DailyLag {
                day: NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
                reference_peak: 0,
                response_peak: Some(20),
                lag: 20,
            },
        ];
        let before = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 5, 9).unwrap();
        assert_eq!(lag_for_day(&lags, before), 10);
        assert_eq!(lag_for_day(&lags, lags[0].day), 10);
        assert_eq!(lag_for_day(&lags, after), 20);
    }
}
