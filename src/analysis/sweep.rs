//! Lag sweep: correlation strength as a function of time offset.
//!
//! For each offset in an inclusive range, the reference series is
//! shifted, re-joined to the response series by nearest match, and split
//! into two partitions by a threshold on the (shifted) reference value.
//! Each partition's Pearson r and Fisher z are recomputed from scratch;
//! the recorded `z_flip = |z_above| + |z_below|` measures how strongly
//! the two partitions diverge at that offset. Offsets are independent,
//! so the sweep fans out across a rayon pool.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::SweepParams;
use crate::error::EngineError;
use crate::result::{LagSweepReport, SweepPoint};
use crate::series::TimestampedSeries;
use crate::statistics::{fisher_z, pearson, z_flip};

use super::align::{align, AlignChannel};

/// Run a lag sweep of `reference` against `response`.
///
/// `min_samples` is the per-partition floor below which a coefficient is
/// left undefined. Offsets are produced ascending with a fixed step; the
/// range is inclusive at both ends (see [`SweepParams::offsets`]).
pub fn lag_sweep(
    response: &TimestampedSeries,
    reference: &TimestampedSeries,
    params: &SweepParams,
    min_samples: usize,
) -> Result<LagSweepReport, EngineError> {
    if params.step <= 0 {
        return Err(EngineError::InvalidSweepStep(params.step));
    }

    let offsets = params.offsets();
    info!(
        response = response.name(),
        reference = reference.name(),
        offsets = offsets.len(),
        threshold = params.threshold,
        "starting lag sweep"
    );

    let points: Vec<SweepPoint> = offsets
        .par_iter()
        .map(|&offset| sweep_point(response, reference, offset, params, min_samples))
        .collect();

    let best_offset = select_best(&points);
    Ok(LagSweepReport {
        points,
        best_offset,
        threshold: params.threshold,
    })
}

/// One offset: shift, re-join, partition, correlate.
fn sweep_point(
    response: &TimestampedSeries,
    reference: &TimestampedSeries,
    offset: i64,
    params: &SweepParams,
    min_samples: usize,
) -> SweepPoint {
    let shifted = reference.shifted(offset);
    let (table, _) = align(
        response,
        &[AlignChannel::required(&shifted)],
        params.tolerance,
    );

    let mut above = (Vec::new(), Vec::new());
    let mut below = (Vec::new(), Vec::new());
    for row in table.rows() {
        // The channel is required, so the value is always present here.
        if let Some(reference_value) = row.channels[0] {
            let bucket = if reference_value > params.threshold {
                &mut above
            } else {
                &mut below
            };
            bucket.0.push(reference_value);
            bucket.1.push(row.primary);
        }
    }

    let r_above = correlate(&above.0, &above.1, min_samples);
    let r_below = correlate(&below.0, &below.1, min_samples);
    let flip = match (r_above, r_below) {
        (Some(ra), Some(rb)) => Some(z_flip(
            fisher_z(ra, above.0.len()),
            fisher_z(rb, below.0.len()),
        )),
        _ => None,
    };

    debug!(
        offset,
        n_above = above.0.len(),
        n_below = below.0.len(),
        ?flip,
        "sweep offset done"
    );

    SweepPoint {
        offset,
        n_above: above.0.len(),
        n_below: below.0.len(),
        r_above,
        r_below,
        z_flip: flip,
    }
}

fn correlate(x: &[f64], y: &[f64], min_samples: usize) -> Option<f64> {
    if x.len() < min_samples.max(2) {
        return None;
    }
    pearson(x, y)
}

/// Best lag: maximal `z_flip`; ties resolve to the smallest absolute
/// offset, remaining ties to the more negative offset. Points with an
/// undefined or NaN `z_flip` never win.
fn select_best(points: &[SweepPoint]) -> Option<i64> {
    let mut best: Option<(f64, i64)> = None;
    for point in points {
        let Some(flip) = point.z_flip else { continue };
        if flip.is_nan() {
            continue;
        }
        let replace = match best {
            None => true,
            Some((best_flip, best_offset)) => {
                flip > best_flip
                    || (flip == best_flip && point.offset.abs() < best_offset.abs())
            }
        };
        if replace {
            best = Some((flip, point.offset));
        }
    }
    best.map(|(_, offset)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MICROS_PER_SEC;

    /// Response that copies the reference `lag` later: sweeping the
    /// reference forward by `lag` should line the two up exactly.
    fn lagged_pair(lag: i64) -> (TimestampedSeries, TimestampedSeries) {
        let reference = TimestampedSeries::from_pairs(
            "alt",
            (0..400).map(|i| {
                let ts = i * MICROS_PER_SEC;
                (ts, (i as f64 * 0.05).sin())
            }),
        );
        let response = TimestampedSeries::from_pairs(
            "flow",
            (0..400).map(|i| {
                let ts = i * MICROS_PER_SEC + lag;
                (ts, (i as f64 * 0.05).sin())
            }),
        );
        (response, reference)
    }

    fn params(range: i64, step: i64) -> SweepParams {
        SweepParams {
            start: -range,
            end: range,
            step,
            threshold: 0.0,
            tolerance: None,
        }
    }

    #[test]
    fn output_is_ordered_and_gapless() {
        let (response, reference) = lagged_pair(0);
        let report = lag_sweep(
            &response,
            &reference,
            &params(5 * MICROS_PER_SEC, MICROS_PER_SEC),
            2,
        )
        .unwrap();

        assert_eq!(report.points.len(), 11);
        for pair in report.points.windows(2) {
            assert_eq!(pair[1].offset - pair[0].offset, MICROS_PER_SEC);
        }
    }

    #[test]
    fn finds_the_introduced_lag() {
        let lag = 3 * MICROS_PER_SEC;
        let (response, reference) = lagged_pair(lag);
        let report = lag_sweep(
            &response,
            &reference,
            &params(5 * MICROS_PER_SEC, MICROS_PER_SEC),
            2,
        )
        .unwrap();

        assert_eq!(report.best_offset, Some(lag));
        let best = report.best_point().unwrap();
        assert!(best.r_above.unwrap() > 0.999);
        assert!(best.r_below.unwrap() > 0.999);
    }

    #[test]
    fn invalid_step_is_an_error() {
        let (response, reference) = lagged_pair(0);
        let result = lag_sweep(&response, &reference, &params(5, 0), 2);
        assert!(matches!(result, Err(EngineError::InvalidSweepStep(0))));
    }

    #[test]
    fn empty_partitions_leave_flip_undefined() {
        // Reference entirely above threshold: the below partition stays
        // empty at every offset.
        let reference = TimestampedSeries::from_pairs(
            "alt",
            (0..50).map(|i| (i * MICROS_PER_SEC, 1.0 + i as f64)),
        );
        let response = TimestampedSeries::from_pairs(
            "flow",
            (0..50).map(|i| (i * MICROS_PER_SEC, i as f64)),
        );
        let report = lag_sweep(
            &response,
            &reference,
            &params(2 * MICROS_PER_SEC, MICROS_PER_SEC),
            2,
        )
        .unwrap();

        assert!(report.points.iter().all(|p| p.z_flip.is_none()));
        assert_eq!(report.best_offset, None);
    }

    #[test]
    fn tie_breaks_prefer_smallest_absolute_offset() {
        let points = vec![
            SweepPoint {
                offset: -2,
                n_above: 5,
                n_below: 5,
                r_above: Some(0.5),
                r_below: Some(0.5),
                z_flip: Some(3.0),
            },
            SweepPoint {
                offset: 1,
                n_above: 5,
                n_below: 5,
                r_above: Some(0.5),
                r_below: Some(0.5),
                z_flip: Some(3.0),
            },
        ];
        assert_eq!(select_best(&points), Some(1));
    }

    #[test]
    fn equal_magnitude_ties_prefer_negative_offset() {
        let point = |offset: i64| SweepPoint {
            offset,
            n_above: 5,
            n_below: 5,
            r_above: Some(0.5),
            r_below: Some(0.5),
            z_flip: Some(3.0),
        };
        assert_eq!(select_best(&[point(-2), point(2)]), Some(-2));
    }
}
