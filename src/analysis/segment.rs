//! Phase labeling of aligned rows.
//!
//! Two labelings, both derived from a single pass over a reference
//! channel in timestamp order:
//! - **trend**: `ascending` while the reference value increases against
//!   the previous known value, `descending` otherwise; the first known
//!   value is fixed to `ascending`.
//! - **macro**: from a distance-like channel, `apogean` when farther
//!   than the previous sample, `perigean` when nearer, `unknown` for the
//!   first; equal values keep the previous label.
//!
//! Rows with a missing reference value are handled per
//! [`MissingPolicy`]: `Hold` carries the previous label and comparison
//! state through the gap, `Reset` restarts as at sequence start. Neither
//! policy adds or removes rows.

use crate::config::MissingPolicy;
use crate::error::EngineError;
use crate::types::{MacroPhase, TrendPhase};

use super::align::AlignedTable;

/// Attach trend labels from `channel` to every row.
pub fn label_trend(
    table: &mut AlignedTable,
    channel: &str,
    policy: MissingPolicy,
) -> Result<(), EngineError> {
    let idx = table.resolve(channel)?;
    let mut prev_value: Option<f64> = None;
    let mut prev_label: Option<TrendPhase> = None;

    for row in table.rows_mut() {
        let value = match idx {
            None => Some(row.primary),
            Some(i) => row.channels[i],
        };
        match value {
            Some(v) => {
                let label = match prev_value {
                    None => TrendPhase::Ascending,
                    Some(p) if v > p => TrendPhase::Ascending,
                    Some(_) => TrendPhase::Descending,
                };
                row.trend = Some(label);
                prev_value = Some(v);
                prev_label = Some(label);
            }
            None => match policy {
                MissingPolicy::Hold => row.trend = prev_label,
                MissingPolicy::Reset => {
                    row.trend = None;
                    prev_value = None;
                    prev_label = None;
                }
            },
        }
    }
    Ok(())
}

/// Attach macro phase labels from a distance-like `channel` to every row.
pub fn label_macro(
    table: &mut AlignedTable,
    channel: &str,
    policy: MissingPolicy,
) -> Result<(), EngineError> {
    let idx = table.resolve(channel)?;
    let mut prev_value: Option<f64> = None;
    let mut prev_label: Option<MacroPhase> = None;

    for row in table.rows_mut() {
        let value = match idx {
            None => Some(row.primary),
            Some(i) => row.channels[i],
        };
        match value {
            Some(d) => {
                let label = match prev_value {
                    None => MacroPhase::Unknown,
                    Some(p) if d > p => MacroPhase::Apogean,
                    Some(p) if d < p => MacroPhase::Perigean,
                    Some(_) => prev_label.unwrap_or(MacroPhase::Unknown),
                };
                row.macro_phase = Some(label);
                prev_value = Some(d);
                prev_label = Some(label);
            }
            None => match policy {
                MissingPolicy::Hold => row.macro_phase = prev_label,
                MissingPolicy::Reset => {
                    row.macro_phase = None;
                    prev_value = None;
                    prev_label = None;
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::align::{align, AlignChannel};
    use crate::series::TimestampedSeries;

    fn table_with(reference: &[(i64, f64)], secondary: &[(i64, Option<f64>)]) -> AlignedTable {
        let primary = TimestampedSeries::from_pairs("ref", reference.iter().copied());
        // Build a sparse secondary so some rows miss a value.
        let present: Vec<(i64, f64)> = secondary
            .iter()
            .filter_map(|&(ts, v)| v.map(|v| (ts, v)))
            .collect();
        let alt = TimestampedSeries::from_pairs("alt", present);
        let (table, _) = align(&primary, &[AlignChannel::optional(&alt)], Some(0));
        table
    }

    fn trend_labels(table: &AlignedTable) -> Vec<Option<TrendPhase>> {
        table.rows().iter().map(|r| r.trend).collect()
    }

    #[test]
    fn first_row_is_ascending() {
        let mut table = table_with(&[(0, 5.0), (1, 4.0), (2, 6.0)], &[]);
        label_trend(&mut table, "ref", MissingPolicy::Hold).unwrap();
        assert_eq!(
            trend_labels(&table),
            vec![
                Some(TrendPhase::Ascending),
                Some(TrendPhase::Descending),
                Some(TrendPhase::Ascending),
            ]
        );
    }

    #[test]
    fn equal_values_label_descending() {
        let mut table = table_with(&[(0, 5.0), (1, 5.0)], &[]);
        label_trend(&mut table, "ref", MissingPolicy::Hold).unwrap();
        assert_eq!(table.rows()[1].trend, Some(TrendPhase::Descending));
    }

    #[test]
    fn hold_carries_state_through_gaps() {
        let mut table = table_with(
            &[(0, 1.0), (1, 1.0), (2, 1.0), (3, 1.0)],
            &[(0, Some(1.0)), (1, Some(2.0)), (2, None), (3, Some(1.5))],
        );
        label_trend(&mut table, "alt", MissingPolicy::Hold).unwrap();
        // Gap row keeps the ascending label; the next value compares
        // against 2.0 (the last known), so 1.5 is descending.
        assert_eq!(
            trend_labels(&table),
            vec![
                Some(TrendPhase::Ascending),
                Some(TrendPhase::Ascending),
                Some(TrendPhase::Ascending),
                Some(TrendPhase::Descending),
            ]
        );
    }

    #[test]
    fn reset_restarts_after_gaps() {
        let mut table = table_with(
            &[(0, 1.0), (1, 1.0), (2, 1.0), (3, 1.0)],
            &[(0, Some(1.0)), (1, Some(2.0)), (2, None), (3, Some(1.5))],
        );
        label_trend(&mut table, "alt", MissingPolicy::Reset).unwrap();
        assert_eq!(
            trend_labels(&table),
            vec![
                Some(TrendPhase::Ascending),
                Some(TrendPhase::Ascending),
                None,
                Some(TrendPhase::Ascending),
            ]
        );
    }

    #[test]
    fn macro_labels_follow_distance() {
        let mut table = table_with(&[(0, 100.0), (1, 120.0), (2, 110.0), (3, 110.0)], &[]);
        label_macro(&mut table, "ref", MissingPolicy::Hold).unwrap();
        let labels: Vec<Option<MacroPhase>> =
            table.rows().iter().map(|r| r.macro_phase).collect();
        assert_eq!(
            labels,
            vec![
                Some(MacroPhase::Unknown),
                Some(MacroPhase::Apogean),
                Some(MacroPhase::Perigean),
                Some(MacroPhase::Perigean), // equal keeps the previous label
            ]
        );
    }

    #[test]
    fn labeling_preserves_row_count() {
        let mut table = table_with(
            &[(0, 1.0), (1, 2.0), (2, 3.0)],
            &[(0, Some(1.0)), (1, None), (2, Some(3.0))],
        );
        let before = table.len();
        label_trend(&mut table, "alt", MissingPolicy::Hold).unwrap();
        label_macro(&mut table, "alt", MissingPolicy::Hold).unwrap();
        assert_eq!(table.len(), before);
    }

    #[test]
    fn unknown_channel_errors() {
        let mut table = table_with(&[(0, 1.0)], &[]);
        assert!(label_trend(&mut table, "missing", MissingPolicy::Hold).is_err());
    }
}
