//! Delimited-text rendering of analysis results.
//!
//! Correlation mode emits `segment,r,p,z` rows; sweep mode emits
//! `offset_secs,r_above,r_below,z_flip` rows ordered by offset.
//! Undefined statistics render as empty fields, never as zero. The two
//! derived rows (`phase_cancellation`, `z_flip`) are contrasts of the
//! segment rows above them, not independently computed results.

use std::io::{self, Write};

use crate::result::{AnalysisReport, LagSweepReport};
use crate::types::MICROS_PER_SEC;

/// Format an optional statistic: empty for undefined or NaN, `inf` /
/// `-inf` for the saturated Fisher boundary.
fn field(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_nan() => String::new(),
        Some(v) => v.to_string(),
    }
}

/// Render a correlation report as delimited text.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::from("segment,r,p,z\n");
    for segment in &report.segments {
        out.push_str(&format!(
            "{},{},{},{}\n",
            segment.segment,
            field(segment.r),
            field(segment.p),
            field(segment.z),
        ));
    }
    out.push_str(&format!(
        "{},{},{},{}\n",
        report.total.segment,
        field(report.total.r),
        field(report.total.p),
        field(report.total.z),
    ));
    if let Some(contrast) = &report.contrast {
        out.push_str(&format!(
            "phase_cancellation,{},{},{}\n",
            field(contrast.r),
            field(contrast.p),
            field(contrast.z),
        ));
        out.push_str(&format!("z_flip,,,{}\n", field(contrast.z_flip)));
    }
    out
}

/// Render a lag sweep as delimited text, one row per tested offset.
pub fn render_sweep(report: &LagSweepReport) -> String {
    let mut out = String::from("offset_secs,r_above,r_below,z_flip\n");
    for point in &report.points {
        out.push_str(&format!(
            "{},{},{},{}\n",
            point.offset as f64 / MICROS_PER_SEC as f64,
            field(point.r_above),
            field(point.r_below),
            field(point.z_flip),
        ));
    }
    out
}

/// Write a correlation report to any sink.
pub fn write_report<W: Write>(mut writer: W, report: &AnalysisReport) -> io::Result<()> {
    writer.write_all(render_report(report).as_bytes())
}

/// Write a lag sweep to any sink.
pub fn write_sweep<W: Write>(mut writer: W, report: &LagSweepReport) -> io::Result<()> {
    writer.write_all(render_sweep(report).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::align::AlignReport;
    use crate::result::{CorrelationResult, Metadata, PhaseContrast, SweepPoint};

    fn report() -> AnalysisReport {
        AnalysisReport {
            segments: vec![
                CorrelationResult {
                    segment: "ascending".into(),
                    n: 40,
                    r: Some(0.5),
                    p: Some(0.001),
                    z: Some(3.2),
                },
                CorrelationResult::undefined("descending", 1),
            ],
            total: CorrelationResult {
                segment: "total".into(),
                n: 41,
                r: Some(0.4),
                p: Some(0.01),
                z: Some(2.5),
            },
            contrast: Some(PhaseContrast {
                segment_a: "ascending".into(),
                segment_b: "descending".into(),
                r: None,
                p: None,
                z: None,
                z_flip: None,
            }),
            metadata: Metadata {
                channel_x: "alt".into(),
                channel_y: "flow".into(),
                tolerance: Some(30_000_000),
                alignment: AlignReport {
                    rows_in: 50,
                    rows_out: 41,
                    rows_dropped: 9,
                },
            },
        }
    }

    #[test]
    fn undefined_fields_render_empty() {
        let text = render_report(&report());
        assert!(text.starts_with("segment,r,p,z\n"));
        assert!(text.contains("ascending,0.5,0.001,3.2\n"));
        assert!(text.contains("descending,,,\n"));
        assert!(text.contains("z_flip,,,\n"));
    }

    #[test]
    fn infinity_renders_as_inf() {
        assert_eq!(field(Some(f64::INFINITY)), "inf");
        assert_eq!(field(Some(f64::NEG_INFINITY)), "-inf");
        assert_eq!(field(Some(f64::NAN)), "");
        assert_eq!(field(None), "");
    }

    #[test]
    fn sweep_rows_are_in_offset_order() {
        let sweep = LagSweepReport {
            points: vec![
                SweepPoint {
                    offset: -MICROS_PER_SEC,
                    n_above: 5,
                    n_below: 5,
                    r_above: Some(0.1),
                    r_below: Some(-0.1),
                    z_flip: Some(0.5),
                },
                SweepPoint {
                    offset: 0,
                    n_above: 5,
                    n_below: 5,
                    r_above: None,
                    r_below: None,
                    z_flip: None,
                },
            ],
            best_offset: Some(-MICROS_PER_SEC),
            threshold: 0.0,
        };
        let text = render_sweep(&sweep);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "offset_secs,r_above,r_below,z_flip");
        assert!(lines[1].starts_with("-1,"));
        assert_eq!(lines[2], "0,,,");
    }
}
