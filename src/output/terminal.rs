//! Terminal output formatting with colors.

use colored::Colorize;

use crate::result::{AnalysisReport, CorrelationResult, LagSweepReport};
use crate::types::MICROS_PER_SEC;

fn stat(value: Option<f64>) -> String {
    match value {
        None => "—".to_string(),
        Some(v) if v.is_nan() => "—".to_string(),
        Some(v) if v.is_infinite() => {
            if v > 0.0 {
                "+inf".to_string()
            } else {
                "-inf".to_string()
            }
        }
        Some(v) => format!("{:.4}", v),
    }
}

fn segment_line(result: &CorrelationResult) -> String {
    format!(
        "    {:<20} n={:<8} r={:<10} p={:<12} z={}\n",
        result.segment,
        result.n,
        stat(result.r),
        stat(result.p),
        stat(result.z),
    )
}

/// Format a correlation report for human-readable terminal output.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("phasecorr\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Channels: {} vs {}\n",
        report.metadata.channel_x, report.metadata.channel_y
    ));
    match report.metadata.tolerance {
        Some(tol) => output.push_str(&format!(
            "  Tolerance: {:.1} s\n",
            tol as f64 / MICROS_PER_SEC as f64
        )),
        None => output.push_str("  Tolerance: unbounded\n"),
    }
    output.push_str(&format!(
        "  Rows: {} aligned, {} dropped (required channel missing)\n",
        report.metadata.alignment.rows_out, report.metadata.alignment.rows_dropped
    ));
    output.push('\n');

    output.push_str("  Segments:\n");
    for segment in &report.segments {
        output.push_str(&segment_line(segment));
    }
    output.push_str(&segment_line(&report.total));
    output.push('\n');

    if let Some(contrast) = &report.contrast {
        let headline = format!(
            "\u{394} {} - {}  z_flip = {}",
            contrast.segment_a,
            contrast.segment_b,
            stat(contrast.z_flip)
        );
        output.push_str(&format!("  {}\n", headline.as_str().cyan().bold()));
        output.push_str(&format!(
            "    \u{394}r={}  \u{394}p={}  \u{394}z={}  (derived contrast, not a test)\n",
            stat(contrast.r),
            stat(contrast.p),
            stat(contrast.z),
        ));
        output.push('\n');
    }

    output.push_str(&sep);
    output.push('\n');
    output.push_str("Note: undefined statistics (fewer than the minimum valid pairs,\n");
    output.push_str("or zero variance) are shown as \u{2014}, never coerced to zero.\n");

    output
}

/// Format a lag sweep for human-readable terminal output.
pub fn format_sweep(report: &LagSweepReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("phasecorr lag sweep\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Offsets tested: {} (threshold {})\n",
        report.points.len(),
        report.threshold
    ));

    match report.best_point() {
        Some(best) => {
            let hours = best.offset as f64 / MICROS_PER_SEC as f64 / 3600.0;
            let line = format!(
                "\u{2713} Best lag: {:+.2} h  z_flip = {}",
                hours,
                stat(best.z_flip)
            );
            output.push_str(&format!("  {}\n", line.as_str().green().bold()));
            output.push_str(&format!(
                "    r_above={}  (n={})   r_below={}  (n={})\n",
                stat(best.r_above),
                best.n_above,
                stat(best.r_below),
                best.n_below,
            ));
        }
        None => {
            output.push_str(&format!(
                "  {}\n",
                "\u{26A0} No offset produced a defined z-flip".yellow().bold()
            ));
        }
    }

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');

    output
}
