//! Terminal reports for the `kappa` subcommands.
//!
//! Formatting lives here so the numerical code stays free of presentation.

use nalgebra::DVector;

use crate::app::pipeline::{ConvertOutput, ResidualOutput};
use crate::domain::{ConvertConfig, CurveKind};

/// Format a solution vector, one component per line.
pub fn format_solution(x: &DVector<f64>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Solution (n={}):\n", x.len()));
    for (i, v) in x.iter().enumerate() {
        out.push_str(&format!("x[{i}] = {v:.10}\n"));
    }
    out
}

/// Format the per-curve table for `kappa convert`.
pub fn format_convert_summary(run: &ConvertOutput, config: &ConvertConfig) -> String {
    let mut out = String::new();

    out.push_str("=== kappa - curvature conversion ===\n");
    out.push_str(&format!("Input: {}\n", config.input.display()));
    out.push_str(&format!(
        "Curves: {} read | {} converted | {} skipped\n",
        run.records.len(),
        run.curves.len(),
        run.skipped
    ));
    out.push_str(&format!(
        "Samples/segment: {} | scale: {} um/px\n\n",
        config.samples, config.scale
    ));

    out.push_str(
        format!(
            "{:<12} {:<8} {:>8} {:>14} {:>14} {:>14}",
            "curve", "kind", "segments", "length (um)", "mean k (1/um)", "std k (1/um)"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("{:-<12} {:-<8} {:-<8} {:-<14} {:-<14} {:-<14}\n", "", "", "", "", "", ""));

    for c in &run.curves {
        let kind = match c.kind {
            CurveKind::Bezier => "bezier",
            CurveKind::BSpline => "bspline",
        };
        out.push_str(&format!(
            "{:<12} {:<8} {:>8} {:>14.4} {:>14} {:>14}\n",
            truncate(&c.name, 12),
            kind,
            c.segments.len(),
            c.length,
            fmt_metric(c.mean_curvature, 6),
            fmt_metric(c.curvature_std, 6),
        ));
    }

    out
}

/// Format per-curve error metrics for `kappa residuals`.
pub fn format_errors(run: &ResidualOutput, threshold: f64) -> String {
    let mut out = String::new();

    out.push_str("=== kappa - residuals against theory ===\n");
    out.push_str(&format!("Relative error threshold: {threshold}\n\n"));

    out.push_str(&format!(
        "{:<20} {:>6} {:>14} {:>12} {:>10}\n",
        "curve", "n", "abs error", "rel err %", "pearson"
    ));
    out.push_str(&format!("{:-<20} {:-<6} {:-<14} {:-<12} {:-<10}\n", "", "", "", "", ""));

    for e in &run.errors {
        out.push_str(&format!(
            "{:<20} {:>6} {:>14} {:>12} {:>10}\n",
            truncate(&e.curve_name, 20),
            e.n,
            fmt_metric(e.absolute_error, 6),
            fmt_metric(e.relative_error, 3),
            fmt_metric(e.pearson, 4),
        ));
    }

    out
}

fn fmt_metric(v: f64, decimals: usize) -> String {
    if v.is_finite() { format!("{v:.decimals$}") } else { "n/a".to_string() }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
