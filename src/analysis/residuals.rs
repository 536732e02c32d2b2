//! Residuals of measured curvature against a theoretical profile.
//!
//! Each measured curve is interpolated onto the theoretical x grid, then
//! compared point by point. Samples outside a curve's measured x range stay
//! `NaN` and are skipped by the error metrics.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::analysis::interp::LinearInterp;
use crate::domain::{CurveErrors, CurveResiduals, Measurement, SampledResidual, TheoreticalPoint};

/// Interpolate every measured curve onto `theoretical` and compute residuals.
///
/// Curves are returned in name order.
pub fn sampled_residuals(measurements: &[Measurement], theoretical: &[TheoreticalPoint]) -> Vec<CurveResiduals> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for m in measurements {
        groups
            .entry(m.curve_name.as_str())
            .or_default()
            .push((m.x, m.curvature));
    }

    let groups: Vec<(&str, Vec<(f64, f64)>)> = groups.into_iter().collect();
    groups
        .into_par_iter()
        .map(|(name, samples)| {
            let interp = LinearInterp::new(samples);
            let samples = theoretical
                .iter()
                .map(|t| {
                    let k = interp.eval(t.x);
                    let residual = t.curvature - k;
                    SampledResidual {
                        x: t.x,
                        theoretical: t.curvature,
                        k,
                        residual,
                        residual_abs: residual.abs(),
                    }
                })
                .collect();
            CurveResiduals {
                curve_name: name.to_string(),
                samples,
            }
        })
        .collect()
}

/// Error metrics for one curve.
///
/// - absolute error: mean `|residual|` over finite residuals
/// - relative error: `100 · mean |residual / theoretical|` over samples whose
///   theoretical curvature exceeds `threshold` (small values would dominate)
/// - Pearson correlation between theoretical and measured curvature
pub fn compute_errors(curve: &CurveResiduals, threshold: f64) -> CurveErrors {
    let finite: Vec<&SampledResidual> = curve.samples.iter().filter(|s| s.residual.is_finite()).collect();

    let absolute_error = mean(finite.iter().map(|s| s.residual_abs));
    let relative_error = 100.0
        * mean(
            finite
                .iter()
                .filter(|s| s.theoretical > threshold)
                .map(|s| (s.residual / s.theoretical).abs()),
        );
    let pearson = pearson(
        &finite.iter().map(|s| s.theoretical).collect::<Vec<_>>(),
        &finite.iter().map(|s| s.k).collect::<Vec<_>>(),
    );

    CurveErrors {
        curve_name: curve.curve_name.clone(),
        absolute_error,
        relative_error,
        pearson,
        n: finite.len(),
    }
}

/// Error metrics for every curve (parallel), in input order.
pub fn compute_all_errors(curves: &[CurveResiduals], threshold: f64) -> Vec<CurveErrors> {
    curves.par_iter().map(|c| compute_errors(c, threshold)).collect()
}

/// Pearson correlation; `NaN` with fewer than two samples or zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let ma = a[..n].iter().sum::<f64>() / n as f64;
    let mb = b[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let dx = x - ma;
        let dy = y - mb;
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    if va == 0.0 || vb == 0.0 {
        return f64::NAN;
    }
    cov / (va * vb).sqrt()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}
