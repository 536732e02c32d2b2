//! Piecewise-linear interpolation without extrapolation.

use crate::domain::TheoreticalPoint;

/// Linear interpolant over `(x, y)` samples.
///
/// Samples are sorted by `x`; non-finite pairs are dropped and for repeated `x`
/// the first sample wins. Evaluating outside `[min x, max x]` yields `NaN`.
#[derive(Debug, Clone)]
pub struct LinearInterp {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterp {
    pub fn new(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut pairs: Vec<(f64, f64)> = pairs
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        // Stable sort keeps the first of equal xs in front for dedup.
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|later, earlier| later.0 == earlier.0);

        let (xs, ys) = pairs.into_iter().unzip();
        Self { xs, ys }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// `(min x, max x)` of the samples.
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((*self.xs.first()?, *self.xs.last()?))
    }

    pub fn eval(&self, x: f64) -> f64 {
        let Some((lo, hi)) = self.domain() else {
            return f64::NAN;
        };
        if !(x >= lo && x <= hi) {
            return f64::NAN;
        }

        // Number of samples with xs[i] <= x; at least 1 because x >= lo.
        let j = self.xs.partition_point(|&v| v <= x);
        if j == self.xs.len() {
            return self.ys[j - 1];
        }
        let i = j - 1;
        let (x0, x1) = (self.xs[i], self.xs[j]);
        let (y0, y1) = (self.ys[i], self.ys[j]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

/// Sample a theoretical profile at `xs`.
pub fn sample_theoretical(theory: &[TheoreticalPoint], xs: &[f64]) -> Vec<TheoreticalPoint> {
    let interp = LinearInterp::new(theory.iter().map(|p| (p.x, p.curvature)));
    xs.iter()
        .map(|&x| TheoreticalPoint {
            x,
            curvature: interp.eval(x),
        })
        .collect()
}

/// Upper bound on the number of points `arange_inclusive` will produce.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// `min, min + step, …` up to `max` (inclusive within rounding).
///
/// `None` for a non-finite or non-positive `step`, non-finite bounds, or a grid
/// longer than `MAX_GRID_POINTS`. `max < min` gives an empty grid.
pub fn arange_inclusive(min: f64, max: f64, step: f64) -> Option<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && step.is_finite() && step > 0.0) {
        return None;
    }
    if max < min {
        return Some(Vec::new());
    }
    let steps = ((max - min) / step + 1e-9).floor();
    if !(steps < MAX_GRID_POINTS as f64) {
        return None;
    }
    let n = steps as usize + 1;
    Some((0..n).map(|i| min + step * i as f64).collect())
}
