//! Dense evaluation of cubic Bezier segments.
//!
//! A point on a segment is `Pᵀ · M · [1, t, t², t³]ᵀ`, where `P` stacks the four
//! control points as rows and `M` is the cubic Bernstein basis matrix.

use nalgebra::{Matrix4, Point2, Vector4};

use crate::domain::BezierSegment;

/// Cubic Bernstein basis in power form.
pub fn bezier_basis() -> Matrix4<f64> {
    Matrix4::new(
        1.0, -3.0, 3.0, -1.0, //
        0.0, 3.0, -6.0, 3.0, //
        0.0, 0.0, 3.0, -3.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// `n` evenly spaced parameters in `[0, 1]`, both ends included.
///
/// `n == 1` yields `[0.0]`, `n == 0` yields nothing.
pub fn linspace_unit(n: usize) -> impl Iterator<Item = f64> {
    let denom = n.saturating_sub(1).max(1) as f64;
    (0..n).map(move |i| i as f64 / denom)
}

impl BezierSegment {
    /// Evaluate the segment at `t` using a precomputed basis matrix.
    pub fn eval_with(&self, basis: &Matrix4<f64>, t: f64) -> Point2<f64> {
        let weights = basis * Vector4::new(1.0, t, t * t, t * t * t);
        let mut out = Point2::origin();
        for (w, p) in weights.iter().zip(&self.points) {
            out.coords += p.coords * *w;
        }
        out
    }

    pub fn eval(&self, t: f64) -> Point2<f64> {
        self.eval_with(&bezier_basis(), t)
    }
}

/// Sample every segment at `n` uniform parameters, in segment order.
///
/// Adjacent segments share an endpoint; it is emitted once per segment.
pub fn evaluate_bezier(segments: &[BezierSegment], n: usize) -> Vec<Point2<f64>> {
    let basis = bezier_basis();
    let mut out = Vec::with_capacity(segments.len() * n);
    for segment in segments {
        out.extend(linspace_unit(n).map(|t| segment.eval_with(&basis, t)));
    }
    out
}
