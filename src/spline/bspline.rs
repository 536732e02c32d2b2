//! Cubic B-spline to Bezier conversion (Boehm's algorithm).
//!
//! Each B-spline span is rewritten as a cubic Bezier segment using the polar-form
//! derivation from Sederberg's *Computer Aided Geometric Design* ("Extracting
//! Bezier curves from B-splines"). The inner two Bezier points are knot-ratio
//! blends of two neighbouring control points; the outer two need one extra
//! blend against an intermediate point.
//!
//! Knot vectors are in the reduced form (no outermost knots), so a curve with
//! `count` control points needs at least `count + 2` knots. Segment `i` reads
//! knots `u[i]..=u[i + 5]`.

use nalgebra::Point2;

use crate::domain::{BSplineType, BezierSegment, DEGREE};
use crate::error::SplineError;

/// Clamped uniform knot vector for `count` control points.
///
/// `DEGREE` zeros, then `1..count - DEGREE`, then `DEGREE` copies of `count - DEGREE`.
pub fn default_knot_vector(count: usize) -> Vec<f64> {
    let last = count.saturating_sub(DEGREE);
    let mut knots = Vec::with_capacity(count + DEGREE - 1);
    knots.extend(std::iter::repeat_n(0.0, DEGREE));
    knots.extend((1..last).map(|k| k as f64));
    knots.extend(std::iter::repeat_n(last as f64, DEGREE));
    knots
}

/// Uniform knot vector `0, 1, ..., count + 1` (used for closed curves).
pub fn uniform_knot_vector(count: usize) -> Vec<f64> {
    (0..count + DEGREE - 1).map(|k| k as f64).collect()
}

/// Convert a cubic B-spline into its `count - 3` Bezier segments.
///
/// When `knots` is `None` the clamped uniform vector from `default_knot_vector`
/// is used.
pub fn bspline_to_bezier(
    control_points: &[Point2<f64>],
    degree: usize,
    knots: Option<&[f64]>,
) -> Result<Vec<BezierSegment>, SplineError> {
    if degree != DEGREE {
        return Err(SplineError::UnsupportedDegree(degree));
    }

    let count = control_points.len();
    if count < DEGREE + 1 {
        return Err(SplineError::TooFewControlPoints(count));
    }

    let default_knots;
    let u = match knots {
        Some(k) => k,
        None => {
            default_knots = default_knot_vector(count);
            default_knots.as_slice()
        }
    };

    let expected = count + DEGREE - 1;
    if u.len() < expected {
        return Err(SplineError::KnotVectorLength {
            expected,
            got: u.len(),
        });
    }

    let p = control_points;
    let n_segments = count - DEGREE;
    let mut segments = Vec::with_capacity(n_segments);

    for i in 0..n_segments {
        // ratio(a, b, c) = (u[b] - u[a]) / (u[c] - u[a]), guarded against u[c] == u[a].
        let ratio = |a: usize, b: usize, c: usize| -> Result<f64, SplineError> {
            let span = u[i + c] - u[i + a];
            if span == 0.0 {
                return Err(SplineError::DegenerateKnot {
                    segment: i,
                    lower: i + a,
                    upper: i + c,
                });
            }
            Ok((u[i + b] - u[i + a]) / span)
        };

        let b1 = lerp(p[i + 1], p[i + 2], ratio(1, 2, 4)?);
        let b2 = lerp(p[i + 1], p[i + 2], ratio(1, 3, 4)?);

        let t0 = lerp(p[i], p[i + 1], ratio(0, 2, 3)?);
        let b0 = lerp(t0, b1, ratio(1, 2, 3)?);

        let t3 = lerp(p[i + 2], p[i + 3], ratio(2, 3, 5)?);
        let b3 = lerp(b2, t3, ratio(2, 3, 4)?);

        segments.push(BezierSegment::new([b0, b1, b2, b3]));
    }

    log::debug!(
        "bspline: {count} control points -> {} Bezier segments",
        segments.len()
    );
    Ok(segments)
}

/// Convert an open or closed cubic B-spline with the toolkit's default knots.
///
/// Closed curves wrap their first three control points and use uniform knots,
/// which makes the result a periodic uniform B-spline.
pub fn bspline_segments(
    control_points: &[Point2<f64>],
    bspline_type: BSplineType,
) -> Result<Vec<BezierSegment>, SplineError> {
    match bspline_type {
        BSplineType::Open => bspline_to_bezier(control_points, DEGREE, None),
        BSplineType::Closed => {
            if control_points.len() < DEGREE + 1 {
                return Err(SplineError::TooFewControlPoints(control_points.len()));
            }
            let mut wrapped = control_points.to_vec();
            wrapped.extend_from_slice(&control_points[..DEGREE]);
            let knots = uniform_knot_vector(wrapped.len());
            bspline_to_bezier(&wrapped, DEGREE, Some(&knots))
        }
    }
}

/// Split a Bezier chain (`3m + 1` points, shared endpoints) into segments.
pub fn bezier_chain_segments(control_points: &[Point2<f64>]) -> Result<Vec<BezierSegment>, SplineError> {
    let count = control_points.len();
    if count < DEGREE + 1 || (count - 1) % DEGREE != 0 {
        return Err(SplineError::InvalidBezierChain(count));
    }

    Ok(control_points
        .windows(DEGREE + 1)
        .step_by(DEGREE)
        .map(|w| BezierSegment::new([w[0], w[1], w[2], w[3]]))
        .collect())
}

fn lerp(a: Point2<f64>, b: Point2<f64>, t: f64) -> Point2<f64> {
    a + (b - a) * t
}
