//! Signed curvature sampling along Bezier curves.
//!
//! For a cubic segment
//!
//! ```text
//! r'(t)  = 3[(1-t)²(P1-P0) + 2t(1-t)(P2-P1) + t²(P3-P2)]
//! r''(t) = 6[(1-t)(P2-2P1+P0) + t(P3-2P2+P1)]
//! κ(t)   = (x'y'' - y'x'') / |r'|³
//! ```
//!
//! Positions are reported in microns (`pixels × scale`) and curvature in
//! inverse microns (`κ / scale`).

use nalgebra::Vector2;

use crate::domain::{BezierSegment, CurveKind, CurvePoint, CurveSummary};
use crate::spline::bezier::{bezier_basis, linspace_unit};

/// Below this speed the tangent is treated as undefined.
const SPEED_EPS: f64 = 1e-12;

impl BezierSegment {
    pub fn derivative(&self, t: f64) -> Vector2<f64> {
        let [p0, p1, p2, p3] = self.points;
        let mt = 1.0 - t;
        ((p1 - p0) * (mt * mt) + (p2 - p1) * (2.0 * t * mt) + (p3 - p2) * (t * t)) * 3.0
    }

    pub fn second_derivative(&self, t: f64) -> Vector2<f64> {
        let [p0, p1, p2, p3] = self.points;
        let a = p2.coords - p1.coords * 2.0 + p0.coords;
        let b = p3.coords - p2.coords * 2.0 + p1.coords;
        (a * (1.0 - t) + b * t) * 6.0
    }

    /// Signed curvature at `t`, or `None` where the speed vanishes.
    pub fn curvature(&self, t: f64) -> Option<f64> {
        let d1 = self.derivative(t);
        let d2 = self.second_derivative(t);
        let speed = d1.norm();
        if speed < SPEED_EPS {
            return None;
        }
        Some((d1.x * d2.y - d1.y * d2.x) / (speed * speed * speed))
    }
}

/// Sample positions and curvature at `n` parameters per segment.
pub fn sample_curvature(segments: &[BezierSegment], n: usize, scale: f64) -> Vec<CurvePoint> {
    let basis = bezier_basis();
    let mut out = Vec::with_capacity(segments.len() * n);
    for segment in segments {
        for t in linspace_unit(n) {
            let p = segment.eval_with(&basis, t);
            out.push(CurvePoint {
                position: p * scale,
                curvature: segment.curvature(t).map(|k| k / scale),
            });
        }
    }
    out
}

/// Sample a curve and compute its length and curvature statistics.
///
/// The mean is the average of per-segment means (every segment has the same
/// sample count). The standard deviation runs over all defined point curvatures,
/// so join points are counted once per adjacent segment.
pub fn summarize_curve(
    name: impl Into<String>,
    kind: CurveKind,
    segments: Vec<BezierSegment>,
    n: usize,
    scale: f64,
) -> CurveSummary {
    let points = sample_curvature(&segments, n, scale);

    let length: f64 = points
        .windows(2)
        .map(|w| (w[1].position - w[0].position).norm())
        .sum();

    let segment_means: Vec<f64> = points
        .chunks(n.max(1))
        .filter_map(|chunk| mean(chunk.iter().filter_map(|p| p.curvature)))
        .collect();
    let mean_curvature = mean(segment_means.iter().copied()).unwrap_or(f64::NAN);

    let defined: Vec<f64> = points.iter().filter_map(|p| p.curvature).collect();
    let curvature_std = if defined.len() > 1 {
        let ss: f64 = defined.iter().map(|k| (k - mean_curvature).powi(2)).sum();
        (ss / (defined.len() as f64 - 1.0)).sqrt()
    } else {
        0.0
    };

    CurveSummary {
        name: name.into(),
        kind,
        segments,
        points,
        length,
        mean_curvature,
        curvature_std,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{normal_points, point_from_vector};
    use nalgebra::Point2;

    /// Standard cubic approximation of a quarter circle of radius `r`: the inner
    /// control points sit on the end tangents, `0.5523 r` from the endpoints.
    fn quarter_circle(r: f64) -> BezierSegment {
        let k = 0.552_284_749_831 * r;
        let start = Point2::new(r, 0.0);
        let end = Point2::new(0.0, r);
        BezierSegment::new([
            start,
            point_from_vector(Vector2::y(), start, k).unwrap(),
            point_from_vector(Vector2::x(), end, k).unwrap(),
            end,
        ])
    }

    #[test]
    fn fixture_polygon_is_the_classic_construction() {
        let seg = quarter_circle(2.0);
        let k = 0.552_284_749_831 * 2.0;
        assert_eq!(seg.points[1], Point2::new(2.0, k));
        assert_eq!(seg.points[2], Point2::new(k, 2.0));
    }

    #[test]
    fn normal_offsets_straddle_the_curve() {
        // Points on either normal of the tangent at the midpoint: the curve
        // bends towards the counter-clockwise side.
        let seg = quarter_circle(5.0);
        let mid = seg.eval(0.5);
        let (inner, outer) = normal_points(seg.derivative(0.5), mid, 1.0).unwrap();
        assert!(inner.coords.norm() < 5.0);
        assert!(outer.coords.norm() > 5.0);
    }

    #[test]
    fn quarter_circle_has_curvature_one_over_r() {
        let r = 5.0;
        let seg = quarter_circle(r);
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let k = seg.curvature(t).unwrap();
            // Counter-clockwise, so positive. The cubic's curvature stays within a
            // few percent of the circle's (lowest at the endpoints).
            assert!((k * r - 1.0).abs() < 0.03, "t={t}: k={k}");
        }
    }

    #[test]
    fn straight_segment_has_zero_curvature() {
        let seg = BezierSegment::new([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ]);
        for t in [0.0, 0.3, 1.0] {
            assert!(seg.curvature(t).unwrap().abs() < 1e-12);
        }
    }

    #[test]
    fn collapsed_segment_has_no_curvature() {
        let p = Point2::new(2.0, 3.0);
        let seg = BezierSegment::new([p, p, p, p]);
        assert_eq!(seg.curvature(0.5), None);
    }

    #[test]
    fn clockwise_turn_is_negative() {
        let seg = BezierSegment::new([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
            Point2::new(3.0, 0.0),
        ]);
        assert!(seg.curvature(0.5).unwrap() < 0.0);
    }

    #[test]
    fn scale_converts_pixels_to_microns() {
        let seg = quarter_circle(10.0);
        let px = sample_curvature(&[seg], 3, 1.0);
        let um = sample_curvature(&[seg], 3, 0.5);
        for (a, b) in px.iter().zip(&um) {
            assert!((b.position.x - 0.5 * a.position.x).abs() < 1e-12);
            assert!((b.curvature.unwrap() - 2.0 * a.curvature.unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn summary_of_full_circle() {
        let r = 4.0;
        // Four quarter arcs rotated around the origin.
        let base = quarter_circle(r);
        let segments: Vec<BezierSegment> = (0..4)
            .map(|q| {
                let rot = nalgebra::Rotation2::new(q as f64 * std::f64::consts::FRAC_PI_2);
                BezierSegment::new(base.points.map(|p| rot * p))
            })
            .collect();

        let summary = summarize_curve("CURVE 1", CurveKind::Bezier, segments, 50, 1.0);
        assert_eq!(summary.points.len(), 200);
        let circumference = 2.0 * std::f64::consts::PI * r;
        assert!((summary.length - circumference).abs() / circumference < 1e-3);
        assert!((summary.mean_curvature * r - 1.0).abs() < 0.03);
        assert!(summary.curvature_std < 0.01);
    }
}
