//! Standalone 2D helpers for building synthetic control polygons and sampling
//! lines. The conversion and analysis pipelines do not depend on them.

use nalgebra::{Point2, Vector2};

use crate::error::GeometryError;

/// The point at `distance` from `point` in the direction of `vec`.
pub fn point_from_vector(
    vec: Vector2<f64>,
    point: Point2<f64>,
    distance: f64,
) -> Result<Point2<f64>, GeometryError> {
    let norm = vec.norm();
    if norm == 0.0 {
        return Err(GeometryError::ZeroLengthVector);
    }
    Ok(point + vec / norm * distance)
}

/// Points spaced `spacing` apart along the segment `start -> end`.
///
/// The output starts with `start`, then one point per distance in
/// `0, spacing, 2·spacing, …` below the rounded segment length, then `end`.
/// The first two points coincide.
pub fn discretize_line(
    start: Point2<f64>,
    end: Point2<f64>,
    spacing: f64,
) -> Result<Vec<Point2<f64>>, GeometryError> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(GeometryError::InvalidSpacing(spacing));
    }

    let vec = end - start;
    let limit = vec.norm().round();

    let mut points = vec![start];
    let mut i = 0usize;
    loop {
        let d = i as f64 * spacing;
        if d >= limit {
            break;
        }
        points.push(point_from_vector(vec, start, d)?);
        i += 1;
    }
    points.push(end);
    Ok(points)
}

/// The two points at `distance` from `point` along the normals of `vec`.
///
/// The first uses the counter-clockwise normal `(-y, x)`, the second `(y, -x)`.
pub fn normal_points(
    vec: Vector2<f64>,
    point: Point2<f64>,
    distance: f64,
) -> Result<(Point2<f64>, Point2<f64>), GeometryError> {
    let norm = vec.norm();
    if norm == 0.0 {
        return Err(GeometryError::ZeroLengthVector);
    }
    let t = distance / norm;
    let n1 = Vector2::new(-vec.y, vec.x);
    Ok((point + n1 * t, point - n1 * t))
}
