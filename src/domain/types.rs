//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during conversion and analysis
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::{DateTime, Local};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::math::Pivoting;

/// Only cubic splines are supported throughout the toolkit.
pub const DEGREE: usize = 3;

/// How a curve in a `.kapp` file is parameterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// Chain of cubic Bezier segments sharing endpoints.
    Bezier,
    /// Cubic B-spline given by its control polygon.
    BSpline,
}

impl CurveKind {
    pub fn code(self) -> i64 {
        match self {
            CurveKind::Bezier => 0,
            CurveKind::BSpline => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CurveKind::Bezier),
            1 => Some(CurveKind::BSpline),
            _ => None,
        }
    }
}

/// Open (clamped) vs closed (periodic) B-spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BSplineType {
    #[default]
    Open,
    Closed,
}

impl BSplineType {
    pub fn code(self) -> i64 {
        match self {
            BSplineType::Open => 0,
            BSplineType::Closed => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(BSplineType::Open),
            1 => Some(BSplineType::Closed),
            _ => None,
        }
    }
}

/// One curve as stored in a `.kapp` file (first keyframe only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    pub kind: CurveKind,
    pub keyframes: usize,
    /// Only meaningful for `CurveKind::BSpline`.
    pub bspline_type: BSplineType,
    pub keyframe: i64,
    pub control_points: Vec<Point2<f64>>,
}

impl CurveRecord {
    /// Display name used in exports. Matches the plugin's `CURVE n` naming (1-based).
    pub fn display_name(index: usize) -> String {
        format!("CURVE {}", index + 1)
    }
}

/// A cubic Bezier segment. Serializes as its four `[x, y]` points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BezierSegment {
    pub points: [Point2<f64>; 4],
}

impl BezierSegment {
    pub fn new(points: [Point2<f64>; 4]) -> Self {
        Self { points }
    }

    pub fn start(&self) -> Point2<f64> {
        self.points[0]
    }

    pub fn end(&self) -> Point2<f64> {
        self.points[3]
    }
}

/// A sampled point with its signed curvature (`None` where the speed is zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub position: Point2<f64>,
    pub curvature: Option<f64>,
}

/// Per-curve measurements produced by `convert`.
#[derive(Debug, Clone)]
pub struct CurveSummary {
    pub name: String,
    pub kind: CurveKind,
    pub segments: Vec<BezierSegment>,
    pub points: Vec<CurvePoint>,
    /// Approximate arc length (polyline through the samples), scaled.
    pub length: f64,
    pub mean_curvature: f64,
    pub curvature_std: f64,
}

/// A single exported curvature measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub curve_name: String,
    pub x: f64,
    pub curvature: f64,
}

/// A point of a theoretical curvature profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TheoreticalPoint {
    pub x: f64,
    pub curvature: f64,
}

/// Interpolated measurement and residual at one theoretical sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledResidual {
    pub x: f64,
    pub theoretical: f64,
    /// Measured curvature interpolated at `x` (`NaN` outside the measured range).
    pub k: f64,
    /// `theoretical - k`.
    pub residual: f64,
    pub residual_abs: f64,
}

/// Residuals of one measured curve against the theoretical profile.
#[derive(Debug, Clone)]
pub struct CurveResiduals {
    pub curve_name: String,
    pub samples: Vec<SampledResidual>,
}

/// Summary error metrics for one curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveErrors {
    pub curve_name: String,
    /// Mean absolute residual.
    pub absolute_error: f64,
    /// Mean `|residual / theoretical|` in percent, over samples above the threshold.
    pub relative_error: f64,
    pub pearson: f64,
    /// Number of samples with a finite residual.
    pub n: usize,
}

/// Configuration for `kappa solve`.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    pub matrix_path: PathBuf,
    pub rhs_path: PathBuf,
    pub pivoting: Pivoting,
}

/// Configuration for `kappa convert`.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    /// Samples per Bezier segment.
    pub samples: usize,
    /// Microns per pixel.
    pub scale: f64,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    /// Curves rescaled to microns, written back as `.kapp`.
    pub export_kapp: Option<PathBuf>,
}

/// Configuration for `kappa residuals`.
#[derive(Debug, Clone)]
pub struct ResidualConfig {
    pub curvatures_path: PathBuf,
    pub theoretical_path: PathBuf,
    /// Resampling step along x; `None` means use the theoretical x values.
    pub step: Option<f64>,
    /// Theoretical curvature threshold for the relative error.
    pub threshold: f64,
    pub export: Option<PathBuf>,
}

/// JSON export of converted curves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub samples: usize,
    pub scale: f64,
    pub curves: Vec<SegmentCurve>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCurve {
    pub name: String,
    pub kind: CurveKind,
    pub segments: Vec<BezierSegment>,
    pub length: f64,
    /// `null` when no segment has a defined curvature.
    pub mean_curvature: Option<f64>,
    pub curvature_std: f64,
}
