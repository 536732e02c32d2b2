//! Spline reconstruction: B-spline to Bezier conversion, dense evaluation and
//! curvature sampling.

pub mod bezier;
pub mod bspline;
pub mod curvature;

pub use bezier::*;
pub use bspline::*;
pub use curvature::*;
