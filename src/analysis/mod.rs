//! Curvature post-processing: interpolation onto a theoretical profile,
//! residuals and per-curve error metrics.

pub mod interp;
pub mod residuals;

pub use interp::*;
pub use residuals::*;
