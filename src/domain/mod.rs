//! Domain types used throughout the toolkit.
//!
//! This module defines:
//!
//! - `.kapp` curve records (`CurveRecord`, `CurveKind`, `BSplineType`)
//! - Bezier segments and sampled curvature points
//! - residual-analysis inputs and outputs
//! - per-command configuration structs

pub mod types;

pub use types::*;
