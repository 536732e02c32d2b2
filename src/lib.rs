//! `kappa-curves` library crate.
//!
//! The binary (`kappa`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the spline, curvature and solver modules are reusable on their own

pub mod analysis;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod report;
pub mod spline;
