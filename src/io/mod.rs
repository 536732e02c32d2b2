//! Input/output helpers.
//!
//! - `.kapp` curve files (`kapp`)
//! - CSV ingest of curvature exports, theoretical profiles and matrices (`ingest`)
//! - curvature/residual CSV and segment JSON exports (`export`)

pub mod export;
pub mod ingest;
pub mod kapp;

pub use export::*;
pub use ingest::*;
pub use kapp::*;
