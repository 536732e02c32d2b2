//! Numerical routines: the dense Gaussian-elimination solver.

pub mod gepp;

pub use gepp::*;
