//! Error types.
//!
//! The numerical modules return small typed errors (`SolveError`, `SplineError`,
//! `GeometryError`). The binary works in terms of `AppError`, which carries the
//! process exit code:
//!
//! - `2`: bad input (missing file, unparsable value, wrong schema)
//! - `3`: input parsed but nothing usable remained
//! - `4`: numerical failure

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the dense linear solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Matrix must be square, got {rows}x{cols}.")]
    NotSquare { rows: usize, cols: usize },
    #[error("Incompatible sizes between A and b: A is {n}x{n}, b has length {len}.")]
    SizeMismatch { n: usize, len: usize },
    #[error("Matrix is singular (zero pivot in column {column}).")]
    Singular { column: usize },
    #[error("Pivot element in column {column} is zero. Try enabling partial pivoting.")]
    ZeroPivot { column: usize },
}

/// Failures of the B-spline to Bezier conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("Only cubic splines are supported (got degree {0}).")]
    UnsupportedDegree(usize),
    #[error("A cubic B-spline needs at least 4 control points (got {0}).")]
    TooFewControlPoints(usize),
    #[error("Knot vector too short: need at least {expected} knots, got {got}.")]
    KnotVectorLength { expected: usize, got: usize },
    #[error("Degenerate knot span u[{lower}]..u[{upper}] while building Bezier segment {segment}.")]
    DegenerateKnot {
        segment: usize,
        lower: usize,
        upper: usize,
    },
    #[error("A Bezier chain needs 3m+1 control points (got {0}).")]
    InvalidBezierChain(usize),
}

/// Failures of the 2D geometry helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Direction vector has zero length.")]
    ZeroLengthVector,
    #[error("Spacing must be finite and > 0 (got {0}).")]
    InvalidSpacing(f64),
}

impl From<SolveError> for AppError {
    fn from(err: SolveError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<SplineError> for AppError {
    fn from(err: SplineError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<GeometryError> for AppError {
    fn from(err: GeometryError) -> Self {
        AppError::new(4, err.to_string())
    }
}
