//! Gaussian elimination with (optional) partial pivoting.
//!
//! This is the dense solver used by the toolkit. It works in place:
//! `solve_in_place` reduces `a` to upper-triangular form and overwrites `b`
//! with the transformed right-hand side. Callers that still need the original
//! system afterwards should use `solve`, which copies both inputs first.
//!
//! Numerical notes:
//! - Only an exactly-zero pivot is rejected. Tiny pivots are accepted as-is, so
//!   near-singular systems produce large (but finite) solutions.
//! - With partial pivoting the row with the largest `|a[row, k]|` in rows `k..n`
//!   is chosen; on ties the first such row wins.

use nalgebra::{DMatrix, DVector};

use crate::error::SolveError;

/// Row-exchange strategy for the elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pivoting {
    /// Swap in the largest-magnitude entry of each column.
    #[default]
    Partial,
    /// Use the diagonal as-is; a zero pivot is an error.
    None,
}

/// Solve `a * x = b` without touching the caller's matrix or vector.
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>, pivoting: Pivoting) -> Result<DVector<f64>, SolveError> {
    let mut a = a.clone();
    let mut b = b.clone();
    solve_in_place(&mut a, &mut b, pivoting)
}

/// Solve `a * x = b`, reducing `a` and `b` in place.
///
/// On success `a` holds the upper-triangular factor (rows permuted when
/// pivoting) and `b` the matching right-hand side. On failure both are left in
/// whatever partially-eliminated state the failing step found them.
pub fn solve_in_place(
    a: &mut DMatrix<f64>,
    b: &mut DVector<f64>,
    pivoting: Pivoting,
) -> Result<DVector<f64>, SolveError> {
    let n = validate(a, b)?;
    log::debug!("gepp: solving {n}x{n} system ({pivoting:?} pivoting)");

    eliminate(a, b, pivoting)?;
    Ok(back_substitute(a, b))
}

fn validate(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<usize, SolveError> {
    let (rows, cols) = a.shape();
    if rows != cols {
        return Err(SolveError::NotSquare { rows, cols });
    }
    if b.len() != rows {
        return Err(SolveError::SizeMismatch { n: rows, len: b.len() });
    }
    Ok(rows)
}

fn eliminate(a: &mut DMatrix<f64>, b: &mut DVector<f64>, pivoting: Pivoting) -> Result<(), SolveError> {
    let n = a.nrows();

    // `k` is both the pivot row and the diagonal column index.
    for k in 0..n.saturating_sub(1) {
        match pivoting {
            Pivoting::Partial => {
                let max_row = pivot_row(a, k);
                if a[(max_row, k)] == 0.0 {
                    return Err(SolveError::Singular { column: k });
                }
                if max_row != k {
                    log::trace!("gepp: swapping rows {k} and {max_row}");
                    a.swap_rows(k, max_row);
                    b.swap_rows(k, max_row);
                }
            }
            Pivoting::None => {
                if a[(k, k)] == 0.0 {
                    return Err(SolveError::ZeroPivot { column: k });
                }
            }
        }

        let pivot = a[(k, k)];
        for row in (k + 1)..n {
            let multiplier = a[(row, k)] / pivot;
            for col in k..n {
                a[(row, col)] -= multiplier * a[(k, col)];
            }
            b[row] -= multiplier * b[k];
        }
    }

    // The loop above never inspects the last diagonal entry.
    if n > 0 && a[(n - 1, n - 1)] == 0.0 {
        return Err(match pivoting {
            Pivoting::Partial => SolveError::Singular { column: n - 1 },
            Pivoting::None => SolveError::ZeroPivot { column: n - 1 },
        });
    }

    Ok(())
}

/// Index of the first row in `k..n` with the largest `|a[row, k]|`.
fn pivot_row(a: &DMatrix<f64>, k: usize) -> usize {
    let mut best = k;
    let mut best_abs = a[(k, k)].abs();
    for row in (k + 1)..a.nrows() {
        let v = a[(row, k)].abs();
        if v > best_abs {
            best = row;
            best_abs = v;
        }
    }
    best
}

fn back_substitute(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let n = a.nrows();
    let mut x = DVector::zeros(n);
    for k in (0..n).rev() {
        let mut dot = 0.0;
        for j in (k + 1)..n {
            dot += a[(k, j)] * x[j];
        }
        x[k] = (b[k] - dot) / a[(k, k)];
    }
    x
}
