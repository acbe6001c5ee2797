//! Dense Gaussian elimination for small square systems.
//!
//! Near-singular pivots are not an error: the affected column is skipped
//! during elimination and its unknown is set to zero during
//! back-substitution, so the result is always finite.

use nalgebra::{DMatrix, DVector};
use tracing::trace;

/// Pivot magnitude below which a column is treated as singular.
pub const SINGULAR_PIVOT_THRESHOLD: f64 = 1e-12;

/// Solve `a * x = b` by partial-pivot Gaussian elimination.
///
/// `a` must be square and match `b` in length.
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let n = b.len();
    assert_eq!(a.nrows(), n, "coefficient rows must match rhs length");
    assert_eq!(a.ncols(), n, "coefficient matrix must be square");

    let mut m = a.clone();
    let mut rhs = b.clone();
    let mut singular = vec![false; n];

    for col in 0..n {
        // Largest-magnitude entry at or below the diagonal
        let mut pivot_row = col;
        let mut pivot_abs = m[(col, col)].abs();
        for row in (col + 1)..n {
            let candidate = m[(row, col)].abs();
            if candidate > pivot_abs {
                pivot_abs = candidate;
                pivot_row = row;
            }
        }

        if pivot_abs < SINGULAR_PIVOT_THRESHOLD {
            trace!(column = col, pivot = pivot_abs, "singular pivot, column skipped");
            singular[col] = true;
            continue;
        }

        if pivot_row != col {
            m.swap_rows(col, pivot_row);
            rhs.swap_rows(col, pivot_row);
        }

        let pivot = m[(col, col)];
        for row in (col + 1)..n {
            let factor = m[(row, col)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[(row, k)] -= factor * m[(col, k)];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = DVector::zeros(n);
    for row in (0..n).rev() {
        if singular[row] {
            continue;
        }
        let mut sum = rhs[row];
        for k in (row + 1)..n {
            sum -= m[(row, k)] * x[k];
        }
        x[row] = sum / m[(row, row)];
    }
    x
}
