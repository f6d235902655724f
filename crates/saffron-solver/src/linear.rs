//! Dense complex linear solve.

use nalgebra::DVector;
use num_complex::Complex;
use saffron_core::NodalSystem;

/// Solve G·v = i with a partial-pivoted LU factorization.
///
/// Returns `None` when the matrix is rank-deficient (floating node,
/// voltage-source loop); the caller attaches the offending frequency.
pub fn solve(sys: &NodalSystem) -> Option<DVector<Complex<f64>>> {
    sys.matrix().clone().lu().solve(sys.rhs())
}
