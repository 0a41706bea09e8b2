//! Small dense linear solves.
//!
//! - Overdetermined real systems (the ringdown fit, written as a real problem
//!   with twice as many rows and unknowns) go through SVD.
//! - The square NQC systems (3x3 amplitude, 2x2 phase) go through LU and fail
//!   on singular matrices.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser singular-value cutoffs.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a square system exactly. `None` when the matrix is singular or the
/// solution is not finite.
pub fn solve_square(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if !a.is_square() || a.nrows() != b.len() {
        return None;
    }
    let x = a.lu().solve(b)?;
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn square_solve_and_singular_detection() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[3.0, 5.0]);
        let x = solve_square(a, &b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);

        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(solve_square(singular, &b).is_none());
    }
}
