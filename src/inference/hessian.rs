//! inference::hessian — standard errors from a numerical Hessian.
//!
//! Purpose
//! -------
//! Turn the curvature of a least-squares objective at its optimum into
//! parameter standard errors. For `½·SSE` with Hessian `H` at `θ̂`, the
//! Gauss–Newton covariance is `s²·H⁻¹` with `s² = SSE / (n − p)`.
//!
//! Key behaviors
//! -------------
//! - [`calc_standard_errors`] differentiates a gradient map with
//!   [`compute_hessian`], copies the result into `nalgebra`, and returns
//!   `sqrt(scale · diag(H⁺))`.
//! - `H⁺` is an eigen pseudoinverse: eigenvalues at or below [`EIGEN_EPS`]
//!   are dropped, so a flat direction contributes nothing rather than
//!   dividing by zero.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient map is C¹ near `θ̂`; the Hessian it yields is symmetric
//!   (enforced upstream) and treated as such by `symmetric_eigen`.
//! - `scale` is the residual variance estimate; the caller computes it.
use crate::optimization::{
    errors::OptResult, loglik_optimizer::finite_diff::compute_hessian,
    numerical_stability::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Standard errors `sqrt(scale · diag(H⁺))` where `H` is the Jacobian of `f` at `theta_hat`.
///
/// # Errors
/// Propagates `HessianDimMismatch` / `InvalidHessian` from [`compute_hessian`].
///
/// # Example
/// ```
/// use ndarray::{array, Array1};
/// use rust_decline::inference::calc_standard_errors;
///
/// // g(θ) = Aθ with A = diag(4, 1): H⁺ = diag(0.25, 1).
/// let a = array![[4.0, 0.0], [0.0, 1.0]];
/// let grad = |theta: &Array1<f64>| a.dot(theta);
/// let se = calc_standard_errors(&grad, &array![1.0, -1.0], 1.0)?;
/// assert!((se[0] - 0.5).abs() < 1e-6 && (se[1] - 1.0).abs() < 1e-6);
/// # Ok::<(), rust_decline::optimization::errors::OptError>(())
/// ```
pub fn calc_standard_errors<F: Fn(&Array1<f64>) -> Array1<f64>>(
    f: &F, theta_hat: &Array1<f64>, scale: f64,
) -> OptResult<Array1<f64>> {
    let hess = compute_hessian(f, theta_hat)?;
    let mut hess_nalg = DMatrix::<f64>::zeros(hess.nrows(), hess.ncols());
    fill_dmatrix(&hess, &mut hess_nalg);
    Ok(solve_for_se(hess_nalg, scale))
}

// ---- Helper methods ----

fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    for ((i, j), &v) in src.indexed_iter() {
        dst[(i, j)] = v;
    }
}

/// `sqrt(scale · Σ_k v_{ik}² / λ_k)` over eigenpairs with `λ_k > EIGEN_EPS`.
fn solve_for_se(hess: DMatrix<f64>, scale: f64) -> Array1<f64> {
    let n = hess.nrows();
    let eig = hess.symmetric_eigen();
    let mut var = Array1::<f64>::zeros(n);
    for (k, &lambda) in eig.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        let v = eig.eigenvectors.column(k);
        for i in 0..n {
            var[i] += v[i] * v[i] / lambda;
        }
    }
    var.mapv_into(|v| (scale * v).sqrt())
}
