//! loglik_optimizer::finite_diff — numerical gradients and Hessians.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate with error capture and validation so the
//! adapter and the standard-error code can ask for derivatives without
//! touching its API directly.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient of a scalar objective,
//!   surfacing any error the objective recorded during differencing.
//! - [`compute_hessian`]: Jacobian of a gradient map, central differences
//!   first, forward differences when the central result fails validation;
//!   the accepted matrix is symmetrized before it is returned.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives cannot return `Result` from inside `finitediff`; they write
//!   the first failure into a shared `RefCell` and return `NaN`.
//! - Every matrix returned by [`compute_hessian`] is square, finite, and
//!   exactly symmetric.
//!
//! Testing notes
//! -------------
//! - Unit tests cover a clean quadratic, an objective that records an
//!   error, an all-NaN objective, and the symmetry of returned Hessians.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        types::{Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// `closure_err` is cleared on entry; if `func` stored an error while being
/// evaluated, that error is returned instead of the gradient.
///
/// # Errors
/// - The captured objective error, converted into [`OptError`](crate::optimization::errors::OptError).
/// - `GradientDimMismatch` / `InvalidGradient` from [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Symmetric finite-difference Hessian of the gradient map `f` at `theta`.
///
/// Only the forward-difference validation error is surfaced; a failing
/// central pass silently triggers the fallback.
///
/// # Errors
/// - `HessianDimMismatch` / `InvalidHessian` when the forward pass also fails.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// ---- Helper methods ----

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
