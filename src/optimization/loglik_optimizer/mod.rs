//! loglik_optimizer — L-BFGS maximization of smooth objectives via `argmin`.
//!
//! Purpose
//! -------
//! Give model code one call, [`maximize`], for fitting parameters by
//! maximizing an objective `ℓ(θ)`. The decline refiner uses it with
//! `ℓ = -½·SSE` over softplus-reparameterized rate and decline.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes `c(θ) = -ℓ(θ)` to `argmin`, with a
//!   finite-difference fallback when no analytic gradient is implemented.
//! - [`builders`] constructs L-BFGS with Hager–Zhang or More–Thuente line
//!   search; [`run::run_lbfgs`] executes it and returns an [`OptimOutcome`].
//! - [`finite_diff::compute_hessian`] supplies numerical Hessians for
//!   standard errors after the fit.
//!
//! Invariants & assumptions
//! ------------------------
//! - `θ` is unconstrained; any positivity mapping lives in the model layer.
//! - Objective values, gradients, and estimates are validated as finite at
//!   every boundary ([`validation`]).
//! - Running out of iterations is reported as `converged == false`, never
//!   as an error; callers decide what that means.
//!
//! Conventions
//! -----------
//! - Errors surface as [`OptError`](crate::optimization::errors::OptError).
//! - Progress is logged through the `log` facade at debug level when
//!   `MLEOptions::verbose` is set.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; [`api`] runs full solves on
//!   quadratics with both line searches and the finite-difference path.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};
