//! optimization — L-BFGS fitting layer, guarded transforms, and its error surface.
//!
//! Purpose
//! -------
//! Supply the numerical machinery behind nonlinear decline refinement
//! without tying it to decline models: an `argmin`-backed maximizer
//! ([`loglik_optimizer`]), overflow-safe positivity transforms
//! ([`numerical_stability`]), and one error type ([`errors::OptError`]).
//!
//! Conventions
//! -----------
//! - Objectives are maximized; internally `argmin` minimizes their negation.
//! - Failures are `OptResult<T>`; raw `argmin` errors never cross this
//!   module's boundary.
//! - Model-specific meaning (what `θ` represents, how failure is reported
//!   to users) belongs to the caller, e.g. `decline::regression::refine`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;
