//! Overflow-safe scalar transforms for keeping parameters positive.
//!
//! The refiner optimizes over unconstrained `θ` and maps each entry onto a
//! strictly positive rate or decline with an *anchored* softplus:
//!
//! ```text
//! value(θ) = anchor · softplus(θ) / ln 2
//! ```
//!
//! so `θ = 0` reproduces `anchor` exactly and every parameter starts on
//! the same scale regardless of its units.

use std::f64::consts::LN_2;

/// Floor for eigenvalues treated as nonzero in pseudoinverses.
pub const EIGEN_EPS: f64 = 1e-12;

/// Inputs above this are returned unchanged by [`safe_softplus`].
const SOFTPLUS_CUTOFF: f64 = 20.0;

/// `ln(1 + eˣ)` without overflow for large `x`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp().ln_1p() }
}

/// `1 / (1 + e⁻ˣ)`, evaluated on the side that cannot overflow.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Positive value for unconstrained `theta`; equals `anchor` at `theta = 0`.
pub fn anchored_softplus(theta: f64, anchor: f64) -> f64 {
    anchor * safe_softplus(theta) / LN_2
}

/// `d value / d theta` for [`anchored_softplus`].
pub fn anchored_softplus_deriv(theta: f64, anchor: f64) -> f64 {
    anchor * safe_logistic(theta) / LN_2
}
