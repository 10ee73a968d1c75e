//! decline::uncertainty — percentile (P-value) decline curves.
//!
//! Purpose
//! -------
//! Shift the fitted line by a multiple of its standard errors and invert
//! the shifted line, yielding the `(q_i, D_i)` of an optimistic or
//! pessimistic curve. Reserves reporting names these P10 / P50 / P90: the
//! curve exceeded with 10 / 50 / 90 % probability.
//!
//! Key behaviors
//! -------------
//! - The shift multiplier is the Student-t quantile at `pct / 100` with
//!   `n − 2` degrees of freedom; the standard normal is used when there
//!   are no residual degrees of freedom. `pct = 50` gives exactly the fit.
//! - Slope and intercept move together so that a lower percentile is
//!   always the more optimistic curve (higher rate at every `t ≥ 0`).
//! - A refined fit is banded in parameter space instead: `q_i` moves down
//!   and `D_i` up by `z` standard errors for `pct > 50`, which keeps the
//!   same ordering.
//!
//! Invariants & assumptions
//! ------------------------
//! - `pct` lies strictly inside `(0, 100)`.
//! - The linearized response rises with rate for the exponential regime
//!   and falls with rate for the others; the shift direction accounts for
//!   this so the ordering holds in every regime.
//! - A shift large enough to make the implied decline non-positive is
//!   reported as `InvalidParameter`, not clamped.
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::decline::{
    core::{DeclineModel, Regime},
    errors::{DeclineError, DeclineResult},
    regression::{RefinedEstimate, RegressionResult},
};

/// Standard-error multiplier for percentile `pct` with `dof` residual degrees of freedom.
///
/// Positive for `pct > 50`.
///
/// # Errors
/// - `InvalidPercentile` unless `0 < pct < 100`.
pub fn quantile_multiplier(pct: f64, dof: usize) -> DeclineResult<f64> {
    if !(pct > 0.0 && pct < 100.0) {
        return Err(DeclineError::InvalidPercentile { value: pct });
    }
    if pct == 50.0 {
        return Ok(0.0);
    }
    let p = pct / 100.0;
    let z = if dof == 0 {
        Normal::new(0.0, 1.0).map(|n| n.inverse_cdf(p)).unwrap_or(f64::NAN)
    } else {
        StudentsT::new(0.0, 1.0, dof as f64).map(|t| t.inverse_cdf(p)).unwrap_or(f64::NAN)
    };
    Ok(z)
}

/// `(q_i, D_i)` of the `pct`-th percentile curve implied by `regression`.
///
/// # Errors
/// - `InvalidExponent` when `regime` carries an out-of-range exponent.
/// - `InvalidPercentile` unless `0 < pct < 100`.
/// - `InvalidParameter` when the shifted line no longer describes a decline.
pub fn percentile(
    regime: Regime, regression: &RegressionResult, pct: f64,
) -> DeclineResult<(f64, f64)> {
    let regime = regime.normalized()?;
    let z = quantile_multiplier(pct, regression.dof())?;
    let s = regime.linear_direction();
    let intercept = regression.intercept - s * z * regression.intercept_std_err;
    let slope = regression.slope - s * z * regression.std_err;
    regime.invert(slope, intercept)
}

/// `model` with its parameters replaced by the `pct`-th percentile of `regression`.
///
/// # Errors
/// Same as [`percentile`].
pub fn percentile_model(
    model: &DeclineModel, regression: &RegressionResult, pct: f64,
) -> DeclineResult<DeclineModel> {
    let (q, d) = percentile(model.regime(), regression, pct)?;
    model.with_parameters(q, d)
}

/// `model` banded by the standard errors of a converged refinement with
/// `dof` residual degrees of freedom. `pct = 50` returns `model` unchanged.
///
/// # Errors
/// - `InvalidPercentile` unless `0 < pct < 100`.
/// - `InvalidParameter` when the shifted rate or decline is no longer positive.
pub fn percentile_refined(
    model: &DeclineModel, refined: &RefinedEstimate, dof: usize, pct: f64,
) -> DeclineResult<DeclineModel> {
    let z = quantile_multiplier(pct, dof)?;
    if z == 0.0 {
        return Ok(model.clone());
    }
    let q = model.initial_rate() - z * refined.rate_std_err;
    let d = model.initial_decline() + z * refined.decline_std_err;
    model.with_parameters(q, d)
}
