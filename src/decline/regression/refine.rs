//! decline::regression::refine — nonlinear least squares on the rate scale.
//!
//! Purpose
//! -------
//! The linearized fit minimizes error in the transformed space (`ln q`,
//! `q^(−b)`, `1/q`), which over-weights the low-rate tail. This stage
//! re-estimates `(q_i, D_i)` by minimizing the sum of squared residuals on
//! the original rates, seeded at the linear estimate.
//!
//! Key behaviors
//! -------------
//! - Parameters are optimized in an unconstrained space through the
//!   anchored softplus, so `θ = 0` is exactly the linear estimate and both
//!   coordinates start on a unit scale.
//! - Residuals are divided by the seed rate before squaring; the optimum is
//!   unchanged and the gradient stays well scaled for any rate units.
//! - The objective supplies an analytic gradient; the L-BFGS machinery in
//!   `optimization::loglik_optimizer` does the rest.
//! - Standard errors come from the finite-difference Hessian of `½ SSE` in
//!   `(D_i, q_i)` space, scaled by the residual variance `SSE / (n − 2)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least three calibration samples (one residual degree of freedom).
//! - A run that ends without convergence is an error
//!   ([`DeclineError::Convergence`]); callers decide whether to fall back.
//!
//! Testing notes
//! -------------
//! - Tests check that the refined SSE never exceeds the seed's, that the
//!   analytic gradient matches finite differences, and that an iteration
//!   cap surfaces as `Convergence`.
use ndarray::{Array1, array};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    decline::{
        core::{Regime, RefineOptions},
        errors::{DeclineError, DeclineResult},
        regression::linear::LinearEstimate,
    },
    inference::calc_standard_errors,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta, maximize},
        numerical_stability::{anchored_softplus, anchored_softplus_deriv},
    },
};

/// Minimum sample count for refinement.
pub const MIN_REFINE_SAMPLES: usize = 3;

/// Outcome of a converged refinement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefinedEstimate {
    pub initial_rate: f64,
    pub initial_decline: f64,
    pub rate_std_err: f64,
    pub decline_std_err: f64,
    /// Sum of squared rate residuals at the optimum.
    pub sse: f64,
    pub status: String,
    pub iterations: usize,
}

/// Elapsed days and observed rates the objective is evaluated on.
#[derive(Debug, Clone)]
struct CurveData {
    days: Array1<f64>,
    rates: Array1<f64>,
}

/// `ℓ(θ) = −½ Σ ((yᵢ − q f(D, tᵢ)) / q₀)²` with `θ = (θ_D, θ_q)`.
#[derive(Debug, Clone, Copy)]
struct RateLeastSquares {
    regime: Regime,
    rate_anchor: f64,
    decline_anchor: f64,
}

impl RateLeastSquares {
    fn params(&self, theta: &Theta) -> (f64, f64) {
        (
            anchored_softplus(theta[1], self.rate_anchor),
            anchored_softplus(theta[0], self.decline_anchor),
        )
    }
}

impl LogLikelihood for RateLeastSquares {
    type Data = CurveData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let (q, d) = self.params(theta);
        let scaled_sse = sse(self.regime, q, d, data) / (self.rate_anchor * self.rate_anchor);
        Ok(-0.5 * scaled_sse)
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        if theta.len() != 2 {
            return Err(OptError::InvalidObjectiveData {
                reason: "Refinement optimizes exactly two parameters.",
            });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        if data.days.len() != data.rates.len() || data.days.is_empty() {
            return Err(OptError::InvalidObjectiveData {
                reason: "Days and rates must be non-empty and of equal length.",
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let (q, d) = self.params(theta);
        let scale = self.rate_anchor * self.rate_anchor;
        let (mut g_d, mut g_q) = (0.0, 0.0);
        for (&t, &y) in data.days.iter().zip(data.rates.iter()) {
            let f = self.regime.rate_factor(d, t);
            let resid = y - q * f;
            g_d += resid * q * self.regime.rate_factor_partial(d, t);
            g_q += resid * f;
        }
        Ok(array![
            g_d / scale * anchored_softplus_deriv(theta[0], self.decline_anchor),
            g_q / scale * anchored_softplus_deriv(theta[1], self.rate_anchor),
        ])
    }
}

/// Re-estimate `(q_i, D_i)` by least squares on the rate scale.
///
/// # Errors
/// - `InvalidExponent` when `regime` carries an out-of-range exponent.
/// - `InsufficientData` with fewer than [`MIN_REFINE_SAMPLES`] samples.
/// - `Optimization` when the solver or the Hessian evaluation fails.
/// - `Convergence` when the solver stops without converging.
pub fn refine(
    regime: Regime, days: &Array1<f64>, rates: &Array1<f64>, seed: &LinearEstimate,
    options: &RefineOptions,
) -> DeclineResult<RefinedEstimate> {
    let regime = regime.normalized()?;
    let n = days.len();
    if n < MIN_REFINE_SAMPLES {
        return Err(DeclineError::InsufficientData { found: n, required: MIN_REFINE_SAMPLES });
    }
    let objective = RateLeastSquares {
        regime,
        rate_anchor: seed.initial_rate,
        decline_anchor: seed.initial_decline,
    };
    let data = CurveData { days: days.clone(), rates: rates.clone() };

    let outcome = maximize(&objective, Array1::zeros(2), &data, &options.mle_opts)?;
    if !outcome.converged {
        return Err(DeclineError::Convergence {
            status: outcome.status,
            iterations: outcome.iterations,
        });
    }
    let (q, d) = objective.params(&outcome.theta_hat);
    let sse = sse(regime, q, d, &data);

    let half_sse_grad = |p: &Array1<f64>| {
        let (d, q) = (p[0], p[1]);
        let (mut g_d, mut g_q) = (0.0, 0.0);
        for (&t, &y) in data.days.iter().zip(data.rates.iter()) {
            let f = regime.rate_factor(d, t);
            let resid = y - q * f;
            g_d -= resid * q * regime.rate_factor_partial(d, t);
            g_q -= resid * f;
        }
        array![g_d, g_q]
    };
    let residual_variance = sse / (n - 2) as f64;
    let se = calc_standard_errors(&half_sse_grad, &array![d, q], residual_variance)?;

    log::debug!(
        "refined {} fit: q_i={q:.6}, D_i={d:.6e} after {} iterations ({})",
        regime.name(),
        outcome.iterations,
        outcome.status
    );
    Ok(RefinedEstimate {
        initial_rate: q,
        initial_decline: d,
        rate_std_err: se[1],
        decline_std_err: se[0],
        sse,
        status: outcome.status,
        iterations: outcome.iterations,
    })
}

fn sse(regime: Regime, q: f64, d: f64, data: &CurveData) -> f64 {
    data.days
        .iter()
        .zip(data.rates.iter())
        .map(|(&t, &y)| (y - q * regime.rate_factor(d, t)).powi(2))
        .sum()
}
