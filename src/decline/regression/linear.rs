//! decline::regression::linear — OLS on linearized rates.
//!
//! Purpose
//! -------
//! Produce the closed-form first estimate of `(q_i, D_i)`: transform rates
//! with the regime's linearizing map, regress on elapsed days, and invert
//! the line. The regression statistics follow the usual simple-regression
//! conventions (two-sided Student-t p-value with `n − 2` degrees of
//! freedom, slope and intercept standard errors) so percentile banding can
//! reuse them.
//!
//! Key behaviors
//! -------------
//! - [`linregress`]: slope, intercept, `r`, p-value, and standard errors.
//! - [`fit_linear`]: linearize → regress → invert for one regime.
//! - [`r_squared`]: coefficient of determination of a forward-model
//!   prediction against the *original* rates.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are already filtered to finite, positive rates and `t ≥ 0`.
//! - With exactly two samples the line is exact: standard errors are zero
//!   and the p-value is zero (or one when both responses are equal).
//!
//! Testing notes
//! -------------
//! - Unit tests check statistics against hand-computed values, the exact
//!   two-point case, degenerate time axes, and exact recovery from
//!   noiseless data.
use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, StudentsT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::decline::{
    core::Regime,
    errors::{DeclineError, DeclineResult},
};

/// Guards the t-statistic when `|r| = 1`.
const TINY: f64 = 1e-20;

/// Simple linear regression summary.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_err: f64,
    pub intercept_std_err: f64,
    pub n: usize,
}

impl RegressionResult {
    /// Residual degrees of freedom, `n − 2` (zero for two points).
    pub fn dof(&self) -> usize {
        self.n.saturating_sub(2)
    }
}

/// Linear-stage estimate: the regression and the parameters it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearEstimate {
    pub regression: RegressionResult,
    pub initial_rate: f64,
    pub initial_decline: f64,
}

/// Ordinary least squares of `y` on `x`.
///
/// # Errors
/// - `LengthMismatch` when `x` and `y` differ in length.
/// - `InsufficientData` for fewer than two points.
/// - `DegenerateRegression` when every `x` is equal.
pub fn linregress(x: &Array1<f64>, y: &Array1<f64>) -> DeclineResult<RegressionResult> {
    if x.len() != y.len() {
        return Err(DeclineError::LengthMismatch { timestamps: x.len(), rates: y.len() });
    }
    let n = x.len();
    if n < 2 {
        return Err(DeclineError::InsufficientData { found: n, required: 2 });
    }
    let nf = n as f64;
    let x_mean = x.sum() / nf;
    let y_mean = y.sum() / nf;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let (dx, dy) = (xi - x_mean, yi - y_mean);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    sxx /= nf;
    syy /= nf;
    sxy /= nf;
    if sxx == 0.0 {
        return Err(DeclineError::DegenerateRegression { n });
    }

    let r_value = if syy == 0.0 { 0.0 } else { (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0) };
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let (p_value, std_err, intercept_std_err) = if n == 2 {
        (if syy == 0.0 { 1.0 } else { 0.0 }, 0.0, 0.0)
    } else {
        let df = (n - 2) as f64;
        let t = r_value * (df / ((1.0 - r_value) * (1.0 + r_value) + TINY)).sqrt();
        let p = StudentsT::new(0.0, 1.0, df).map(|dist| 2.0 * dist.sf(t.abs())).unwrap_or(f64::NAN);
        let se = ((1.0 - r_value * r_value) * syy / sxx / df).sqrt();
        (p, se, se * (sxx + x_mean * x_mean).sqrt())
    };

    Ok(RegressionResult { slope, intercept, r_value, p_value, std_err, intercept_std_err, n })
}

/// Linearize `rates`, regress on `days`, and invert the line for `regime`.
///
/// # Errors
/// - `InvalidExponent` when `regime` carries an out-of-range exponent.
/// - Everything [`linregress`] reports.
/// - `InvalidParameter` when the fitted line implies a non-declining model.
pub fn fit_linear(
    regime: Regime, days: &Array1<f64>, rates: &Array1<f64>,
) -> DeclineResult<LinearEstimate> {
    let regime = regime.normalized()?;
    let transformed = rates.mapv(|q| regime.linearize(q));
    let regression = linregress(days, &transformed)?;
    let (initial_rate, initial_decline) = regime.invert(regression.slope, regression.intercept)?;
    Ok(LinearEstimate { regression, initial_rate, initial_decline })
}

/// `1 − SS_res / SS_tot` of `predicted` against `observed`.
///
/// When `observed` is constant, returns 1 for an exact prediction and 0
/// otherwise.
pub fn r_squared(observed: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let n = observed.len() as f64;
    let mean = observed.sum() / n;
    let ss_res: f64 = observed.iter().zip(predicted.iter()).map(|(o, p)| (o - p).powi(2)).sum();
    let ss_tot: f64 = observed.iter().map(|o| (o - mean).powi(2)).sum();
    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res <= f64::EPSILON * mean.abs().max(1.0) {
        1.0
    } else {
        0.0
    }
}
