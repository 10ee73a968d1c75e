//! Decline options — configuration for fitting, refinement, and forecasting.
//!
//! Purpose
//! -------
//! Keep every knob of the decline pipeline in validated option structs so
//! entry points take explicit arguments instead of ad-hoc flags.
//!
//! Key behaviors
//! -------------
//! - [`FitOptions`]: calibration reference instant and optional nonlinear
//!   refinement.
//! - [`RefineOptions`]: L-BFGS settings for the refiner.
//! - [`ForecastOptions`]: whether to report cumulative volume and an
//!   optional economic-limit rate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizer settings are validated by their own builders
//!   ([`MLEOptions::new`], `Tolerances::new`); `RefineOptions` adds no
//!   cross-field checks.
//! - An economic limit, when present, is finite and strictly positive.
//!
//! Conventions
//! -----------
//! - Defaults reproduce the plain linearized fit: no refinement, the first
//!   calibration timestamp as reference, cumulative reported, no economic
//!   limit.
use chrono::NaiveDateTime;

use crate::{
    decline::{core::regime::ensure_positive, errors::DeclineResult},
    optimization::loglik_optimizer::MLEOptions,
};

/// FitOptions — how one series is calibrated.
///
/// Fields
/// ------
/// - `reference`: instant mapped to `t = 0`. Samples before it are dropped.
///   `None` uses the first timestamp inside the calibration windows.
/// - `refine`: run nonlinear least squares after the linear fit when `Some`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitOptions {
    pub reference: Option<NaiveDateTime>,
    pub refine: Option<RefineOptions>,
}

impl FitOptions {
    pub fn new(reference: Option<NaiveDateTime>, refine: Option<RefineOptions>) -> Self {
        Self { reference, refine }
    }
}

/// RefineOptions — optimizer settings for the nonlinear least-squares stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefineOptions {
    pub mle_opts: MLEOptions,
}

impl RefineOptions {
    pub fn new(mle_opts: MLEOptions) -> Self {
        Self { mle_opts }
    }
}

/// ForecastOptions — what `run` reports.
///
/// Fields
/// ------
/// - `with_cumulative`: also evaluate cumulative volume.
/// - `economic_limit`: once the rate first falls below this value, that
///   point and all later ones are reported as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastOptions {
    with_cumulative: bool,
    economic_limit: Option<f64>,
}

impl ForecastOptions {
    /// # Errors
    /// - `InvalidParameter` if `economic_limit` is present but not finite and positive.
    pub fn new(with_cumulative: bool, economic_limit: Option<f64>) -> DeclineResult<Self> {
        if let Some(limit) = economic_limit {
            ensure_positive("economic_limit", limit)?;
        }
        Ok(Self { with_cumulative, economic_limit })
    }

    pub fn with_cumulative(&self) -> bool {
        self.with_cumulative
    }

    pub fn economic_limit(&self) -> Option<f64> {
        self.economic_limit
    }
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self { with_cumulative: true, economic_limit: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decline::errors::DeclineError;

    #[test]
    // Purpose
    // -------
    // Check defaults and economic-limit validation.
    //
    // Given
    // -----
    // - Default options and limits `5.0`, `0.0`, `NaN`.
    //
    // Expect
    // ------
    // - Defaults: no refine, no reference, cumulative on, no limit; only `5.0` accepted.
    fn defaults_and_limit_validation() {
        // Arrange
        let fit = FitOptions::default();
        let fc = ForecastOptions::default();

        // Act / Assert
        assert!(fit.refine.is_none() && fit.reference.is_none());
        assert!(fc.with_cumulative() && fc.economic_limit().is_none());
        assert_eq!(
            ForecastOptions::new(false, Some(5.0)).map(|o| o.economic_limit()),
            Ok(Some(5.0))
        );
        for bad in [0.0, f64::NAN] {
            assert!(matches!(
                ForecastOptions::new(true, Some(bad)),
                Err(DeclineError::InvalidParameter { name: "economic_limit", .. })
            ));
        }
    }
}
