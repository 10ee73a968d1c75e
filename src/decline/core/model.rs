//! decline::core::model — immutable fitted Arps model.
//!
//! A [`DeclineModel`] couples a [`Regime`] with validated `(q_i, D_i)` and
//! the calendar instant that `t = 0` refers to. Evaluation is available on
//! elapsed days (`rate`, `cumulative`) or on calendar instants
//! (`rate_on`, `cumulative_on`); negative offsets back-cast before the
//! reference.
use chrono::NaiveDateTime;
use ndarray::Array1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    decline::{
        core::regime::{Regime, ensure_positive},
        errors::DeclineResult,
    },
    schedule::elapsed_days,
};

/// Days per year used for annualized declines.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Fitted or hand-built Arps decline model.
///
/// Fields
/// ------
/// - `regime`: normalized regime (exponent 0 and 1 never stored as hyperbolic).
/// - `initial_rate`: `q_i > 0`, rate at the reference instant.
/// - `initial_decline`: `D_i > 0`, nominal decline per day at the reference.
/// - `reference`: instant corresponding to `t = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeclineModel {
    regime: Regime,
    initial_rate: f64,
    initial_decline: f64,
    reference: NaiveDateTime,
}

impl DeclineModel {
    /// # Errors
    /// - `InvalidExponent` if the regime carries an exponent outside `[0, 1]`.
    /// - `InvalidParameter` if either rate or decline is not finite and positive.
    pub fn new(
        regime: Regime, initial_rate: f64, initial_decline: f64, reference: NaiveDateTime,
    ) -> DeclineResult<Self> {
        let regime = regime.normalized()?;
        ensure_positive("initial_rate", initial_rate)?;
        ensure_positive("initial_decline", initial_decline)?;
        Ok(Self { regime, initial_rate, initial_decline, reference })
    }

    /// Same regime and reference, new `(q_i, D_i)`.
    pub fn with_parameters(&self, initial_rate: f64, initial_decline: f64) -> DeclineResult<Self> {
        Self::new(self.regime, initial_rate, initial_decline, self.reference)
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn exponent(&self) -> f64 {
        self.regime.exponent()
    }

    pub fn initial_rate(&self) -> f64 {
        self.initial_rate
    }

    pub fn initial_decline(&self) -> f64 {
        self.initial_decline
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// `D_i` expressed per year.
    pub fn annual_decline(&self) -> f64 {
        self.initial_decline * DAYS_PER_YEAR
    }

    /// `q_i / D_i`; the exponential model's total recoverable volume.
    pub fn volume_scale(&self) -> f64 {
        self.initial_rate / self.initial_decline
    }

    // ---- Evaluation ----

    pub fn rate(&self, t: f64) -> f64 {
        self.initial_rate * self.regime.rate_factor(self.initial_decline, t)
    }

    pub fn cumulative(&self, t: f64) -> f64 {
        self.initial_rate * self.regime.cumulative_factor(self.initial_decline, t)
    }

    /// False for back-casts at or before the hyperbolic/harmonic pole.
    pub fn is_defined_at(&self, t: f64) -> bool {
        self.regime.defined_at(self.initial_decline, t)
    }

    pub fn rates(&self, days: &Array1<f64>) -> Array1<f64> {
        days.mapv(|t| self.rate(t))
    }

    pub fn cumulatives(&self, days: &Array1<f64>) -> Array1<f64> {
        days.mapv(|t| self.cumulative(t))
    }

    pub fn offset(&self, instant: NaiveDateTime) -> f64 {
        elapsed_days(instant, self.reference)
    }

    pub fn rate_on(&self, instant: NaiveDateTime) -> f64 {
        self.rate(self.offset(instant))
    }

    pub fn cumulative_on(&self, instant: NaiveDateTime) -> f64 {
        self.cumulative(self.offset(instant))
    }

    // ---- Decline diagnostics ----

    pub fn nominal_decline(&self, t: f64) -> f64 {
        self.regime.nominal_decline(self.initial_decline, t)
    }

    pub fn effective_decline(&self, t: f64) -> f64 {
        self.regime.effective_decline(self.initial_decline, t)
    }

    /// Days from the reference until the rate reaches `economic_limit`;
    /// zero when the model already starts at or below it.
    ///
    /// # Errors
    /// - `InvalidParameter` if `economic_limit` is not finite and positive.
    pub fn producing_life(&self, economic_limit: f64) -> DeclineResult<f64> {
        ensure_positive("economic_limit", economic_limit)?;
        if economic_limit >= self.initial_rate {
            return Ok(0.0);
        }
        let ratio = self.initial_rate / economic_limit;
        Ok(self.regime.time_to_ratio(self.initial_decline, ratio))
    }

    /// Volume produced from the reference until the economic limit.
    ///
    /// # Errors
    /// - `InvalidParameter` if `economic_limit` is not finite and positive.
    pub fn economic_reserves(&self, economic_limit: f64) -> DeclineResult<f64> {
        self.producing_life(economic_limit).map(|t| self.cumulative(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decline::errors::DeclineError;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction-time validation.
    // - Monotone decay and the cumulative/rate relationship.
    // - Calendar evaluation, including back-casting.
    // - Economic-limit diagnostics.
    // -------------------------------------------------------------------------

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("valid date")
    }

    #[test]
    // Purpose
    // -------
    // Ensure invalid parameters are rejected at construction.
    //
    // Given
    // -----
    // - Zero rate, NaN decline, and a hyperbolic regime with `b = 2`.
    //
    // Expect
    // ------
    // - `InvalidParameter`, `InvalidParameter`, `InvalidExponent`.
    fn new_rejects_invalid_parameters() {
        // Arrange
        let r = reference();

        // Act / Assert
        assert!(matches!(
            DeclineModel::new(Regime::Exponential, 0.0, 0.01, r),
            Err(DeclineError::InvalidParameter { name: "initial_rate", .. })
        ));
        assert!(matches!(
            DeclineModel::new(Regime::Harmonic, 10.0, f64::NAN, r),
            Err(DeclineError::InvalidParameter { name: "initial_decline", .. })
        ));
        assert!(matches!(
            DeclineModel::new(Regime::Hyperbolic { b: 2.0 }, 10.0, 0.01, r),
            Err(DeclineError::InvalidExponent { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify rates strictly decrease and cumulative integrates the rate.
    //
    // Given
    // -----
    // - `q = 100`, `D = 0.02` for all regimes; `t = 0..200` step 10.
    //
    // Expect
    // ------
    // - Strictly decreasing rates; `dCum/dt ≈ rate` by central difference.
    fn rates_decay_and_cumulative_integrates_rate() {
        for regime in [Regime::Exponential, Regime::Hyperbolic { b: 0.3 }, Regime::Harmonic] {
            // Arrange
            let model = DeclineModel::new(regime, 100.0, 0.02, reference()).expect("valid model");
            let days = Array1::range(0.0, 201.0, 10.0);

            // Act
            let rates = model.rates(&days);

            // Assert
            assert!(rates.windows(2).into_iter().all(|w| w[1] < w[0]), "{regime}");
            for &t in &[5.0, 50.0, 150.0] {
                let h = 1e-4;
                let deriv = (model.cumulative(t + h) - model.cumulative(t - h)) / (2.0 * h);
                assert_relative_eq!(deriv, model.rate(t), max_relative = 1e-6);
            }
            assert_eq!(model.cumulative(0.0), 0.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // Check calendar evaluation and negative offsets.
    //
    // Given
    // -----
    // - Exponential model at 2020-01-01; instants 10 days after and before.
    //
    // Expect
    // ------
    // - Offsets ±10; back-cast rate exceeds `q_i` and cumulative is negative.
    fn calendar_evaluation_supports_back_casting() {
        // Arrange
        let model =
            DeclineModel::new(Regime::Exponential, 50.0, 0.01, reference()).expect("valid model");
        let after = reference() + chrono::TimeDelta::days(10);
        let before = reference() - chrono::TimeDelta::days(10);

        // Act / Assert
        assert_relative_eq!(model.offset(after), 10.0);
        assert_relative_eq!(model.rate_on(after), 50.0 * (-0.1f64).exp(), max_relative = 1e-14);
        assert!(model.rate_on(before) > 50.0);
        assert!(model.cumulative_on(before) < 0.0);
        assert_eq!(model.rates(&array![-10.0, 10.0])[0], model.rate_on(before));
    }

    #[test]
    // Purpose
    // -------
    // Verify economic-limit life and reserves.
    //
    // Given
    // -----
    // - Harmonic `q = 100`, `D = 0.01`; limits 25, 150, and -1.
    //
    // Expect
    // ------
    // - Life 300 days with rate 25 there; zero life above `q_i`; error for -1.
    fn producing_life_and_reserves() {
        // Arrange
        let model =
            DeclineModel::new(Regime::Harmonic, 100.0, 0.01, reference()).expect("valid model");

        // Act
        let life = model.producing_life(25.0).expect("positive limit");
        let reserves = model.economic_reserves(25.0).expect("positive limit");

        // Assert
        assert_relative_eq!(life, 300.0, max_relative = 1e-12);
        assert_relative_eq!(model.rate(life), 25.0, max_relative = 1e-12);
        assert_relative_eq!(reserves, 100.0 / 0.01 * 4f64.ln(), max_relative = 1e-12);
        assert_eq!(model.producing_life(150.0), Ok(0.0));
        assert!(model.producing_life(-1.0).is_err());
        assert_relative_eq!(model.annual_decline(), 3.6525);
        assert_relative_eq!(model.volume_scale(), 10_000.0);
    }
}
