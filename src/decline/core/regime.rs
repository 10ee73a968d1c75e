//! decline::core::regime — the three Arps decline regimes.
//!
//! Purpose
//! -------
//! Hold every formula that depends on *which* Arps regime is in play, so
//! the model, regressor, refiner, and percentile code dispatch once on
//! [`Regime`] instead of branching on the exponent.
//!
//! Key behaviors
//! -------------
//! - Rate and cumulative closed forms, normalized by the initial rate:
//!   `rate(t) = q · rate_factor(D, t)`, `cum(t) = q · cumulative_factor(D, t)`.
//! - Linearizing transform of observed rates and the inverse map from an OLS
//!   `(slope, intercept)` back to `(q, D)`.
//! - Decline diagnostics: nominal and effective decline, and the time for
//!   the rate to fall by a given ratio.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Hyperbolic { b }` always carries `0 < b < 1` when built through
//!   [`Regime::from_exponent`]; exponents of exactly 0 and 1 resolve to the
//!   dedicated variants, so the generic formula never meets its removable
//!   singularities.
//! - Formulas accept negative `t`. For the hyperbolic and harmonic regimes
//!   the rate is undefined at and before the pole `1 + bDt = 0`.
//!
//! Conventions
//! -----------
//! - `D` is the initial nominal decline per day; `t` is elapsed days.
//! - Mode names parse case-insensitively: `exp`/`exponential`,
//!   `hyp`/`hyperbolic`, `har`/`harmonic`. A bare hyperbolic mode uses
//!   [`DEFAULT_HYPERBOLIC_EXPONENT`].
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::decline::errors::{DeclineError, DeclineResult};

/// Exponent used when the hyperbolic mode is requested by name only.
pub const DEFAULT_HYPERBOLIC_EXPONENT: f64 = 0.5;

/// Arps decline regime, resolved once from the exponent `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Regime {
    /// `b = 0`.
    Exponential,
    /// `0 < b < 1`.
    Hyperbolic { b: f64 },
    /// `b = 1`.
    Harmonic,
}

impl Regime {
    /// Resolve a regime from an exponent in `[0, 1]`.
    ///
    /// # Errors
    /// - [`DeclineError::InvalidExponent`] for non-finite `b` or `b ∉ [0, 1]`.
    pub fn from_exponent(b: f64) -> DeclineResult<Self> {
        if !b.is_finite() || !(0.0..=1.0).contains(&b) {
            return Err(DeclineError::InvalidExponent { value: b });
        }
        Ok(if b == 0.0 {
            Regime::Exponential
        } else if b == 1.0 {
            Regime::Harmonic
        } else {
            Regime::Hyperbolic { b }
        })
    }

    /// Re-validate a possibly hand-built value, routing `b ∈ {0, 1}` to the
    /// dedicated variants.
    pub fn normalized(self) -> DeclineResult<Self> {
        Regime::from_exponent(self.exponent())
    }

    pub fn exponent(self) -> f64 {
        match self {
            Regime::Exponential => 0.0,
            Regime::Hyperbolic { b } => b,
            Regime::Harmonic => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Regime::Exponential => "exponential",
            Regime::Hyperbolic { .. } => "hyperbolic",
            Regime::Harmonic => "harmonic",
        }
    }

    // ---- Forward model ----

    /// `rate(t) / q`.
    pub fn rate_factor(self, d: f64, t: f64) -> f64 {
        match self {
            Regime::Exponential => (-d * t).exp(),
            Regime::Hyperbolic { b } => (1.0 + b * d * t).powf(-1.0 / b),
            Regime::Harmonic => 1.0 / (1.0 + d * t),
        }
    }

    /// `cumulative(t) / q`, volume produced between the reference and `t`.
    pub fn cumulative_factor(self, d: f64, t: f64) -> f64 {
        match self {
            Regime::Exponential => -(-d * t).exp_m1() / d,
            Regime::Hyperbolic { b } => {
                (1.0 - (1.0 + b * d * t).powf(1.0 - 1.0 / b)) / ((1.0 - b) * d)
            }
            Regime::Harmonic => (d * t).ln_1p() / d,
        }
    }

    /// `∂(rate(t) / q) / ∂D`.
    pub fn rate_factor_partial(self, d: f64, t: f64) -> f64 {
        match self {
            Regime::Exponential => -t * (-d * t).exp(),
            Regime::Hyperbolic { b } => -t * (1.0 + b * d * t).powf(-1.0 / b - 1.0),
            Regime::Harmonic => -t / (1.0 + d * t).powi(2),
        }
    }

    /// Whether the forward model is defined at `t`. Hyperbolic and harmonic
    /// curves have a pole at `t = -1/(bD)`; back-casts must stay after it.
    pub fn defined_at(self, d: f64, t: f64) -> bool {
        match self {
            Regime::Exponential => t.is_finite(),
            Regime::Hyperbolic { b } => 1.0 + b * d * t > 0.0,
            Regime::Harmonic => 1.0 + d * t > 0.0,
        }
    }

    // ---- Linearization ----

    /// Transform under which the regime is a straight line in `t`:
    /// `ln q`, `q^(-b)`, or `1/q`.
    pub fn linearize(self, rate: f64) -> f64 {
        match self {
            Regime::Exponential => rate.ln(),
            Regime::Hyperbolic { b } => rate.powf(-b),
            Regime::Harmonic => rate.recip(),
        }
    }

    /// Map an OLS line on linearized rates back to `(q, D)`.
    ///
    /// # Errors
    /// - [`DeclineError::InvalidParameter`] when either result is not finite
    ///   and positive, e.g. a line fitted to increasing production.
    pub fn invert(self, slope: f64, intercept: f64) -> DeclineResult<(f64, f64)> {
        let (q, d) = match self {
            Regime::Exponential => (intercept.exp(), -slope),
            Regime::Hyperbolic { b } => (intercept.powf(-1.0 / b), slope / (b * intercept)),
            Regime::Harmonic => (intercept.recip(), slope / intercept),
        };
        ensure_positive("initial_rate", q)?;
        ensure_positive("initial_decline", d)?;
        Ok((q, d))
    }

    /// Sign of `d(linearize(rate)) / d(rate)`: `+1` when a larger linearized
    /// value means a larger rate, `-1` otherwise.
    pub(crate) fn linear_direction(self) -> f64 {
        match self {
            Regime::Exponential => 1.0,
            Regime::Hyperbolic { .. } | Regime::Harmonic => -1.0,
        }
    }

    // ---- Diagnostics ----

    /// Instantaneous nominal decline `-(dq/dt)/q` at `t`.
    pub fn nominal_decline(self, d: f64, t: f64) -> f64 {
        match self {
            Regime::Exponential => d,
            Regime::Hyperbolic { b } => d / (1.0 + b * d * t),
            Regime::Harmonic => d / (1.0 + d * t),
        }
    }

    /// Fractional rate drop over the next day, `1 - rate(t+1)/rate(t)`.
    pub fn effective_decline(self, d: f64, t: f64) -> f64 {
        let nominal = self.nominal_decline(d, t);
        match self {
            Regime::Exponential => -(-d).exp_m1(),
            Regime::Hyperbolic { b } => 1.0 - (1.0 + b * nominal).powf(-1.0 / b),
            Regime::Harmonic => nominal / (1.0 + nominal),
        }
    }

    /// Elapsed time until the rate has fallen by `ratio = q / q_target ≥ 1`.
    pub fn time_to_ratio(self, d: f64, ratio: f64) -> f64 {
        match self {
            Regime::Exponential => ratio.ln() / d,
            Regime::Hyperbolic { b } => (ratio.powf(b) - 1.0) / (b * d),
            Regime::Harmonic => (ratio - 1.0) / d,
        }
    }
}

impl FromStr for Regime {
    type Err = DeclineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exp" | "exponential" => Ok(Regime::Exponential),
            "hyp" | "hyperbolic" => Ok(Regime::Hyperbolic { b: DEFAULT_HYPERBOLIC_EXPONENT }),
            "har" | "harmonic" => Ok(Regime::Harmonic),
            _ => Err(DeclineError::UnknownMode { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Hyperbolic { b } => write!(f, "hyperbolic(b={b})"),
            other => f.write_str(other.name()),
        }
    }
}

/// The `mode_or_exponent` argument of `fit`: a named mode or a raw exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeOrExponent {
    Mode(Regime),
    Exponent(f64),
}

impl ModeOrExponent {
    /// # Errors
    /// - [`DeclineError::InvalidExponent`] for an exponent outside `[0, 1]`.
    pub fn resolve(self) -> DeclineResult<Regime> {
        match self {
            ModeOrExponent::Mode(regime) => regime.normalized(),
            ModeOrExponent::Exponent(b) => Regime::from_exponent(b),
        }
    }
}

impl From<Regime> for ModeOrExponent {
    fn from(regime: Regime) -> Self {
        ModeOrExponent::Mode(regime)
    }
}

impl From<f64> for ModeOrExponent {
    fn from(b: f64) -> Self {
        ModeOrExponent::Exponent(b)
    }
}

impl FromStr for ModeOrExponent {
    type Err = DeclineError;

    /// Numeric text is an exponent; anything else must be a mode name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(b) => Ok(ModeOrExponent::Exponent(b)),
            Err(_) => s.parse::<Regime>().map(ModeOrExponent::Mode),
        }
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> DeclineResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DeclineError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Regime resolution from exponents and mode names.
    // - Continuity of the hyperbolic forms near b = 0 and b = 1.
    // - Linearize/invert consistency and rejection of rising lines.
    // - Analytic partials against finite differences.
    // - Decline diagnostics against their defining ratios.
    //
    // They intentionally DO NOT cover:
    // - Parameter validation of whole models (see `model`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check that boundary exponents route to the dedicated variants.
    //
    // Given
    // -----
    // - `b ∈ {0, 0.3, 1, -0.1, 1.5, NaN}`.
    //
    // Expect
    // ------
    // - Exponential, Hyperbolic, Harmonic, then three `InvalidExponent`.
    fn from_exponent_routes_boundaries() {
        // Arrange / Act / Assert
        assert_eq!(Regime::from_exponent(0.0), Ok(Regime::Exponential));
        assert_eq!(Regime::from_exponent(0.3), Ok(Regime::Hyperbolic { b: 0.3 }));
        assert_eq!(Regime::from_exponent(1.0), Ok(Regime::Harmonic));
        for bad in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(Regime::from_exponent(bad), Err(DeclineError::InvalidExponent { .. })));
        }
        assert_eq!(Regime::Hyperbolic { b: 1.0 }.normalized(), Ok(Regime::Harmonic));
    }

    #[test]
    // Purpose
    // -------
    // Verify mode-name and mixed argument parsing.
    //
    // Given
    // -----
    // - `"EXP"`, `"hyp"`, `"Harmonic"`, `"0.7"`, and `"linear"`.
    //
    // Expect
    // ------
    // - Hyperbolic by name uses the default exponent; numeric text is an exponent.
    fn mode_names_parse_case_insensitively() {
        // Arrange / Act / Assert
        assert_eq!("EXP".parse::<Regime>(), Ok(Regime::Exponential));
        assert_eq!(
            "hyp".parse::<Regime>(),
            Ok(Regime::Hyperbolic { b: DEFAULT_HYPERBOLIC_EXPONENT })
        );
        assert_eq!("Harmonic".parse::<Regime>(), Ok(Regime::Harmonic));
        assert_eq!("0.7".parse::<ModeOrExponent>(), Ok(ModeOrExponent::Exponent(0.7)));
        assert!(matches!("linear".parse::<ModeOrExponent>(), Err(DeclineError::UnknownMode { .. })));
        assert_eq!(ModeOrExponent::from(1.0).resolve(), Ok(Regime::Harmonic));
    }

    #[test]
    // Purpose
    // -------
    // Ensure the hyperbolic forms approach the limiting closed forms.
    //
    // Given
    // -----
    // - `D = 0.01`, `t ∈ {0, 30, 365}`, `b = 1e-4` and `b = 0.9999`.
    //
    // Expect
    // ------
    // - Rate and cumulative factors within 1e-3 relative of the limits.
    fn hyperbolic_is_continuous_at_the_boundaries() {
        // Arrange
        let d = 0.01;
        let near_exp = Regime::Hyperbolic { b: 1e-4 };
        let near_har = Regime::Hyperbolic { b: 0.9999 };

        for t in [0.0, 30.0, 365.0] {
            // Act / Assert
            assert_relative_eq!(
                near_exp.rate_factor(d, t),
                Regime::Exponential.rate_factor(d, t),
                max_relative = 1e-3
            );
            assert_relative_eq!(
                near_exp.cumulative_factor(d, t),
                Regime::Exponential.cumulative_factor(d, t),
                max_relative = 1e-3,
                epsilon = 1e-12
            );
            assert_relative_eq!(
                near_har.rate_factor(d, t),
                Regime::Harmonic.rate_factor(d, t),
                max_relative = 1e-3
            );
            assert_relative_eq!(
                near_har.cumulative_factor(d, t),
                Regime::Harmonic.cumulative_factor(d, t),
                max_relative = 1e-3,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Confirm `invert` undoes the line implied by the forward model.
    //
    // Given
    // -----
    // - `q = 250`, `D = 0.004`; the exact line for each regime.
    //
    // Expect
    // ------
    // - `(q, D)` recovered to 1e-12 relative.
    fn invert_recovers_parameters_from_exact_line() {
        // Arrange
        let (q, d) = (250.0, 0.004);
        for regime in [Regime::Exponential, Regime::Hyperbolic { b: 0.4 }, Regime::Harmonic] {
            let y0 = regime.linearize(q * regime.rate_factor(d, 0.0));
            let y1 = regime.linearize(q * regime.rate_factor(d, 1.0));

            // Act
            let (q_hat, d_hat) = regime.invert(y1 - y0, y0).expect("declining line");

            // Assert
            assert_relative_eq!(q_hat, q, max_relative = 1e-12);
            assert_relative_eq!(d_hat, d, max_relative = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure lines implying growth are rejected instead of yielding negative D.
    //
    // Given
    // -----
    // - Exponential line with positive slope; harmonic line with negative intercept.
    //
    // Expect
    // ------
    // - `InvalidParameter` naming the offending quantity.
    fn invert_rejects_growth_and_negative_intercepts() {
        // Arrange / Act / Assert
        assert_eq!(
            Regime::Exponential.invert(0.01, 4.0),
            Err(DeclineError::InvalidParameter { name: "initial_decline", value: -0.01 })
        );
        assert!(matches!(
            Regime::Harmonic.invert(0.001, -0.5),
            Err(DeclineError::InvalidParameter { name: "initial_rate", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify analytic `∂f/∂D` against central differences.
    //
    // Given
    // -----
    // - `D = 0.02`, `t = 40`, all three regimes.
    //
    // Expect
    // ------
    // - Agreement to 1e-6 relative.
    fn rate_partial_matches_finite_difference() {
        // Arrange
        let (d, t, h) = (0.02, 40.0, 1e-7);
        for regime in [Regime::Exponential, Regime::Hyperbolic { b: 0.6 }, Regime::Harmonic] {
            // Act
            let fd = (regime.rate_factor(d + h, t) - regime.rate_factor(d - h, t)) / (2.0 * h);

            // Assert
            assert_relative_eq!(regime.rate_factor_partial(d, t), fd, max_relative = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Check diagnostics against their definitions.
    //
    // Given
    // -----
    // - `D = 0.01`, `t = 100`, ratio `q/q_target = 4`.
    //
    // Expect
    // ------
    // - Effective decline equals `1 - f(t+1)/f(t)`; `f(time_to_ratio) = 1/4`.
    fn diagnostics_match_definitions() {
        // Arrange
        let (d, t) = (0.01, 100.0);
        for regime in [Regime::Exponential, Regime::Hyperbolic { b: 0.5 }, Regime::Harmonic] {
            // Act
            let eff = regime.effective_decline(d, t);
            let life = regime.time_to_ratio(d, 4.0);

            // Assert
            let expected = 1.0 - regime.rate_factor(d, t + 1.0) / regime.rate_factor(d, t);
            assert_relative_eq!(eff, expected, max_relative = 1e-10);
            assert_relative_eq!(regime.rate_factor(d, life), 0.25, max_relative = 1e-12);
        }
        assert_eq!(Regime::Exponential.nominal_decline(d, t), d);
    }
}
