//! decline — Arps decline-curve analysis.
//!
//! Purpose
//! -------
//! Fit exponential, hyperbolic, and harmonic decline models to production
//! rate histories, forecast them on calendar grids, and derive percentile
//! curves from the fit's regression statistics.
//!
//! Key behaviors
//! -------------
//! - [`core`]: regimes, the immutable [`DeclineModel`], observation
//!   handling, and option structs.
//! - [`regression`]: linearized OLS and optional least-squares refinement.
//! - [`fit`](mod@fit): the calibration pipeline and its parallel batch form.
//! - [`forecast`]: rate / cumulative evaluation with economic-limit masking.
//! - [`uncertainty`]: P-value curves from shifted regression lines or
//!   refined standard errors.
//!
//! Conventions
//! -----------
//! - Time is measured in fractional days from the model's reference
//!   instant; declines are nominal and per day.
//! - Every fallible operation returns [`DeclineResult`].
pub mod core;
pub mod errors;
pub mod fit;
pub mod forecast;
pub mod regression;
pub mod uncertainty;

pub use self::core::{
    DAYS_PER_YEAR, DeclineModel, FitOptions, ForecastOptions, ModeOrExponent, Regime,
    RefineOptions,
};
pub use self::errors::{DeclineError, DeclineResult};
pub use self::fit::{EntitySeries, FitResult, fit, fit_batch};
pub use self::forecast::{BatchForecast, DateSpec, ForecastCurve, ForecastRow, run, run_batch};
pub use self::regression::{LinearEstimate, RefinedEstimate, RegressionResult};
pub use self::uncertainty::{percentile, percentile_model, percentile_refined};
