//! core — regimes, models, observations, and options for decline analysis.
//!
//! Purpose
//! -------
//! Collect the value types the decline pipeline is built from: the Arps
//! [`Regime`] and its closed forms, the immutable [`DeclineModel`], the
//! per-entity [`ObservationSeries`], and the option structs that configure
//! fitting and forecasting.
//!
//! Invariants & assumptions
//! ------------------------
//! - A [`DeclineModel`] always holds finite, positive `(q_i, D_i)` and a
//!   normalized regime; no other constructor exists.
//! - Observation series are sorted with unique timestamps.
//!
//! Conventions
//! -----------
//! - Time is measured in elapsed days from a reference instant.
//! - Errors are [`DeclineError`](crate::decline::errors::DeclineError).

pub mod model;
pub mod observations;
pub mod options;
pub mod regime;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::model::{DAYS_PER_YEAR, DeclineModel};
pub use self::observations::{Calibration, ObservationSeries};
pub use self::options::{FitOptions, ForecastOptions, RefineOptions};
pub use self::regime::{DEFAULT_HYPERBOLIC_EXPONENT, ModeOrExponent, Regime};
