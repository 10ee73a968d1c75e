//! decline::fit — calibrate a decline model from raw observations.
//!
//! Purpose
//! -------
//! Single entry point that turns one entity's `(timestamp, rate)` history
//! into a [`DeclineModel`], plus a batch variant for many entities.
//!
//! Key behaviors
//! -------------
//! - Pipeline: resolve the regime → sort and merge duplicates → select
//!   calibration windows → shift to the reference instant and drop unusable
//!   samples → linearized OLS → optional least-squares refinement → R².
//! - Refinement failures that are numerical in nature (non-convergence,
//!   optimizer errors) are logged at `warn` and the linear estimate is
//!   kept. With fewer than three usable samples refinement is skipped.
//! - [`fit_batch`] fits entities in parallel with `rayon` and returns the
//!   results in input order, each entity carrying its own `Result`.
//!
//! Invariants & assumptions
//! ------------------------
//! - R² is always measured on the original rate scale against the final
//!   model, whichever stage produced it.
//! - `FitResult::linear` is always present. Percentile curves come from
//!   the refined standard errors when refinement converged and from the
//!   linear regression otherwise, so P50 is always `model`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the exact exponential case, window and duplicate
//!   handling, the insufficient-data boundary, refinement fallback, and
//!   batch ordering. End-to-end checks live in
//!   `tests/integration_decline_pipeline.rs`.
use chrono::NaiveDateTime;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    decline::{
        core::{DeclineModel, FitOptions, ModeOrExponent, ObservationSeries, Regime},
        errors::{DeclineError, DeclineResult},
        regression::{
            LinearEstimate, MIN_REFINE_SAMPLES, RefinedEstimate, fit_linear, r_squared, refine,
        },
        uncertainty::{percentile_model, percentile_refined},
    },
    schedule::TimeWindow,
};

/// Fitted model together with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitResult {
    pub model: DeclineModel,
    /// Samples used for calibration.
    pub n: usize,
    /// Samples discarded before regression (before the reference or non-positive rate).
    pub dropped: usize,
    pub r_squared: f64,
    pub linear: LinearEstimate,
    /// Present only when refinement ran and converged.
    pub refined: Option<RefinedEstimate>,
}

impl FitResult {
    pub fn regime(&self) -> Regime {
        self.model.regime()
    }

    /// Percentile curve around `model` (`pct = 90` is P90).
    ///
    /// # Errors
    /// - `InvalidPercentile` / `InvalidParameter` from
    ///   [`percentile`](crate::decline::uncertainty::percentile).
    pub fn percentile(&self, pct: f64) -> DeclineResult<DeclineModel> {
        match &self.refined {
            Some(refined) => {
                percentile_refined(&self.model, refined, self.n.saturating_sub(2), pct)
            }
            None => percentile_model(&self.model, &self.linear.regression, pct),
        }
    }
}

/// One entity's observations for [`fit_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub name: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub rates: Vec<f64>,
}

impl EntitySeries {
    pub fn new(name: impl Into<String>, timestamps: Vec<NaiveDateTime>, rates: Vec<f64>) -> Self {
        Self { name: name.into(), timestamps, rates }
    }
}

/// Fit a decline model to one entity.
///
/// `windows` restricts calibration to the union of the given intervals; an
/// empty slice uses every observation. `mode_or_exponent` is a [`Regime`],
/// a raw exponent `b ∈ [0, 1]`, or a parsed [`ModeOrExponent`].
///
/// # Errors
/// - `InvalidExponent` / `UnknownMode` when the regime cannot be resolved.
/// - `LengthMismatch` when the columns differ in length.
/// - `EmptyWindow` when the windows select nothing.
/// - `InsufficientData` when fewer than two usable samples remain.
/// - `DegenerateRegression` when every usable sample shares one timestamp.
/// - `InvalidParameter` when the data does not describe a decline.
pub fn fit(
    timestamps: &[NaiveDateTime], rates: &[f64], windows: &[TimeWindow],
    mode_or_exponent: impl Into<ModeOrExponent>, options: &FitOptions,
) -> DeclineResult<FitResult> {
    let regime = mode_or_exponent.into().resolve()?;
    let series = ObservationSeries::new(timestamps, rates)?;
    if series.is_empty() {
        return Err(DeclineError::InsufficientData { found: 0, required: 2 });
    }
    let selected = series.select(windows)?;
    let calibration = selected.calibration(options.reference)?;
    if calibration.dropped > 0 {
        log::debug!(
            "dropped {} of {} samples before regression (before {} or non-positive rate)",
            calibration.dropped,
            selected.len(),
            calibration.reference
        );
    }
    let n = calibration.days.len();
    if n < 2 {
        return Err(DeclineError::InsufficientData { found: n, required: 2 });
    }

    let linear = fit_linear(regime, &calibration.days, &calibration.rates)?;
    let refined = match &options.refine {
        Some(_) if n < MIN_REFINE_SAMPLES => {
            log::debug!("skipping refinement: {n} samples, need {MIN_REFINE_SAMPLES}");
            None
        }
        Some(refine_opts) => {
            match refine(regime, &calibration.days, &calibration.rates, &linear, refine_opts) {
                Ok(estimate) => Some(estimate),
                Err(err @ (DeclineError::Convergence { .. } | DeclineError::Optimization(_))) => {
                    log::warn!("refinement failed, keeping linear estimate: {err}");
                    None
                }
                Err(err) => return Err(err),
            }
        }
        None => None,
    };

    let (q, d) = match &refined {
        Some(r) => (r.initial_rate, r.initial_decline),
        None => (linear.initial_rate, linear.initial_decline),
    };
    let model = DeclineModel::new(regime, q, d, calibration.reference)?;
    let r_squared = r_squared(&calibration.rates, &model.rates(&calibration.days));
    log::debug!(
        "fitted {regime}: q_i={q:.6}, D_i={d:.6e}/day, R²={r_squared:.4}, n={n}"
    );

    Ok(FitResult { model, n, dropped: calibration.dropped, r_squared, linear, refined })
}

/// Fit every entity in parallel; results keep the input order.
pub fn fit_batch(
    entities: &[EntitySeries], windows: &[TimeWindow], mode_or_exponent: ModeOrExponent,
    options: &FitOptions,
) -> Vec<(String, DeclineResult<FitResult>)> {
    entities
        .par_iter()
        .map(|entity| {
            let result =
                fit(&entity.timestamps, &entity.rates, windows, mode_or_exponent, options);
            if let Err(err) = &result {
                log::warn!("fit failed for {}: {err}", entity.name);
            }
            (entity.name.clone(), result)
        })
        .collect()
}
