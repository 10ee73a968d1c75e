//! decline::forecast — evaluate fitted models on calendar grids.
//!
//! Purpose
//! -------
//! Turn a [`DeclineModel`] into rate (and optionally cumulative) series on
//! explicit dates or on a synthetic `(interval, frequency)` grid, for one
//! entity or many.
//!
//! Key behaviors
//! -------------
//! - [`DateSpec`] is either a list of instants or a set of intervals
//!   expanded with [`TimeIndex::build`].
//! - [`run`] converts each date to elapsed days relative to the model's
//!   reference; negative offsets back-cast.
//! - An economic limit masks the tail in time: every date whose rate is
//!   below the limit reports `NaN` rate and cumulative. The rate strictly
//!   decreases, so these are exactly the dates past the producing life,
//!   wherever they sit in the grid.
//! - [`run_batch`] evaluates many models on one shared grid in parallel and
//!   concatenates rows in input order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Apart from economic-limit masking, every reported value is finite. A
//!   hyperbolic back-cast past the model's pole is an error, not `NaN`.
//! - Dates are evaluated in the order given; explicit lists are not sorted.
use chrono::NaiveDateTime;
use ndarray::{Array1, Zip};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    decline::{
        core::{DeclineModel, ForecastOptions},
        errors::{DeclineError, DeclineResult},
    },
    schedule::{Frequency, TimeIndex},
};

/// Where to evaluate a forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum DateSpec {
    Dates(Vec<NaiveDateTime>),
    Range { intervals: Vec<(NaiveDateTime, NaiveDateTime)>, frequency: Frequency },
}

impl DateSpec {
    /// Single `[start, end]` interval at `frequency`.
    pub fn range(start: NaiveDateTime, end: NaiveDateTime, frequency: Frequency) -> Self {
        DateSpec::Range { intervals: vec![(start, end)], frequency }
    }

    /// # Errors
    /// - `Schedule` when a range cannot be expanded.
    pub fn resolve(&self) -> DeclineResult<Vec<NaiveDateTime>> {
        match self {
            DateSpec::Dates(dates) => Ok(dates.clone()),
            DateSpec::Range { intervals, frequency } => {
                Ok(TimeIndex::build(intervals, *frequency)?)
            }
        }
    }
}

impl From<Vec<NaiveDateTime>> for DateSpec {
    fn from(dates: Vec<NaiveDateTime>) -> Self {
        DateSpec::Dates(dates)
    }
}

/// Forecast of one model on one grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForecastCurve {
    dates: Vec<NaiveDateTime>,
    rate: Array1<f64>,
    cumulative: Option<Array1<f64>>,
}

impl ForecastCurve {
    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    pub fn rate(&self) -> &Array1<f64> {
        &self.rate
    }

    pub fn cumulative(&self) -> Option<&Array1<f64>> {
        self.cumulative.as_ref()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// One row of a [`BatchForecast`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForecastRow {
    pub entity: String,
    pub date: NaiveDateTime,
    pub rate: f64,
    pub cumulative: Option<f64>,
}

/// Concatenated forecasts, entity by entity in input order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatchForecast {
    pub rows: Vec<ForecastRow>,
}

impl BatchForecast {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to `entity`.
    pub fn entity<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a ForecastRow> + 'a {
        self.rows.iter().filter(move |row| row.entity == entity)
    }
}

/// Evaluate `model` on `dates`.
///
/// # Errors
/// - `Schedule` when a range cannot be expanded.
/// - `InvalidParameter { name: "forecast_offset" }` when a date falls
///   before the model's pole, where the rate is undefined.
pub fn run(
    model: &DeclineModel, dates: &DateSpec, options: &ForecastOptions,
) -> DeclineResult<ForecastCurve> {
    let dates = dates.resolve()?;
    evaluate(model, dates, options)
}

/// Evaluate every model on one shared grid; rows keep input order.
///
/// # Errors
/// - The first failure in input order, as [`run`] reports it.
pub fn run_batch(
    models: &[(String, DeclineModel)], dates: &DateSpec, options: &ForecastOptions,
) -> DeclineResult<BatchForecast> {
    let grid = dates.resolve()?;
    let curves: Vec<DeclineResult<ForecastCurve>> = models
        .par_iter()
        .map(|(_, model)| evaluate(model, grid.clone(), options))
        .collect();

    let mut rows = Vec::with_capacity(models.len() * grid.len());
    for ((name, _), curve) in models.iter().zip(curves) {
        let curve = curve?;
        for (i, &date) in curve.dates.iter().enumerate() {
            rows.push(ForecastRow {
                entity: name.clone(),
                date,
                rate: curve.rate[i],
                cumulative: curve.cumulative.as_ref().map(|c| c[i]),
            });
        }
    }
    Ok(BatchForecast { rows })
}

fn evaluate(
    model: &DeclineModel, dates: Vec<NaiveDateTime>, options: &ForecastOptions,
) -> DeclineResult<ForecastCurve> {
    let days = Array1::from_iter(dates.iter().map(|&d| model.offset(d)));
    let mut rate = model.rates(&days);
    if let Some(i) = days
        .iter()
        .zip(rate.iter())
        .position(|(&t, q)| !model.is_defined_at(t) || !q.is_finite())
    {
        return Err(DeclineError::InvalidParameter { name: "forecast_offset", value: days[i] });
    }
    let mut cumulative = options.with_cumulative().then(|| model.cumulatives(&days));

    if let Some(limit) = options.economic_limit() {
        let past_limit = rate.mapv(|q| q < limit);
        Zip::from(&mut rate).and(&past_limit).for_each(|q, &masked| {
            if masked {
                *q = f64::NAN;
            }
        });
        if let Some(cum) = cumulative.as_mut() {
            Zip::from(cum).and(&past_limit).for_each(|c, &masked| {
                if masked {
                    *c = f64::NAN;
                }
            });
        }
    }
    Ok(ForecastCurve { dates, rate, cumulative })
}
