//! decline::core::observations — one entity's (timestamp, rate) history.
//!
//! Purpose
//! -------
//! Turn the two raw columns handed over by a data collaborator into the
//! calibration arrays the regressor needs: sorted, de-duplicated, windowed,
//! shifted to a reference instant, and stripped of unusable rates.
//!
//! Key behaviors
//! -------------
//! - [`ObservationSeries::new`] sorts by timestamp (stable) and sums rates
//!   that share a timestamp, since multiple sources may report the same day.
//! - [`ObservationSeries::select`] keeps observations inside the union of
//!   calibration windows.
//! - [`ObservationSeries::calibration`] drops samples before the reference
//!   and samples whose rate is not finite and positive, then expresses time
//!   as elapsed days.
//!
//! Invariants & assumptions
//! ------------------------
//! - Timestamps are strictly increasing after construction.
//! - A duplicate group sums its finite members; a group with no finite
//!   member yields `NaN` and is later dropped from calibration.
//!
//! Downstream usage
//! ----------------
//! - `decline::fit` is the only consumer; it logs how many samples the
//!   calibration step discarded.
use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::{
    decline::errors::{DeclineError, DeclineResult},
    schedule::{TimeIndex, TimeWindow},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    index: TimeIndex,
    rates: Array1<f64>,
}

/// Usable samples on the elapsed-day axis, ready for regression.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub reference: NaiveDateTime,
    pub days: Array1<f64>,
    pub rates: Array1<f64>,
    /// Samples discarded for preceding the reference or having an unusable rate.
    pub dropped: usize,
}

impl ObservationSeries {
    /// # Errors
    /// - [`DeclineError::LengthMismatch`] when the columns differ in length.
    pub fn new(timestamps: &[NaiveDateTime], rates: &[f64]) -> DeclineResult<Self> {
        if timestamps.len() != rates.len() {
            return Err(DeclineError::LengthMismatch {
                timestamps: timestamps.len(),
                rates: rates.len(),
            });
        }
        let sorted = TimeIndex::new(timestamps.iter().copied());
        let aligned = sorted.align(rates)?;

        let mut stamps: Vec<NaiveDateTime> = Vec::with_capacity(aligned.len());
        let mut summed: Vec<f64> = Vec::with_capacity(aligned.len());
        let mut finite_in_group: Vec<bool> = Vec::with_capacity(aligned.len());
        for (&stamp, &rate) in sorted.as_slice().iter().zip(aligned.iter()) {
            if stamps.last() != Some(&stamp) {
                stamps.push(stamp);
                summed.push(0.0);
                finite_in_group.push(false);
            }
            if rate.is_finite() {
                if let (Some(total), Some(seen)) = (summed.last_mut(), finite_in_group.last_mut()) {
                    *total += rate;
                    *seen = true;
                }
            }
        }
        let rates = summed
            .into_iter()
            .zip(finite_in_group)
            .map(|(total, seen)| if seen { total } else { f64::NAN })
            .collect();
        Ok(Self { index: TimeIndex::new(stamps), rates })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        self.index.as_slice()
    }

    pub fn rates(&self) -> &Array1<f64> {
        &self.rates
    }

    /// Observations inside any of `windows`; an empty slice keeps everything.
    ///
    /// # Errors
    /// - [`DeclineError::EmptyWindow`] when the windows select nothing.
    pub fn select(&self, windows: &[TimeWindow]) -> DeclineResult<Self> {
        if windows.is_empty() {
            return Ok(self.clone());
        }
        let mask = self.index.between(windows);
        let (stamps, rates): (Vec<NaiveDateTime>, Vec<f64>) = self
            .timestamps()
            .iter()
            .zip(self.rates.iter())
            .zip(mask)
            .filter_map(|((&s, &r), keep)| keep.then_some((s, r)))
            .unzip();
        if stamps.is_empty() {
            return Err(DeclineError::EmptyWindow);
        }
        Ok(Self { index: TimeIndex::new(stamps), rates: Array1::from(rates) })
    }

    /// Usable samples relative to `reference`, or to the first timestamp
    /// when `reference` is `None`.
    ///
    /// # Errors
    /// - [`DeclineError::EmptyWindow`] on an empty series.
    pub fn calibration(&self, reference: Option<NaiveDateTime>) -> DeclineResult<Calibration> {
        let reference = match reference.or_else(|| self.index.first()) {
            Some(r) => r,
            None => return Err(DeclineError::EmptyWindow),
        };
        let offsets = self.index.days_since(reference);
        let (days, rates): (Vec<f64>, Vec<f64>) = offsets
            .iter()
            .zip(self.rates.iter())
            .filter(|&(&t, &q)| t >= 0.0 && q.is_finite() && q > 0.0)
            .map(|(&t, &q)| (t, q))
            .unzip();
        let dropped = self.len() - days.len();
        Ok(Calibration {
            reference,
            days: Array1::from(days),
            rates: Array1::from(rates),
            dropped,
        })
    }
}
