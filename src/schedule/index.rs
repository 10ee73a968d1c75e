//! schedule::index — sorted timestamp index with elapsed-day conversion and masks.
//!
//! Purpose
//! -------
//! Own a sorted sequence of timestamps for one entity and answer the
//! calendar questions decline fitting and forecasting need: elapsed days
//! relative to a reference, boolean selection masks, nearest-point lookup,
//! month lengths, and synthetic date grids.
//!
//! Key behaviors
//! -------------
//! - [`TimeIndex::new`] stable-sorts its input and keeps the permutation so
//!   parallel columns can be re-aligned with [`TimeIndex::align`].
//! - [`TimeIndex::days_since`] returns fractional days; instants before the
//!   reference map to negative offsets.
//! - [`TimeIndex::prior`], [`TimeIndex::later`], [`TimeIndex::within`], and
//!   [`TimeIndex::between`] build masks at day granularity under an explicit
//!   [`Inclusive`] policy.
//! - [`TimeIndex::build`] expands one or more intervals at a [`Frequency`]
//!   and concatenates them in input order.
//! - [`TimeIndex::daily_rates`] turns a cumulative monthly column into daily
//!   rates using the length of the preceding month.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stored timestamps are non-decreasing; ties keep their input order.
//! - `order()[i]` is the input position of the `i`-th sorted timestamp.
//! - Masks are always `len()` long and aligned with the sorted order.
//!
//! Conventions
//! -----------
//! - One day is exactly 86 400 seconds; leap seconds are ignored.
//! - `build` does not de-duplicate timestamps shared by overlapping or
//!   touching intervals.
//!
//! Testing notes
//! -------------
//! - Unit tests cover stable sorting and alignment, negative offsets,
//!   nesting of boundary policies, nearest-tie resolution, month shifts,
//!   and cumulative-to-daily conversion.
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::Array1;

use crate::schedule::{
    errors::{ScheduleError, ScheduleResult},
    frequency::{Frequency, days_in_month, shift_months},
    window::{Inclusive, TimeWindow},
};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Elapsed fractional days from `reference` to `instant`.
pub fn elapsed_days(instant: NaiveDateTime, reference: NaiveDateTime) -> f64 {
    (instant - reference).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// `TimeIndex` — sorted timestamps plus the sorting permutation.
///
/// Fields
/// ------
/// - `stamps`: timestamps in non-decreasing order.
/// - `order`: input positions of `stamps`, so `stamps[i] == input[order[i]]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeIndex {
    stamps: Vec<NaiveDateTime>,
    order: Vec<usize>,
}

impl TimeIndex {
    /// Build an index from timestamps in any order.
    pub fn new<I: IntoIterator<Item = NaiveDateTime>>(stamps: I) -> Self {
        let raw: Vec<NaiveDateTime> = stamps.into_iter().collect();
        let mut order: Vec<usize> = (0..raw.len()).collect();
        order.sort_by_key(|&i| raw[i]);
        let stamps = order.iter().map(|&i| raw[i]).collect();
        Self { stamps, order }
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn as_slice(&self) -> &[NaiveDateTime] {
        &self.stamps
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn first(&self) -> Option<NaiveDateTime> {
        self.stamps.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDateTime> {
        self.stamps.last().copied()
    }

    /// Reorder a column given in input order so it lines up with the index.
    ///
    /// # Errors
    /// - [`ScheduleError::LengthMismatch`] when `values.len() != self.len()`.
    pub fn align<T: Clone>(&self, values: &[T]) -> ScheduleResult<Vec<T>> {
        if values.len() != self.len() {
            return Err(ScheduleError::LengthMismatch { expected: self.len(), found: values.len() });
        }
        Ok(self.order.iter().map(|&i| values[i].clone()).collect())
    }

    /// Elapsed fractional days of every timestamp relative to `reference`.
    pub fn days_since(&self, reference: NaiveDateTime) -> Array1<f64> {
        self.stamps.iter().map(|&s| elapsed_days(s, reference)).collect()
    }

    /// Mask of timestamps on or before `date`; the boundary day is kept when
    /// `inclusive` includes the right side.
    pub fn prior(&self, date: NaiveDate, inclusive: Inclusive) -> Vec<bool> {
        self.stamps
            .iter()
            .map(|s| {
                let day = s.date();
                if inclusive.includes_right() { day <= date } else { day < date }
            })
            .collect()
    }

    /// Mask of timestamps on or after `date`; the boundary day is kept when
    /// `inclusive` includes the left side.
    pub fn later(&self, date: NaiveDate, inclusive: Inclusive) -> Vec<bool> {
        self.stamps
            .iter()
            .map(|s| {
                let day = s.date();
                if inclusive.includes_left() { day >= date } else { day > date }
            })
            .collect()
    }

    /// Mask of timestamps inside `[start, end]` under `inclusive`.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidInterval`] when `start > end`.
    pub fn within(
        &self, start: NaiveDate, end: NaiveDate, inclusive: Inclusive,
    ) -> ScheduleResult<Vec<bool>> {
        let window = TimeWindow::new(start, end, inclusive)?;
        Ok(self.window_mask(&window))
    }

    /// Mask for a single pre-validated window.
    pub fn window_mask(&self, window: &TimeWindow) -> Vec<bool> {
        self.stamps.iter().map(|s| window.contains(s.date())).collect()
    }

    /// Union of window masks; an empty window list selects nothing.
    pub fn between(&self, windows: &[TimeWindow]) -> Vec<bool> {
        self.stamps.iter().map(|s| windows.iter().any(|w| w.contains(s.date()))).collect()
    }

    /// Synthetic grid spanning each interval at `frequency`, concatenated in
    /// input order.
    ///
    /// # Errors
    /// - Propagates [`Frequency::expand`] failures (zero step, reversed
    ///   interval, calendar overflow).
    pub fn build(
        intervals: &[(NaiveDateTime, NaiveDateTime)], frequency: Frequency,
    ) -> ScheduleResult<Vec<NaiveDateTime>> {
        let mut grid = Vec::new();
        for &(start, end) in intervals {
            grid.extend(frequency.expand(start, end)?);
        }
        Ok(grid)
    }

    /// Timestamp closest to `target`; ties resolve to the earlier one.
    ///
    /// # Errors
    /// - [`ScheduleError::EmptyIndex`] on an empty index.
    pub fn nearest(&self, target: NaiveDateTime) -> ScheduleResult<NaiveDateTime> {
        let pos = self.stamps.partition_point(|&s| s < target);
        let after = self.stamps.get(pos).copied();
        let before = pos.checked_sub(1).and_then(|i| self.stamps.get(i)).copied();
        match (before, after) {
            (Some(b), Some(a)) => Ok(if target - b <= a - target { b } else { a }),
            (Some(b), None) => Ok(b),
            (None, Some(a)) => Ok(a),
            (None, None) => Err(ScheduleError::EmptyIndex),
        }
    }

    /// Days in the month containing each timestamp, after shifting by
    /// `shift` calendar months.
    ///
    /// # Errors
    /// - [`ScheduleError::DateOutOfRange`] if a shift leaves chrono's range.
    pub fn month_length(&self, shift: i32) -> ScheduleResult<Vec<u32>> {
        self.stamps
            .iter()
            .map(|s| shift_months(s.date(), shift).and_then(days_in_month))
            .collect()
    }

    /// Daily rates from a cumulative monthly column aligned with the index.
    ///
    /// Each entry is `(cum[i] - cum[i-1]) / days_in_previous_month(i)`; the
    /// first entry has no predecessor and is `NaN`.
    ///
    /// # Errors
    /// - [`ScheduleError::LengthMismatch`] when `cumulative.len() != len()`.
    /// - [`ScheduleError::DateOutOfRange`] from the month-length lookup.
    pub fn daily_rates(&self, cumulative: &[f64]) -> ScheduleResult<Array1<f64>> {
        if cumulative.len() != self.len() {
            return Err(ScheduleError::LengthMismatch {
                expected: self.len(),
                found: cumulative.len(),
            });
        }
        let days = self.month_length(-1)?;
        let mut rates = Array1::from_elem(self.len(), f64::NAN);
        for i in 1..cumulative.len() {
            rates[i] = (cumulative[i] - cumulative[i - 1]) / f64::from(days[i]);
        }
        Ok(rates)
    }
}
