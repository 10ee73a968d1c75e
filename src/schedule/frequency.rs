//! Sampling frequencies for synthetic date grids.
//!
//! A [`Frequency`] expands a `[start, end]` interval into an ascending
//! sequence of timestamps. Fixed steps (hours, days, weeks) are anchored at
//! `start`; month anchors snap to the first or last calendar day of each
//! month at midnight, beginning with the first anchor not before `start`.
//! The interval end is included whenever a step lands on it exactly.
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::schedule::errors::{ScheduleError, ScheduleResult};

/// Step between consecutive grid points. Every variant carries a step count
/// that must be at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    Hours(u32),
    Days(u32),
    Weeks(u32),
    MonthStart(u32),
    MonthEnd(u32),
}

impl Frequency {
    fn step(self) -> u32 {
        match self {
            Frequency::Hours(n)
            | Frequency::Days(n)
            | Frequency::Weeks(n)
            | Frequency::MonthStart(n)
            | Frequency::MonthEnd(n) => n,
        }
    }

    /// Reject zero-length steps.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidFrequency`] when the step count is zero.
    pub fn validate(self) -> ScheduleResult<()> {
        if self.step() == 0 {
            return Err(ScheduleError::InvalidFrequency {
                step: 0,
                reason: "Frequency step must be at least one.",
            });
        }
        Ok(())
    }

    /// Expand `[start, end]` into an ascending grid.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidFrequency`] for a zero step.
    /// - [`ScheduleError::InvalidInterval`] when `start > end`.
    /// - [`ScheduleError::DateOutOfRange`] if stepping overflows chrono's range.
    pub fn expand(
        self, start: NaiveDateTime, end: NaiveDateTime,
    ) -> ScheduleResult<Vec<NaiveDateTime>> {
        self.validate()?;
        if start > end {
            return Err(ScheduleError::InvalidInterval { start, end });
        }
        match self {
            Frequency::Hours(n) => fixed_steps(start, end, TimeDelta::hours(i64::from(n))),
            Frequency::Days(n) => fixed_steps(start, end, TimeDelta::days(i64::from(n))),
            Frequency::Weeks(n) => fixed_steps(start, end, TimeDelta::weeks(i64::from(n))),
            Frequency::MonthStart(n) => month_anchors(start, end, n, first_of_month),
            Frequency::MonthEnd(n) => month_anchors(start, end, n, last_of_month),
        }
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    /// Parse pandas-style codes: an optional step count followed by `H`,
    /// `D`, `W`, `MS` (month start) or `ME`/`M` (month end).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        let split = code.find(|c: char| !c.is_ascii_digit()).unwrap_or(code.len());
        let (digits, unit) = code.split_at(split);
        let step = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| ScheduleError::UnknownFrequency { code: s.to_string() })?
        };
        let freq = match unit {
            "H" => Frequency::Hours(step),
            "D" => Frequency::Days(step),
            "W" => Frequency::Weeks(step),
            "MS" => Frequency::MonthStart(step),
            "ME" | "M" => Frequency::MonthEnd(step),
            _ => return Err(ScheduleError::UnknownFrequency { code: s.to_string() }),
        };
        freq.validate()?;
        Ok(freq)
    }
}

// ---- Calendar helpers ----

pub(crate) fn first_of_month(date: NaiveDate) -> ScheduleResult<NaiveDate> {
    date.with_day(1).ok_or(ScheduleError::DateOutOfRange)
}

pub(crate) fn last_of_month(date: NaiveDate) -> ScheduleResult<NaiveDate> {
    let next = first_of_month(date)?
        .checked_add_months(Months::new(1))
        .ok_or(ScheduleError::DateOutOfRange)?;
    next.pred_opt().ok_or(ScheduleError::DateOutOfRange)
}

/// Number of calendar days in the month containing `date`.
pub(crate) fn days_in_month(date: NaiveDate) -> ScheduleResult<u32> {
    Ok(last_of_month(date)?.day())
}

/// Shift `date` by a signed number of calendar months, clamping the day of
/// month as chrono does.
pub(crate) fn shift_months(date: NaiveDate, shift: i32) -> ScheduleResult<NaiveDate> {
    let months = Months::new(shift.unsigned_abs());
    let shifted =
        if shift >= 0 { date.checked_add_months(months) } else { date.checked_sub_months(months) };
    shifted.ok_or(ScheduleError::DateOutOfRange)
}

fn fixed_steps(
    start: NaiveDateTime, end: NaiveDateTime, step: TimeDelta,
) -> ScheduleResult<Vec<NaiveDateTime>> {
    let mut grid = Vec::new();
    let mut current = start;
    while current <= end {
        grid.push(current);
        current = current.checked_add_signed(step).ok_or(ScheduleError::DateOutOfRange)?;
    }
    Ok(grid)
}

fn month_anchors(
    start: NaiveDateTime, end: NaiveDateTime, step: u32,
    anchor: fn(NaiveDate) -> ScheduleResult<NaiveDate>,
) -> ScheduleResult<Vec<NaiveDateTime>> {
    let mut month = first_of_month(start.date())?;
    let mut candidate = anchor(month)?.and_time(NaiveTime::MIN);
    if candidate < start {
        month = month.checked_add_months(Months::new(1)).ok_or(ScheduleError::DateOutOfRange)?;
        candidate = anchor(month)?.and_time(NaiveTime::MIN);
    }
    let mut grid = Vec::new();
    while candidate <= end {
        grid.push(candidate);
        month = month.checked_add_months(Months::new(step)).ok_or(ScheduleError::DateOutOfRange)?;
        candidate = anchor(month)?.and_time(NaiveTime::MIN);
    }
    Ok(grid)
}
