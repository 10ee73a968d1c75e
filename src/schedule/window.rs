//! schedule::window — calendar windows with explicit boundary policies.
//!
//! Purpose
//! -------
//! Represent a closed, half-open, or open calendar interval used to select
//! observations for calibration and to describe forecast spans. Boundaries
//! are compared at **day granularity**: a timestamp at 18:00 on the end
//! date is on the boundary, not past it.
//!
//! Key behaviors
//! -------------
//! - [`Inclusive`] names the four boundary policies and is always passed
//!   explicitly; there is no implicit default at call sites that build masks.
//! - [`TimeWindow`] validates `start <= end` on construction and answers
//!   membership queries for single dates.
//!
//! Invariants & assumptions
//! ------------------------
//! - `TimeWindow::start() <= TimeWindow::end()` always holds.
//! - A window with `start == end` and `Inclusive::Both` contains exactly
//!   that day; under any other policy it is empty.
//!
//! Conventions
//! -----------
//! - `Left` includes the start date, `Right` includes the end date.
//! - Policy names parse case-insensitively from `"both"`, `"left"`,
//!   `"right"`, `"neither"`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover policy nesting on shared boundaries, parsing, and
//!   rejection of reversed windows.
use std::str::FromStr;

use chrono::NaiveDate;

use crate::schedule::errors::{ScheduleError, ScheduleResult};

/// Boundary policy for window and threshold masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inclusive {
    Both,
    Left,
    Right,
    Neither,
}

impl Inclusive {
    /// Whether the lower boundary is part of the window.
    pub fn includes_left(self) -> bool {
        matches!(self, Inclusive::Both | Inclusive::Left)
    }

    /// Whether the upper boundary is part of the window.
    pub fn includes_right(self) -> bool {
        matches!(self, Inclusive::Both | Inclusive::Right)
    }
}

impl FromStr for Inclusive {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" => Ok(Inclusive::Both),
            "left" => Ok(Inclusive::Left),
            "right" => Ok(Inclusive::Right),
            "neither" => Ok(Inclusive::Neither),
            _ => Err(ScheduleError::UnknownInclusive { name: s.to_string() }),
        }
    }
}

/// `TimeWindow` — validated calendar interval plus boundary policy.
///
/// Fields
/// ------
/// - `start`, `end`: calendar dates with `start <= end`.
/// - `inclusive`: which of the two boundaries belong to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
    inclusive: Inclusive,
}

impl TimeWindow {
    /// Build a window, rejecting `start > end`.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidInterval`] when `start` falls after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate, inclusive: Inclusive) -> ScheduleResult<Self> {
        if start > end {
            return Err(ScheduleError::InvalidInterval {
                start: start.and_time(chrono::NaiveTime::MIN),
                end: end.and_time(chrono::NaiveTime::MIN),
            });
        }
        Ok(Self { start, end, inclusive })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn inclusive(&self) -> Inclusive {
        self.inclusive
    }

    /// Membership test for a single calendar date.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let above = if self.inclusive.includes_left() { date >= self.start } else { date > self.start };
        let below = if self.inclusive.includes_right() { date <= self.end } else { date < self.end };
        above && below
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Boundary handling for each `Inclusive` policy.
    // - Case-insensitive parsing of policy names.
    // - Rejection of reversed windows.
    //
    // They intentionally DO NOT cover:
    // - Mask construction over full indices (see `schedule::index`).
    // -------------------------------------------------------------------------

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    // Purpose
    // -------
    // Check that each policy includes exactly the boundaries it names.
    //
    // Given
    // -----
    // - A window from 2020-01-10 to 2020-01-20 under all four policies.
    //
    // Expect
    // ------
    // - Interior dates are always included; each boundary only when the
    //   policy includes that side.
    fn contains_respects_each_boundary_policy() {
        // Arrange
        let (start, end) = (ymd(2020, 1, 10), ymd(2020, 1, 20));
        let policies = [Inclusive::Both, Inclusive::Left, Inclusive::Right, Inclusive::Neither];

        for policy in policies {
            // Act
            let window = TimeWindow::new(start, end, policy).expect("ordered window");

            // Assert
            assert!(window.contains(ymd(2020, 1, 15)));
            assert_eq!(window.contains(start), policy.includes_left());
            assert_eq!(window.contains(end), policy.includes_right());
            assert!(!window.contains(ymd(2020, 1, 9)));
            assert!(!window.contains(ymd(2020, 1, 21)));
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure a reversed window is rejected instead of silently selecting nothing.
    //
    // Given
    // -----
    // - `start` one day after `end`.
    //
    // Expect
    // ------
    // - `ScheduleError::InvalidInterval`.
    fn new_rejects_reversed_window() {
        // Arrange
        let (start, end) = (ymd(2020, 2, 2), ymd(2020, 2, 1));

        // Act
        let err = TimeWindow::new(start, end, Inclusive::Both).expect_err("reversed window");

        // Assert
        assert!(matches!(err, ScheduleError::InvalidInterval { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify case-insensitive policy parsing and the error for unknown names.
    //
    // Given
    // -----
    // - Mixed-case valid names and one invalid name.
    //
    // Expect
    // ------
    // - Valid names map to their variants; `"closed"` yields `UnknownInclusive`.
    fn inclusive_parses_case_insensitively() {
        // Arrange / Act / Assert
        assert_eq!("Both".parse::<Inclusive>(), Ok(Inclusive::Both));
        assert_eq!("LEFT".parse::<Inclusive>(), Ok(Inclusive::Left));
        assert_eq!("right".parse::<Inclusive>(), Ok(Inclusive::Right));
        assert_eq!("Neither".parse::<Inclusive>(), Ok(Inclusive::Neither));
        assert!(matches!(
            "closed".parse::<Inclusive>(),
            Err(ScheduleError::UnknownInclusive { .. })
        ));
    }
}
