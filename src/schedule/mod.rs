//! schedule — calendar-to-elapsed-time conversion, windows, and date grids.
//!
//! Purpose
//! -------
//! Bridge calendar timestamps and the elapsed-day axis the decline models
//! work on. Fitting uses this layer to select calibration windows and to
//! compute time offsets from a reference date; forecasting uses it to build
//! synthetic date grids.
//!
//! Key behaviors
//! -------------
//! - [`TimeIndex`]: sorted, stable index with elapsed-day offsets, selection
//!   masks, nearest lookup, month lengths, and cumulative-to-daily rates.
//! - [`TimeWindow`] + [`Inclusive`]: validated calendar intervals with an
//!   explicit boundary policy.
//! - [`Frequency`]: fixed-step and month-anchored grid expansion.
//!
//! Invariants & assumptions
//! ------------------------
//! - Window and threshold comparisons use calendar dates, never times of day.
//! - Elapsed time is measured in fractional days and may be negative.
//! - All types here are plain values; nothing holds shared state.
//!
//! Conventions
//! -----------
//! - Failures surface as [`ScheduleError`] through [`ScheduleResult`].
//! - Timestamps are `chrono::NaiveDateTime`; callers own any time-zone
//!   normalization before handing data to this layer.
//!
//! Downstream usage
//! ----------------
//! - `decline::core::observations` builds a [`TimeIndex`] per series and
//!   filters it with [`TimeIndex::between`].
//! - `decline::forecast` expands forecast ranges with [`TimeIndex::build`].

pub mod errors;
pub mod frequency;
pub mod index;
pub mod window;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{ScheduleError, ScheduleResult};
pub use self::frequency::Frequency;
pub use self::index::{TimeIndex, elapsed_days};
pub use self::window::{Inclusive, TimeWindow};
