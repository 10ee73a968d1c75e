//! Errors for calendar indexing, windowing, and synthetic date grids.
//!
//! [`ScheduleError`] covers empty indices, malformed intervals and
//! frequencies, length mismatches when aligning parallel columns, and
//! calendar arithmetic that would leave chrono's representable range.
use chrono::NaiveDateTime;

/// Result alias for schedule operations that may produce [`ScheduleError`].
pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    // ---- Index ----
    /// Operation needs at least one timestamp.
    EmptyIndex,

    /// A parallel column does not match the index length.
    LengthMismatch { expected: usize, found: usize },

    // ---- Intervals and frequencies ----
    /// Interval start falls after its end.
    InvalidInterval { start: NaiveDateTime, end: NaiveDateTime },

    /// Frequency step must be at least one unit.
    InvalidFrequency { step: u32, reason: &'static str },

    /// Frequency code could not be parsed.
    UnknownFrequency { code: String },

    /// Inclusive policy name could not be parsed.
    UnknownInclusive { name: String },

    // ---- Calendar arithmetic ----
    /// Date arithmetic overflowed the supported calendar range.
    DateOutOfRange,
}

impl std::error::Error for ScheduleError {}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Index ----
            ScheduleError::EmptyIndex => write!(f, "Time index is empty"),
            ScheduleError::LengthMismatch { expected, found } => {
                write!(f, "Length mismatch: index has {expected} entries, column has {found}")
            }

            // ---- Intervals and frequencies ----
            ScheduleError::InvalidInterval { start, end } => {
                write!(f, "Invalid interval: start {start} is after end {end}")
            }
            ScheduleError::InvalidFrequency { step, reason } => {
                write!(f, "Invalid frequency step {step}: {reason}")
            }
            ScheduleError::UnknownFrequency { code } => {
                write!(
                    f,
                    "Unknown frequency '{code}': expected e.g. 'D', '7D', '6H', '2W', 'MS', or 'ME'"
                )
            }
            ScheduleError::UnknownInclusive { name } => {
                write!(
                    f,
                    "Unknown inclusive policy '{name}': expected 'both', 'left', 'right', or 'neither'"
                )
            }

            // ---- Calendar arithmetic ----
            ScheduleError::DateOutOfRange => {
                write!(f, "Date arithmetic left the supported calendar range")
            }
        }
    }
}
