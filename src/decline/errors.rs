//! Errors for decline-curve fitting, forecasting, and percentile banding.
//!
//! [`DeclineError`] is the single failure type of the `decline` module. It
//! wraps lower layers ([`ScheduleError`], [`OptError`]) through `From` so
//! pipeline code can use `?` throughout, and converts to a Python
//! `ValueError` at the PyO3 boundary.
//!
//! ## Conventions
//! - Counts refer to *usable* samples: inside the calibration window, at or
//!   after the reference date, with a finite strictly positive rate.
//! - [`DeclineError::Convergence`] is recoverable; `fit` catches it and
//!   keeps the linear estimate.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{optimization::errors::OptError, schedule::ScheduleError};

/// Result alias for decline operations.
pub type DeclineResult<T> = Result<T, DeclineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DeclineError {
    // ---- Input/data validation ----
    /// Fewer usable samples than the operation needs.
    InsufficientData { found: usize, required: usize },

    /// Timestamp and rate columns differ in length.
    LengthMismatch { timestamps: usize, rates: usize },

    /// Calibration windows select no observation.
    EmptyWindow,

    // ---- Regression ----
    /// All usable samples share one elapsed time, so the slope is undefined.
    DegenerateRegression { n: usize },

    /// Nonlinear refinement stopped without converging.
    Convergence { status: String, iterations: usize },

    // ---- Model parameters ----
    /// Arps exponent outside `[0, 1]` or not finite.
    InvalidExponent { value: f64 },

    /// A rate, decline, or economic limit that must be finite and positive is not.
    InvalidParameter { name: &'static str, value: f64 },

    /// Unrecognized decline mode name.
    UnknownMode { name: String },

    /// Percentile outside the open interval `(0, 100)`.
    InvalidPercentile { value: f64 },

    // ---- Wrapped layers ----
    Schedule(ScheduleError),
    Optimization(OptError),
}

impl std::error::Error for DeclineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeclineError::Schedule(e) => Some(e),
            DeclineError::Optimization(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeclineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            DeclineError::InsufficientData { found, required } => {
                write!(f, "Need at least {required} usable samples, found {found}.")
            }
            DeclineError::LengthMismatch { timestamps, rates } => {
                write!(f, "Got {timestamps} timestamps but {rates} rates.")
            }
            DeclineError::EmptyWindow => {
                write!(f, "Calibration window selects no observations.")
            }
            // ---- Regression ----
            DeclineError::DegenerateRegression { n } => {
                write!(f, "All {n} calibration samples share the same elapsed time.")
            }
            DeclineError::Convergence { status, iterations } => {
                write!(f, "Refinement did not converge after {iterations} iterations: {status}")
            }
            // ---- Model parameters ----
            DeclineError::InvalidExponent { value } => {
                write!(f, "Decline exponent must lie in [0, 1]; got: {value}")
            }
            DeclineError::InvalidParameter { name, value } => {
                write!(f, "{name} must be finite and > 0; got: {value}")
            }
            DeclineError::UnknownMode { name } => {
                write!(
                    f,
                    "Unknown decline mode '{name}'; expected exponential, hyperbolic, or harmonic."
                )
            }
            DeclineError::InvalidPercentile { value } => {
                write!(f, "Percentile must lie strictly between 0 and 100; got: {value}")
            }
            // ---- Wrapped layers ----
            DeclineError::Schedule(e) => write!(f, "Schedule error: {e}"),
            DeclineError::Optimization(e) => write!(f, "Optimizer error: {e}"),
        }
    }
}

impl From<ScheduleError> for DeclineError {
    fn from(err: ScheduleError) -> Self {
        DeclineError::Schedule(err)
    }
}

impl From<OptError> for DeclineError {
    fn from(err: OptError) -> Self {
        DeclineError::Optimization(err)
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<DeclineError> for PyErr {
    fn from(err: DeclineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
