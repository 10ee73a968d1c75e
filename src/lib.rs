//! rust_decline — Arps decline-curve analysis with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes decline fitting and forecasting to Python via the `_rust_decline`
//! extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`decline`, `schedule`, `optimization`,
//!   `inference`) as the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_decline` Python extension when `python-bindings` is enabled.
//! - Register the Python submodules (`decline_models`, `schedule`) under
//!   `rust_decline` so dotted imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file only converts
//!   inputs, dispatches, and maps errors.
//! - Python datetimes are naive; callers normalize time zones beforehand.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are converted to `PyErr` at the PyO3
//!   boundary through `From<DeclineError> for PyErr`.
//! - The crate never installs a logger; pipeline events go through the
//!   `log` facade and optimizer traces through the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should call [`decline::fit`], [`decline::run`], and
//!   [`decline::percentile`] directly.
//! - The Python packaging layer imports `_rust_decline` and wraps its
//!   classes in user-facing APIs.

pub mod decline;
pub mod inference;
pub mod optimization;
pub mod schedule;
pub mod utils;

#[cfg(feature = "python-bindings")]
use chrono::NaiveDateTime;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    decline::{
        core::ForecastOptions,
        errors::DeclineError,
        fit::{FitResult, fit},
        forecast::{DateSpec, run},
    },
    schedule::{Frequency, TimeIndex},
    utils::{extract_fit_options, extract_mode, extract_rates, extract_windows},
};

/// DeclineFit — Python-facing wrapper for a fitted decline model.
///
/// Constructed from Python via
/// `DeclineFit(timestamps, rates, mode_or_exponent="exponential", windows=None, ...)`:
/// - `timestamps`: sequence of naive `datetime.datetime`.
/// - `rates`: 1-D float array-like of the same length.
/// - `mode_or_exponent`: exponent in `[0, 1]` or a mode name.
/// - `windows`: optional list of `(start_date, end_date[, inclusive])`.
/// - `reference`: optional `datetime` mapped to `t = 0`.
/// - `refine` and the optimizer keywords enable least-squares refinement.
///
/// Fit diagnostics are exposed as read-only properties; `forecast`,
/// `forecast_range`, `percentile`, `producing_life`, and
/// `economic_reserves` delegate to the Rust model.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_decline.decline_models")]
pub struct DeclineFit {
    inner: FitResult,
}

#[cfg(feature = "python-bindings")]
impl DeclineFit {
    fn forecast_on(
        &self, spec: &DateSpec, with_cumulative: bool, economic_limit: Option<f64>,
    ) -> PyResult<(Vec<NaiveDateTime>, Vec<f64>, Option<Vec<f64>>)> {
        let opts = ForecastOptions::new(with_cumulative, economic_limit)?;
        let curve = run(&self.inner.model, spec, &opts)?;
        Ok((
            curve.dates().to_vec(),
            curve.rate().to_vec(),
            curve.cumulative().map(|c| c.to_vec()),
        ))
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl DeclineFit {
    #[new]
    #[pyo3(
        signature = (
            timestamps,
            rates,
            mode_or_exponent = None,
            windows = None,
            reference = None,
            refine = false,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
        ),
        text_signature = "(timestamps, rates, /, mode_or_exponent='exponential', windows=None, \
                          reference=None, refine=False, tol_grad=None, tol_cost=None, \
                          max_iter=None, line_searcher=None, lbfgs_mem=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, timestamps: Vec<NaiveDateTime>, rates: &Bound<'py, PyAny>,
        mode_or_exponent: Option<&Bound<'py, PyAny>>,
        windows: Option<Vec<(chrono::NaiveDate, chrono::NaiveDate, Option<String>)>>,
        reference: Option<NaiveDateTime>, refine: bool, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>,
    ) -> PyResult<Self> {
        let rates = extract_rates(py, rates)?;
        let mode = match mode_or_exponent {
            Some(raw) => extract_mode(raw)?,
            None => crate::decline::core::Regime::Exponential.into(),
        };
        let windows = extract_windows(windows)?;
        let opts = extract_fit_options(
            reference,
            refine,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
        )?;
        let inner = py.allow_threads(|| fit(&timestamps, &rates, &windows, mode, &opts))?;
        Ok(DeclineFit { inner })
    }

    #[getter]
    pub fn regime(&self) -> String {
        self.inner.regime().name().to_string()
    }

    #[getter]
    pub fn exponent(&self) -> f64 {
        self.inner.model.exponent()
    }

    #[getter]
    pub fn initial_rate(&self) -> f64 {
        self.inner.model.initial_rate()
    }

    #[getter]
    pub fn initial_decline(&self) -> f64 {
        self.inner.model.initial_decline()
    }

    #[getter]
    pub fn annual_decline(&self) -> f64 {
        self.inner.model.annual_decline()
    }

    #[getter]
    pub fn reference(&self) -> NaiveDateTime {
        self.inner.model.reference()
    }

    #[getter]
    pub fn r_squared(&self) -> f64 {
        self.inner.r_squared
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n
    }

    #[getter]
    pub fn refined(&self) -> bool {
        self.inner.refined.is_some()
    }

    /// `(slope, intercept, r_value, p_value, std_err, intercept_std_err)` of
    /// the linearized regression.
    #[getter]
    pub fn regression(&self) -> (f64, f64, f64, f64, f64, f64) {
        let r = &self.inner.linear.regression;
        (r.slope, r.intercept, r.r_value, r.p_value, r.std_err, r.intercept_std_err)
    }

    #[pyo3(
        signature = (dates, with_cumulative = true, economic_limit = None),
        text_signature = "(self, dates, /, with_cumulative=True, economic_limit=None)"
    )]
    pub fn forecast(
        &self, dates: Vec<NaiveDateTime>, with_cumulative: bool, economic_limit: Option<f64>,
    ) -> PyResult<(Vec<NaiveDateTime>, Vec<f64>, Option<Vec<f64>>)> {
        self.forecast_on(&DateSpec::Dates(dates), with_cumulative, economic_limit)
    }

    #[pyo3(
        signature = (start, end, freq = "D", with_cumulative = true, economic_limit = None),
        text_signature = "(self, start, end, /, freq='D', with_cumulative=True, economic_limit=None)"
    )]
    pub fn forecast_range(
        &self, start: NaiveDateTime, end: NaiveDateTime, freq: &str, with_cumulative: bool,
        economic_limit: Option<f64>,
    ) -> PyResult<(Vec<NaiveDateTime>, Vec<f64>, Option<Vec<f64>>)> {
        let frequency = freq.parse::<Frequency>().map_err(DeclineError::from)?;
        self.forecast_on(&DateSpec::range(start, end, frequency), with_cumulative, economic_limit)
    }

    /// `(initial_rate, initial_decline)` of the `pct`-th percentile curve.
    pub fn percentile(&self, pct: f64) -> PyResult<(f64, f64)> {
        let model = self.inner.percentile(pct)?;
        Ok((model.initial_rate(), model.initial_decline()))
    }

    pub fn producing_life(&self, economic_limit: f64) -> PyResult<f64> {
        Ok(self.inner.model.producing_life(economic_limit)?)
    }

    pub fn economic_reserves(&self, economic_limit: f64) -> PyResult<f64> {
        Ok(self.inner.model.economic_reserves(economic_limit)?)
    }
}

/// Synthetic date grid over `[start, end]` at a pandas-style frequency code.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (start, end, freq = "D"))]
fn build_index(start: NaiveDateTime, end: NaiveDateTime, freq: &str) -> PyResult<Vec<NaiveDateTime>> {
    let frequency = freq.parse::<Frequency>().map_err(DeclineError::from)?;
    Ok(TimeIndex::build(&[(start, end)], frequency).map_err(DeclineError::from)?)
}

/// _rust_decline — PyO3 module initializer for the Python extension.
///
/// Creates the `decline_models` and `schedule` submodules, attaches them to
/// the parent module, and registers them in `sys.modules` so they are
/// importable via dotted paths.
///
/// # Errors
/// `PyErr` if creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_decline<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let decline_models_mod = PyModule::new(_py, "decline_models")?;
    let schedule_mod = PyModule::new(_py, "schedule")?;
    register_decline_models(_py, m, &decline_models_mod)?;
    register_schedule(_py, m, &schedule_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_decline.decline_models", decline_models_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("rust_decline.schedule", schedule_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn register_decline_models<'py>(
    _py: Python, rust_decline: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<DeclineFit>()?;
    rust_decline.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn register_schedule<'py>(
    _py: Python, rust_decline: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_index, m)?)?;
    rust_decline.add_submodule(m)?;
    Ok(())
}
