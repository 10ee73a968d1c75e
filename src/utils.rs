//! Conversion helpers shared by the PyO3 bindings in `lib.rs`.
#[cfg(feature = "python-bindings")]
use chrono::NaiveDate;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    decline::{
        core::{FitOptions, ModeOrExponent, RefineOptions},
        errors::DeclineError,
    },
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    schedule::{Inclusive, TimeWindow},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a contiguous float64 ndarray, a pandas Series, or any float sequence.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Rates as an owned vector, via [`extract_f64_array`].
#[cfg(feature = "python-bindings")]
pub fn extract_rates<'py>(py: Python<'py>, raw_data: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err("rates must be a 1-D contiguous float64 array or sequence")
    })?;
    Ok(slice.to_vec())
}

/// `mode_or_exponent` from Python: a float exponent or a mode name.
#[cfg(feature = "python-bindings")]
pub fn extract_mode(raw: &Bound<'_, PyAny>) -> PyResult<ModeOrExponent> {
    if let Ok(b) = raw.extract::<f64>() {
        return Ok(ModeOrExponent::Exponent(b));
    }
    let name: String = raw.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "mode_or_exponent must be a float in [0, 1] or one of 'exponential', 'hyperbolic', 'harmonic'",
        )
    })?;
    Ok(name.parse::<ModeOrExponent>()?)
}

/// Calibration windows from `(start, end[, inclusive])` tuples; the policy
/// defaults to `"both"`.
#[cfg(feature = "python-bindings")]
pub fn extract_windows(
    windows: Option<Vec<(NaiveDate, NaiveDate, Option<String>)>>,
) -> PyResult<Vec<TimeWindow>> {
    let Some(windows) = windows else {
        return Ok(Vec::new());
    };
    windows
        .into_iter()
        .map(|(start, end, inclusive)| {
            let policy = match inclusive.as_deref() {
                Some(name) => name.parse::<Inclusive>().map_err(DeclineError::from)?,
                None => Inclusive::Both,
            };
            Ok(TimeWindow::new(start, end, policy).map_err(DeclineError::from)?)
        })
        .collect()
}

/// Fit options from the flat keyword arguments of `DeclineFit`.
#[cfg(feature = "python-bindings")]
pub fn extract_fit_options(
    reference: Option<chrono::NaiveDateTime>, refine: bool, tol_grad: Option<f64>,
    tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
    lbfgs_mem: Option<usize>,
) -> PyResult<FitOptions> {
    let refine = if refine {
        let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
        Some(RefineOptions::new(mle_opts))
    } else {
        None
    };
    Ok(FitOptions::new(reference, refine))
}

#[cfg(feature = "python-bindings")]
fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    let defaults = Tolerances::default();
    let tols = Tolerances::new(
        tol_grad.or(defaults.tol_grad),
        tol_cost,
        max_iter.or(defaults.max_iter),
    )
    .map_err(DeclineError::from)?;

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(DeclineError::from)?,
        None => LineSearcher::MoreThuente,
    };

    let opts = MLEOptions::new(tols, ls, false, lbfgs_mem).map_err(DeclineError::from)?;

    Ok(opts)
}
