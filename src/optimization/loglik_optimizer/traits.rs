//! Objective trait, solver options, and the normalized solver outcome.
//!
//! Callers describe a function to **maximize**, `ℓ(θ)`; the adapter turns it
//! into the cost `-ℓ(θ)` that `argmin` minimizes. Analytic gradients are
//! gradients of `ℓ`, not of the cost.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Objective maximized by [`maximize`](super::maximize).
///
/// `check` runs once on the start point before any iteration. `grad` is
/// optional; returning `GradientNotImplemented` switches the adapter to
/// finite differences. Invalid inputs must come back as `OptError`, never
/// as a panic.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS. Parses case-insensitively from
/// `"MoreThuente"` / `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver configuration.
///
/// `verbose` only has an effect with the `obs_slog` feature. `lbfgs_mem`
/// falls back to [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM) and must
/// not be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::default(),
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules. Any may be `None`, but not all three.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Default for Tolerances {
    /// `tol_grad = 1e-6`, `tol_cost = None`, `max_iter = 300`.
    fn default() -> Self {
        Self { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) }
    }
}

impl Tolerances {
    /// # Errors
    /// - `NoTolerancesProvided` when every field is `None`.
    /// - `InvalidTolGrad` / `InvalidTolCost` for non-finite or non-positive values.
    /// - `InvalidMaxIter` for `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of a [`maximize`](super::maximize) run.
///
/// `value` is the objective `ℓ(θ̂)`, not the cost. `converged` is false when
/// the solver never terminated or ran out of iterations; `fn_evals` carries
/// `argmin`'s counters (`cost_count`, `gradient_count`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// # Errors
    /// `MissingThetaHat`, `InvalidThetaHat`, or `NonFiniteCost` from validation.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                (false, "Maximum iterations reached".to_string())
            }
            other => (true, format!("{other:?}")),
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Tolerance validation and the `Default` configuration.
    // - Case-insensitive line-search parsing.
    // - Mapping of termination statuses into `OptimOutcome::converged`.
    //
    // They intentionally DO NOT cover:
    // - Running a solver (see `api` and the decline refiner tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure `Tolerances::new` rejects empty and non-positive settings.
    //
    // Given
    // -----
    // - All-`None`, a negative gradient tolerance, and `max_iter = 0`.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidTolGrad`, and `InvalidMaxIter` respectively.
    fn tolerances_reject_invalid_settings() {
        // Arrange / Act / Assert
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(Some(1e-6), None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Check that the default options match a validated construction.
    //
    // Given
    // -----
    // - `MLEOptions::default()`.
    //
    // Expect
    // ------
    // - Same tolerances as `Tolerances::new(Some(1e-6), None, Some(300))`,
    //   More–Thuente line search, and no L-BFGS memory override.
    fn default_options_are_valid() {
        // Arrange
        let expected = Tolerances::new(Some(1e-6), None, Some(300)).expect("valid tolerances");

        // Act
        let opts = MLEOptions::default();

        // Assert
        assert_eq!(opts.tols, expected);
        assert_eq!(opts.line_searcher, LineSearcher::MoreThuente);
        assert_eq!(opts.lbfgs_mem, None);
        assert!(MLEOptions::new(expected, LineSearcher::HagerZhang, false, Some(0)).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Verify case-insensitive line-search parsing.
    //
    // Given
    // -----
    // - `"hagerzhang"`, `"MORETHUENTE"`, and `"backtracking"`.
    //
    // Expect
    // ------
    // - Two matches and one `InvalidLineSearch`.
    fn line_searcher_parses_case_insensitively() {
        // Arrange / Act / Assert
        assert_eq!("hagerzhang".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MORETHUENTE".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!(matches!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Ensure exhausting the iteration budget is not reported as convergence.
    //
    // Given
    // -----
    // - Outcomes built with `SolverConverged` and `MaxItersReached`.
    //
    // Expect
    // ------
    // - Only the first reports `converged == true`.
    fn max_iters_reached_is_not_converged() {
        // Arrange
        let theta = array![0.5, -0.5];
        let converged = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let capped = TerminationStatus::Terminated(TerminationReason::MaxItersReached);

        // Act
        let ok = OptimOutcome::new(Some(theta.clone()), -1.0, converged, 12, FnEvalMap::new(), None)
            .expect("finite outcome");
        let cut = OptimOutcome::new(Some(theta), -1.0, capped, 300, FnEvalMap::new(), None)
            .expect("finite outcome");

        // Assert
        assert!(ok.converged);
        assert!(!cut.converged);
        assert_eq!(cut.status, "Maximum iterations reached");
    }
}
