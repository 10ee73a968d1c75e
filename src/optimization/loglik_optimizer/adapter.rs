//! Bridge from [`LogLikelihood`] to `argmin`'s minimization traits.
//!
//! `argmin` minimizes, so the adapter exposes `c(θ) = -ℓ(θ)`. For
//! least-squares fits where `ℓ = -½·SSE` the cost is simply `½·SSE`.
//! Analytic gradients are negated; when the objective has none, the cost
//! closure is differenced directly.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_value},
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Cost closure for `finitediff`: records the first failure and yields `NaN`.
    fn recording_cost<'s>(
        &'s self, slot: &'s RefCell<Option<Error>>,
    ) -> impl Fn(&Theta) -> f64 + 's {
        move |theta: &Theta| match self.cost(theta) {
            Ok(val) => val,
            Err(err) => {
                slot.borrow_mut().get_or_insert(err);
                f64::NAN
            }
        }
    }
}

impl<F: LogLikelihood> CostFunction for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        validate_value(value)?;
        Ok(-value)
    }
}

impl<F: LogLikelihood> Gradient for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Negated analytic gradient when available.
    ///
    /// Otherwise central differences of the cost; if an evaluation failed or the
    /// result is not finite, one forward-difference retry whose errors are
    /// surfaced.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let slot: RefCell<Option<Error>> = RefCell::new(None);
                let cost_fn = self.recording_cost(&slot);
                let central = theta.central_diff(&cost_fn);
                let eval_failed = slot.borrow().is_some();
                if !eval_failed && validate_grad(&central, theta.len()).is_ok() {
                    return Ok(central);
                }
                Ok(run_fd_diff(theta, &cost_fn, &slot)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
