//! Executor wiring shared by both line-search variants.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, IterState, Solver, State};
use argmin_math::ArgminL2Norm;

/// Run `solver` on `problem` from `theta0` and normalize the final state.
///
/// `opts.tols.max_iter` becomes the executor's iteration cap. With
/// `opts.verbose`, the starting objective is logged at debug level, and with
/// the `obs_slog` feature a terminal observer reports every iteration.
///
/// The reported `value` is the objective `ℓ(θ̂)`, i.e. the negated best cost.
///
/// # Errors
/// - Any `argmin` runtime failure (line search, objective error), mapped into `OptError`.
/// - Validation errors from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut state = optimizer.run()?.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    let outcome = OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )?;
    log::debug!(
        "L-BFGS finished after {} iterations: {} (objective {:.6e})",
        outcome.iterations,
        outcome.status,
        outcome.value
    );
    Ok(outcome)
}

// ---- Helper Methods ----

fn log_initial_state<F: LogLikelihood>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) {
    match problem.cost(theta0) {
        Ok(cost) => {
            let grad_norm = problem.gradient(theta0).ok().map(|g| g.l2_norm());
            log::debug!("L-BFGS start: objective = {:.6e}, |grad| = {:?}", -cost, grad_norm);
        }
        Err(err) => log::debug!("L-BFGS start: objective not evaluable ({err})"),
    }
}
