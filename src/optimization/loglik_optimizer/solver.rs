//! L-BFGS construction and execution, plus the [`maximize`] entry point.
//!
//! Builders only apply tolerances and memory; the initial parameter and the
//! iteration cap are runtime concerns applied in [`run_lbfgs`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        adapter::ArgMinAdapter,
        traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome},
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};
use argmin::{
    core::{Executor, IterState, Solver, State},
    solver::quasinewton::LBFGS,
};

/// Maximize `ℓ(θ)` from `theta0`.
///
/// Runs `f.check` once, wraps `(f, data)` in an [`ArgMinAdapter`], and
/// dispatches on `opts.line_searcher`.
///
/// # Errors
/// Anything raised by `check`, by solver configuration, or during the run
/// (including model errors raised inside `value`), as [`OptError`](crate::optimization::errors::OptError).
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver: LbfgsMoreThuente =
                configure_lbfgs(LBFGS::new(MoreThuenteLS::new(), mem), opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver: LbfgsHagerZhang =
                configure_lbfgs(LBFGS::new(HagerZhangLS::new(), mem), opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

/// Apply the optional gradient and cost-change tolerances.
fn configure_lbfgs<L>(
    mut lbfgs: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(tol) = opts.tols.tol_grad {
        lbfgs = lbfgs.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        lbfgs = lbfgs.with_tolerance_cost(tol)?;
    }
    Ok(lbfgs)
}

/// Execute a configured solver and normalize its final state.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    let mut executor = Executor::new(problem, solver).configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        executor = executor.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{errors::OptError, loglik_optimizer::traits::Tolerances};
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of the maximizer of a concave toy likelihood with both line
    //   searches.
    // - `check` failures short-circuiting before the solver starts.
    // -------------------------------------------------------------------------

    /// Gaussian log-likelihood in the mean only, unit variance.
    struct MeanOnly;

    impl LogLikelihood for MeanOnly {
        type Data = Array1<f64>;

        fn value(&self, theta: &Theta, data: &Array1<f64>) -> OptResult<f64> {
            Ok(-0.5 * data.mapv(|x| (x - theta[0]).powi(2)).sum())
        }

        fn check(&self, theta: &Theta, _data: &Array1<f64>) -> OptResult<()> {
            if theta.len() != 1 {
                return Err(OptError::ThetaLengthMismatch { expected: 1, actual: theta.len() });
            }
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches drive θ to the sample mean.
    //
    // Given
    // -----
    // - Data [1, 2, 3, 6] (mean 3) and θ₀ = 0.
    //
    // Expect
    // ------
    // - θ̂ ≈ 3 within 1e-4 and ℓ(θ̂) = -0.5 Σ (x - 3)² = -7.
    fn maximize_recovers_sample_mean_with_both_line_searches() {
        // Arrange
        let data = array![1.0, 2.0, 3.0, 6.0];
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts = MLEOptions::new(
                Tolerances::new(Some(1e-8), None, Some(200)).unwrap(),
                ls,
                None,
            )
            .unwrap();

            // Act
            let out = maximize(&MeanOnly, array![0.0], &data, &opts).unwrap();

            // Assert
            assert_relative_eq!(out.theta_hat[0], 3.0, epsilon = 1e-4);
            assert_relative_eq!(out.value, -7.0, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // A failing `check` is returned without running the solver.
    //
    // Given
    // -----
    // - θ₀ of length 2 for a one-parameter model.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch`.
    fn maximize_propagates_check_failure() {
        // Act
        let out = maximize(&MeanOnly, array![0.0, 0.0], &array![1.0], &MLEOptions::default());

        // Assert
        assert_eq!(out, Err(OptError::ThetaLengthMismatch { expected: 1, actual: 2 }));
    }
}
