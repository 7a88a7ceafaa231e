//! Public surface of the optimizer: the [`LogLikelihood`] trait, solver
//! configuration, and the normalized [`OptimOutcome`].
//!
//! We *maximize* `ℓ(θ)` by handing Argmin the cost `c(θ) = -ℓ(θ)`. Analytic
//! gradients, when a model supplies one, are gradients of `ℓ`; the adapter
//! takes care of the sign.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        types::{FnEvalMap, Grad, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Model-side log-likelihood.
///
/// `value` and `check` are required. `grad` is optional; the default
/// returns [`OptError::GradientNotImplemented`] which routes the solver to
/// finite differences of the cost.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64>;
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
        match s.trim().to_ascii_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "expected 'MoreThuente' or 'HagerZhang' (case insensitive)",
            }),
        }
    }
}

/// Solver configuration.
///
/// Default: `tol_grad = 1e-6`, no cost tolerance, `max_iter = 300`,
/// More–Thuente line search, L-BFGS memory 7.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(0) = lbfgs_mem {
            return Err(OptError::InvalidLBFGSMem { mem: 0, reason: "memory must be at least 1" });
        }
        Ok(Self { tols, line_searcher, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules. At least one field must be `Some`; provided tolerances
/// must be finite and strictly positive, and `max_iter` must be positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if let Some(0) = max_iter {
            return Err(OptError::InvalidMaxIter { max_iter: 0, reason: "must be at least 1" });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// What `maximize` hands back.
///
/// `value` is the best **log-likelihood** (not the cost). `converged` is
/// false when the solver never terminated or stopped on the iteration cap;
/// `status` carries the raw termination reason either way.
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
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                (false, format!("{termination:?}"))
            }
            other => (true, format!("{other:?}")),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
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
    // - Tolerance and option validation.
    // - Line-search parsing.
    // - Outcome normalization from raw solver state.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Empty stopping rules and non-positive tolerances are rejected.
    //
    // Given
    // -----
    // - All-`None` tolerances, a negative gradient tolerance, zero max_iter.
    //
    // Expect
    // ------
    // - The matching `OptError` variant for each.
    fn tolerances_new_rejects_invalid_settings() {
        // Act / Assert
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Line search names parse regardless of case and unknown names fail.
    //
    // Given
    // -----
    // - "hagerzhang", "MORETHUENTE", "backtracking".
    //
    // Expect
    // ------
    // - The two known names parse; the third yields `InvalidLineSearch`.
    fn line_searcher_parses_case_insensitively() {
        // Act / Assert
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
    // A terminated run is reported as converged with the status string and
    // the gradient norm.
    //
    // Given
    // -----
    // - θ̂ = [1, 2], ℓ = -3, status `SolverConverged`, gradient [3, 4].
    //
    // Expect
    // ------
    // - `converged == true`, `grad_norm == Some(5)`.
    fn optim_outcome_new_maps_termination_and_grad_norm() {
        // Arrange
        let status = TerminationStatus::Terminated(TerminationReason::SolverConverged);

        // Act
        let out = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.0,
            status,
            12,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();

        // Assert
        assert!(out.converged);
        assert_eq!(out.iterations, 12);
        assert_eq!(out.grad_norm, Some(5.0));
        assert!(out.status.contains("SolverConverged"));
    }

    #[test]
    // Purpose
    // -------
    // A missing estimate is an error, not a silent default.
    //
    // Given
    // -----
    // - `theta_hat = None`.
    //
    // Expect
    // ------
    // - `OptError::MissingThetaHat`.
    fn optim_outcome_new_requires_theta_hat() {
        // Act
        let out = OptimOutcome::new(
            None,
            0.0,
            TerminationStatus::NotTerminated,
            0,
            FnEvalMap::new(),
            None,
        );

        // Assert
        assert_eq!(out, Err(OptError::MissingThetaHat));
    }
}
