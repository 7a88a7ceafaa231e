//! Input and output guards for the optimizer.
//!
//! Every check returns the first offending element so error messages point
//! at a concrete index rather than "something was NaN".
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::{Grad, Hessian, Theta},
};

fn check_positive_finite(tol: f64) -> Result<(), &'static str> {
    if !tol.is_finite() {
        Err("must be finite")
    } else if tol <= 0.0 {
        Err("must be strictly positive")
    } else {
        Ok(())
    }
}

/// Optional gradient-norm tolerance: `None` or finite and `> 0`.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) => check_positive_finite(tol).map_err(|reason| OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// Optional cost-change tolerance: `None` or finite and `> 0`.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) => check_positive_finite(tol).map_err(|reason| OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Parameter vector has the expected length and only finite entries.
pub fn validate_theta(theta: &Theta, expected: usize) -> OptResult<()> {
    if theta.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    match theta.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
        None => Ok(()),
    }
}

pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "gradient entries must be finite",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter, rejecting absent or non-finite
/// estimates.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "estimates must be finite",
        });
    }
    Ok(theta)
}

pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.dim() != (dim, dim) {
        return Err(OptError::HessianDimMismatch { expected: dim, found: hessian.dim() });
    }
    match hessian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover each guard's accept and reject branch. Solver-level
    // behavior is exercised through the ARIMAX fits.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Tolerances accept `None` and positive finite values only.
    //
    // Given
    // -----
    // - `None`, `1e-8`, `0.0`, `NaN`.
    //
    // Expect
    // ------
    // - The first two pass, the last two fail with `InvalidTolCost`.
    fn verify_tol_cost_accepts_only_positive_finite() {
        assert!(verify_tol_cost(None).is_ok());
        assert!(verify_tol_cost(Some(1e-8)).is_ok());
        assert!(matches!(verify_tol_cost(Some(0.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(verify_tol_cost(Some(f64::NAN)), Err(OptError::InvalidTolCost { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Length and finiteness of θ are both enforced, with the offending index
    // reported.
    //
    // Given
    // -----
    // - A length-2 vector checked against 3, and [0, ∞, 1] against 3.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch`, then `InvalidThetaInput { index: 1, .. }`.
    fn validate_theta_reports_length_and_first_bad_index() {
        // Act
        let short = validate_theta(&array![0.0, 1.0], 3);
        let bad = validate_theta(&array![0.0, f64::INFINITY, 1.0], 3);

        // Assert
        assert_eq!(short, Err(OptError::ThetaLengthMismatch { expected: 3, actual: 2 }));
        assert!(matches!(bad, Err(OptError::InvalidThetaInput { index: 1, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Hessian validation catches wrong shapes and NaN entries.
    //
    // Given
    // -----
    // - A 2×3 matrix checked against dim 2; a 2×2 matrix with NaN at (1, 0).
    //
    // Expect
    // ------
    // - `HessianDimMismatch` and `InvalidHessian { row: 1, col: 0, .. }`.
    fn validate_hessian_rejects_shape_and_nan() {
        // Arrange
        let wide = Array2::<f64>::zeros((2, 3));
        let nan = array![[1.0, 0.0], [f64::NAN, 1.0]];

        // Act / Assert
        assert!(matches!(validate_hessian(&wide, 2), Err(OptError::HessianDimMismatch { .. })));
        assert!(matches!(
            validate_hessian(&nan, 2),
            Err(OptError::InvalidHessian { row: 1, col: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `validate_theta_hat` unwraps good estimates and rejects NaN ones.
    //
    // Given
    // -----
    // - `Some([0.5])` and `Some([NaN])`.
    //
    // Expect
    // ------
    // - The first returns the vector; the second yields `InvalidThetaHat`.
    fn validate_theta_hat_unwraps_finite_estimate() {
        assert_eq!(validate_theta_hat(Some(array![0.5])), Ok(array![0.5]));
        assert!(matches!(
            validate_theta_hat(Some(array![f64::NAN])),
            Err(OptError::InvalidThetaHat { index: 0, .. })
        ));
    }
}
