//! inference::hessian — parameter covariance from an information matrix.
//!
//! Purpose
//! -------
//! Invert the observed information `J(θ̂) = −∇²ℓ(θ̂)` of a maximum
//! likelihood fit into a covariance matrix for `θ̂`, tolerating weakly
//! identified directions.
//!
//! Key behaviors
//! -------------
//! - Symmetric eigendecomposition `J = Q Λ Qᵀ`; eigenvalues `λ ≤ EIGEN_EPS`
//!   are dropped, giving the Moore–Penrose pseudo-inverse `J⁺`.
//! - [`observed_information`] turns a Hessian of the *average*
//!   log-likelihood into `J` on the total-likelihood scale.
//!
//! Conventions
//! -----------
//! - Dropped eigen-directions contribute zero variance, not infinity.
//!   Callers that need to flag weak identification should inspect
//!   [`PseudoInverse::dropped`].
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::{EIGEN_EPS, symmetrize},
    regression::least_squares::{from_dmatrix, to_dmatrix},
};
use ndarray::{Array1, Array2};

/// Pseudo-inverse of a symmetric matrix and the number of directions that
/// were truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoInverse {
    pub matrix: Array2<f64>,
    pub dropped: usize,
}

/// `J = −m · H̄` for a Hessian `H̄` of the average log-likelihood over `m`
/// observations.
pub fn observed_information(avg_hessian: &Array2<f64>, m: usize) -> Array2<f64> {
    avg_hessian * -(m as f64)
}

/// Covariance `J⁺` of the MLE.
///
/// # Errors
/// - `ShapeMismatch` for a non-square input.
/// - `Anyhow` if the information matrix contains non-finite values.
pub fn covariance_from_information(info: &Array2<f64>) -> InferenceResult<PseudoInverse> {
    let (r, c) = info.dim();
    if r != c {
        return Err(InferenceError::ShapeMismatch {
            what: "information matrix",
            expected: (r, r),
            found: (r, c),
        });
    }
    if info.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::Anyhow("information matrix has non-finite entries".into()));
    }

    let mut sym = info.clone();
    symmetrize(&mut sym);
    let eigen = to_dmatrix(&sym).symmetric_eigen();
    let q = &eigen.eigenvectors;

    let mut inv = nalgebra::DMatrix::<f64>::zeros(r, r);
    let mut dropped = 0;
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            dropped += 1;
            continue;
        }
        let col = q.column(k);
        inv += (col * col.transpose()) / lambda;
    }
    Ok(PseudoInverse { matrix: from_dmatrix(&inv), dropped })
}

/// Square roots of the covariance diagonal. Negative round-off is clamped
/// to zero.
pub fn standard_errors(cov: &Array2<f64>) -> Array1<f64> {
    cov.diag().mapv(|v| v.max(0.0).sqrt())
}
