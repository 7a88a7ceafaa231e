//! inference::sandwich — coefficient covariance estimators for OLS.
//!
//! Purpose
//! -------
//! Map a fitted least-squares design `(X, e, (X'X)⁻¹)` into a `k × k`
//! covariance for `β̂` under the classical, White (HC0–HC3), or
//! Newey–West (HAC) assumptions.
//!
//! Key behaviors
//! -------------
//! - Every robust form is `A M A` with bread `A = (X'X)⁻¹`.
//! - Meats:
//!   - HC0: `Σ e_i² x_i x_iᵀ`
//!   - HC1: HC0 scaled by `n / (n − k)`
//!   - HC2: `e_i² / (1 − h_i)`
//!   - HC3: `e_i² / (1 − h_i)²`
//!   - HAC: `n · S`, with `S` the long-run covariance of `x_i e_i`
//!     from [`calculate_avg_scores_cov`].
//! - Leverages `h_i = x_iᵀ A x_i` at or numerically near one are rejected,
//!   since HC2/HC3 are undefined there.
//!
//! Conventions
//! -----------
//! - `X` is the design exactly as fitted, intercept column included.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    hac::{HACOptions, calculate_avg_scores_cov},
};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

const LEVERAGE_TOL: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CovarianceType {
    Classical,
    HC0,
    HC1,
    HC2,
    #[default]
    HC3,
    HAC,
}

impl fmt::Display for CovarianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CovarianceType::Classical => "nonrobust",
            CovarianceType::HC0 => "HC0",
            CovarianceType::HC1 => "HC1",
            CovarianceType::HC2 => "HC2",
            CovarianceType::HC3 => "HC3",
            CovarianceType::HAC => "HAC",
        };
        f.write_str(label)
    }
}

/// Inputs shared by every estimator.
#[derive(Debug, Clone, Copy)]
pub struct OlsDesign<'a> {
    pub x: &'a Array2<f64>,
    pub residuals: &'a Array1<f64>,
    pub xtx_inv: &'a Array2<f64>,
    /// Unbiased residual variance, used by the classical estimator.
    pub sigma2: f64,
}

/// Covariance of `β̂` under `kind`.
///
/// # Errors
/// - `ShapeMismatch` when `X`, `e`, and `A` disagree.
/// - `LeverageOne` for HC2/HC3 with `h_i ≈ 1`.
/// - Any HAC aggregation error.
pub fn ols_covariance(
    kind: CovarianceType, design: OlsDesign<'_>, hac: &HACOptions,
) -> InferenceResult<Array2<f64>> {
    let (n, k) = design.x.dim();
    check_shapes(&design, n, k)?;
    let bread = design.xtx_inv;

    let meat = match kind {
        CovarianceType::Classical => return Ok(bread * design.sigma2),
        CovarianceType::HC0 => weighted_meat(design.x, &design.residuals.mapv(|e| e * e)),
        CovarianceType::HC1 => {
            let scale = if n > k { n as f64 / (n - k) as f64 } else { f64::NAN };
            weighted_meat(design.x, &design.residuals.mapv(|e| e * e)) * scale
        }
        CovarianceType::HC2 | CovarianceType::HC3 => {
            let power = if kind == CovarianceType::HC2 { 1 } else { 2 };
            let h = leverages(design.x, bread);
            let mut w = Array1::zeros(n);
            for i in 0..n {
                let one_minus = 1.0 - h[i];
                if one_minus <= LEVERAGE_TOL {
                    return Err(InferenceError::LeverageOne { index: i, leverage: h[i] });
                }
                w[i] = design.residuals[i].powi(2) / one_minus.powi(power);
            }
            weighted_meat(design.x, &w)
        }
        CovarianceType::HAC => {
            let scores = design.x * &design.residuals.view().insert_axis(Axis(1));
            calculate_avg_scores_cov(hac, &scores)? * n as f64
        }
    };
    Ok(bread.dot(&meat).dot(bread))
}

/// Diagonal of the hat matrix, `h_i = x_iᵀ (X'X)⁻¹ x_i`.
pub fn leverages(x: &Array2<f64>, xtx_inv: &Array2<f64>) -> Array1<f64> {
    let xa = x.dot(xtx_inv);
    (&xa * x).sum_axis(Axis(1))
}

// ---- Helper methods ----

/// `Xᵀ diag(w) X`.
fn weighted_meat(x: &Array2<f64>, w: &Array1<f64>) -> Array2<f64> {
    let wx = x * &w.view().insert_axis(Axis(1));
    x.t().dot(&wx)
}

fn check_shapes(design: &OlsDesign<'_>, n: usize, k: usize) -> InferenceResult<()> {
    if design.residuals.len() != n {
        return Err(InferenceError::ShapeMismatch {
            what: "residuals",
            expected: (n, 1),
            found: (design.residuals.len(), 1),
        });
    }
    if design.xtx_inv.dim() != (k, k) {
        return Err(InferenceError::ShapeMismatch {
            what: "bread",
            expected: (k, k),
            found: design.xtx_inv.dim(),
        });
    }
    if n == 0 {
        return Err(InferenceError::EmptyScores);
    }
    Ok(())
}
