//! inference::hac — kernel-weighted long-run covariance of per-observation
//! scores.
//!
//! Purpose
//! -------
//! Aggregate an `n × p` score matrix (rows are time) into the long-run
//! covariance of the *average* score,
//!
//! ```text
//! S  = Γ₀ + Σ_{k=1}^{L} w_k (Γ_k + Γ_kᵀ)
//! Γ₀ = (1/n) Σ_t s_t s_tᵀ
//! Γ_k = c_k Σ_{t>k} s_t s_{t−k}ᵀ
//! ```
//!
//! with `c_k = 1/(n − k)` under the Newey–West small-sample correction and
//! `c_k = 1/n` otherwise.
//!
//! Invariants & assumptions
//! ------------------------
//! - `n ≥ 1`; an empty matrix yields `InferenceError::EmptyScores`.
//! - The effective bandwidth is always truncated to `n − 1`.
//! - When `center` is set, the same demeaned matrix feeds both the plug-in
//!   bandwidth and the aggregation.
//!
//! Downstream usage
//! ----------------
//! - `inference::sandwich` multiplies `S` by `n` to form the HAC "meat"
//!   for OLS coefficients.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    kernel::KernelType,
};
use ndarray::{Array2, Axis, s};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Kernel, bandwidth, and scaling policy for HAC aggregation.
///
/// `bandwidth: None` selects the plug-in rule of
/// [`KernelType::optimal_bandwidth`] at compute time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HACOptions {
    pub kernel: KernelType,
    pub bandwidth: Option<usize>,
    pub center: bool,
    pub small_sample_correction: bool,
}

impl HACOptions {
    pub fn new(
        bandwidth: Option<usize>, kernel: KernelType, center: bool, small_sample_correction: bool,
    ) -> Self {
        Self { kernel, bandwidth, center, small_sample_correction }
    }
}

impl Default for HACOptions {
    /// Bartlett kernel, plug-in bandwidth, no centering, Newey–West scaling.
    fn default() -> Self {
        Self::new(None, KernelType::Bartlett, false, true)
    }
}

/// Long-run covariance of the average score.
///
/// # Errors
/// - `EmptyScores` when `scores` has no rows.
pub fn calculate_avg_scores_cov(
    opts: &HACOptions, scores: &Array2<f64>,
) -> InferenceResult<Array2<f64>> {
    let n = scores.nrows();
    if n == 0 {
        return Err(InferenceError::EmptyScores);
    }
    let series: Cow<Array2<f64>> = if opts.center {
        let mean = scores.mean_axis(Axis(0)).ok_or(InferenceError::EmptyScores)?;
        Cow::Owned(scores - &mean)
    } else {
        Cow::Borrowed(scores)
    };

    let requested = opts.bandwidth.unwrap_or_else(|| opts.kernel.optimal_bandwidth(&series));
    let lags = requested.min(n - 1);

    let mut cov = series.t().dot(series.as_ref()) / n as f64;
    for k in 1..=lags {
        let w = opts.kernel.weight(k as f64 / (lags as f64 + 1.0));
        if w == 0.0 {
            continue;
        }
        let scale = if opts.small_sample_correction { 1.0 / (n - k) as f64 } else { 1.0 / n as f64 };
        let lead = series.slice(s![k.., ..]);
        let lag = series.slice(s![..n - k, ..]);
        let gamma = lead.t().dot(&lag) * scale;
        cov = cov + (&gamma + &gamma.t()) * w;
    }
    Ok(cov)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the IID (OPG) limit, symmetry under a nontrivial
    // kernel, the centering no-op on mean-zero columns, and the empty-input
    // guard.
    // -------------------------------------------------------------------------

    fn sample_scores() -> Array2<f64> {
        array![[1.0, -0.5], [-0.5, 0.2], [0.8, 0.1], [-1.2, 0.4], [0.3, -0.6], [-0.4, 0.4]]
    }

    #[test]
    // Purpose
    // -------
    // With zero lags the estimator reduces to the outer-product average.
    //
    // Given
    // -----
    // - IID kernel on a 6×2 score matrix.
    //
    // Expect
    // ------
    // - S = SᵀS / n.
    fn iid_kernel_is_outer_product_average() {
        // Arrange
        let scores = sample_scores();
        let opts = HACOptions::new(None, KernelType::IID, false, true);

        // Act
        let cov = calculate_avg_scores_cov(&opts, &scores).unwrap();

        // Assert
        let expected = scores.t().dot(&scores) / 6.0;
        for (a, b) in cov.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-14);
        }
    }

    #[test]
    // Purpose
    // -------
    // A Bartlett HAC estimate is symmetric and its diagonal stays
    // non-negative.
    //
    // Given
    // -----
    // - Fixed bandwidth 2 on the sample scores.
    //
    // Expect
    // ------
    // - S = Sᵀ and diag(S) ≥ 0.
    fn bartlett_estimate_is_symmetric() {
        // Arrange
        let opts = HACOptions::new(Some(2), KernelType::Bartlett, false, true);

        // Act
        let cov = calculate_avg_scores_cov(&opts, &sample_scores()).unwrap();

        // Assert
        assert_relative_eq!(cov[[0, 1]], cov[[1, 0]], epsilon = 1e-14);
        assert!(cov[[0, 0]] >= 0.0 && cov[[1, 1]] >= 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Centering is a no-op when columns already have mean zero.
    //
    // Given
    // -----
    // - Columns constructed to sum to zero.
    //
    // Expect
    // ------
    // - Identical estimates with and without centering.
    fn centering_is_noop_on_mean_zero_columns() {
        // Arrange
        let scores = array![[1.0, 2.0], [-1.0, -1.0], [0.5, -2.0], [-0.5, 1.0]];
        let plain = HACOptions::new(Some(1), KernelType::Parzen, false, false);
        let centered = HACOptions { center: true, ..plain.clone() };

        // Act
        let a = calculate_avg_scores_cov(&plain, &scores).unwrap();
        let b = calculate_avg_scores_cov(&centered, &scores).unwrap();

        // Assert
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-14);
        }
    }

    #[test]
    // Purpose
    // -------
    // Empty inputs are rejected instead of dividing by zero.
    //
    // Given
    // -----
    // - A 0×3 score matrix.
    //
    // Expect
    // ------
    // - `InferenceError::EmptyScores`.
    fn empty_scores_are_rejected() {
        let scores = Array2::<f64>::zeros((0, 3));
        let res = calculate_avg_scores_cov(&HACOptions::default(), &scores);
        assert_eq!(res, Err(InferenceError::EmptyScores));
    }
}
