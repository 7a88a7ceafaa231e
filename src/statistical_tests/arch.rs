//! Engle's ARCH-LM test for conditional heteroskedasticity.
//!
//! Regress `e_t²` on a constant and `e_{t−1}², …, e_{t−m}²` over the
//! `n − m` observations with a full lag history:
//!
//! ```text
//! LM = (n − m) R²                       ~ χ²(m)
//! F  = (R²/m) / ((1 − R²)/(n − 2m − 1))  ~ F(m, n − 2m − 1)
//! ```
use crate::{
    regression::least_squares::LeastSquares,
    statistical_tests::{
        errors::{TestError, TestResult},
        pvalues::{chi2_sf, f_sf},
        validation::{validate_lag, validate_series},
    },
};
use ndarray::{Array1, Array2};
use serde::Serialize;

pub const DEFAULT_ARCH_LAGS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArchOutcome {
    pub lags: usize,
    pub lm_statistic: f64,
    pub lm_p_value: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
}

impl ArchOutcome {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.lm_p_value < alpha
    }
}

/// # Errors
/// - `InvalidLag` unless `1 ≤ lags < n`.
/// - `InsufficientData` unless `n ≥ 2·lags + 2`.
/// - `ConstantSeries` when the squared residuals do not vary.
pub fn arch_lm(residuals: &[f64], lags: usize) -> TestResult<ArchOutcome> {
    let n = residuals.len();
    validate_lag(lags, n.max(1))?;
    validate_series(residuals, 2 * lags + 2)?;

    let sq: Vec<f64> = residuals.iter().map(|e| e * e).collect();
    let m = n - lags;
    let x = Array2::from_shape_fn((m, lags + 1), |(r, c)| {
        if c == 0 { 1.0 } else { sq[r + lags - c] }
    });
    let y = Array1::from_iter(sq[lags..].iter().copied());
    let fit = LeastSquares::fit(&x, &y)?;
    let r2 = fit.r_squared();
    if !r2.is_finite() {
        return Err(TestError::ConstantSeries);
    }

    let lm_statistic = m as f64 * r2;
    let df2 = (m - lags - 1) as f64;
    let f_statistic = (r2 / lags as f64) / ((1.0 - r2) / df2);
    Ok(ArchOutcome {
        lags,
        lm_statistic,
        lm_p_value: chi2_sf(lm_statistic, lags as f64),
        f_statistic,
        f_p_value: f_sf(f_statistic, lags as f64, df2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Detection of simulated ARCH(1) effects.
    // - Non-rejection on Gaussian noise.
    // - Validation of lag order and sample size.
    // -------------------------------------------------------------------------

    fn simulate(alpha1: f64, seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let z = Normal::new(0.0, 1.0).unwrap();
        let mut prev: f64 = 0.0;
        (0..n)
            .map(|_| {
                let sigma2 = 0.2 + alpha1 * prev * prev;
                prev = sigma2.sqrt() * z.sample(&mut rng);
                prev
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Strong ARCH(1) dynamics are detected; IID noise is not flagged at 1%.
    //
    // Given
    // -----
    // - 1000 draws of ARCH(1) with α₁ = 0.7 and of Gaussian noise.
    //
    // Expect
    // ------
    // - ARCH: p < 0.001. Noise: p > 0.01. LM uses n − m observations.
    fn detects_arch_effects() {
        // Arrange
        let arch = simulate(0.7, 5, 1000);
        let iid = simulate(0.0, 6, 1000);

        // Act
        let a = arch_lm(&arch, DEFAULT_ARCH_LAGS).unwrap();
        let b = arch_lm(&iid, DEFAULT_ARCH_LAGS).unwrap();

        // Assert
        assert!(a.is_significant(0.001), "p = {}", a.lm_p_value);
        assert!(!b.is_significant(0.01), "p = {}", b.lm_p_value);
        assert!(a.f_statistic > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Invalid arguments are rejected.
    //
    // Given
    // -----
    // - lags = 0; a series too short for five lags.
    //
    // Expect
    // ------
    // - `InvalidLag`, then `InsufficientData`.
    fn rejects_bad_arguments() {
        let e = simulate(0.0, 1, 50);
        assert!(matches!(arch_lm(&e, 0), Err(TestError::InvalidLag { .. })));
        assert!(matches!(arch_lm(&e[..10], 5), Err(TestError::InsufficientData { .. })));
    }
}
