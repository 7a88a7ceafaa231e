//! Breusch–Godfrey LM test for serial correlation in regression residuals.
//!
//! The auxiliary regression is `e_t` on the original design `X` (intercept
//! included) and `e_{t−1}, …, e_{t−m}`, with pre-sample lags set to zero so
//! every observation is kept. Reported statistics:
//!
//! ```text
//! LM = n R²_aux                 ~ χ²(m)
//! F  = ((e'e − SSR_aux)/m) / (SSR_aux/(n − k − m))  ~ F(m, n − k − m)
//! ```
use crate::{
    regression::least_squares::LeastSquares,
    statistical_tests::{
        errors::{TestError, TestResult},
        pvalues::{chi2_sf, f_sf},
        validation::validate_series,
    },
};
use ndarray::{Array1, Array2};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreuschGodfreyOutcome {
    pub lags: usize,
    pub lm_statistic: f64,
    pub lm_p_value: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
}

impl BreuschGodfreyOutcome {
    /// "Autocorrelation detected" at level `alpha` (LM p-value).
    pub fn autocorrelation_detected(&self, alpha: f64) -> bool {
        self.lm_p_value < alpha
    }
}

/// Run the test on residuals `e` of a regression with design `x`.
///
/// # Errors
/// - `InvalidLag` for `lags == 0`.
/// - `InsufficientData` unless `n > k + lags`.
/// - `Regression` when the auxiliary design is singular.
pub fn breusch_godfrey(
    x: &Array2<f64>, residuals: &[f64], lags: usize,
) -> TestResult<BreuschGodfreyOutcome> {
    let (n, k) = x.dim();
    if lags == 0 {
        return Err(TestError::InvalidLag { lag: lags, n });
    }
    validate_series(residuals, k + lags + 1)?;
    if residuals.len() != n {
        return Err(TestError::InsufficientData { needed: n, found: residuals.len() });
    }

    let aux = Array2::from_shape_fn((n, k + lags), |(t, c)| {
        if c < k {
            x[[t, c]]
        } else {
            let lag = c - k + 1;
            if t >= lag { residuals[t - lag] } else { 0.0 }
        }
    });
    let e = Array1::from_vec(residuals.to_vec());
    let fit = LeastSquares::fit(&aux, &e)?;

    let ssr_restricted = e.dot(&e);
    let r2 = if ssr_restricted > 0.0 { 1.0 - fit.ssr / ssr_restricted } else { f64::NAN };
    let lm_statistic = n as f64 * r2;
    let df2 = (n - k - lags) as f64;
    let f_statistic = ((ssr_restricted - fit.ssr) / lags as f64) / (fit.ssr / df2);

    Ok(BreuschGodfreyOutcome {
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
    use crate::regression::least_squares::add_constant;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover detection of AR(1) residuals, non-rejection on
    // independent residuals, and argument validation.
    // -------------------------------------------------------------------------

    fn regression_residuals(rho: f64, seed: u64) -> (Array2<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(0.0, 1.0).unwrap();
        let n = 400;
        let xs: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();
        let mut u = 0.0;
        let y: Vec<f64> = xs
            .iter()
            .map(|x| {
                u = rho * u + dist.sample(&mut rng);
                1.0 + 0.5 * x + u
            })
            .collect();
        let design = add_constant(&Array2::from_shape_vec((n, 1), xs).unwrap());
        let fit = LeastSquares::fit(&design, &Array1::from_vec(y)).unwrap();
        (design, fit.residuals.to_vec())
    }

    #[test]
    // Purpose
    // -------
    // AR(1) errors with ρ = 0.6 are detected; independent errors are not
    // flagged at the 1% level.
    //
    // Given
    // -----
    // - n = 400 seeded regressions with AR(1) and IID errors.
    //
    // Expect
    // ------
    // - AR(1): LM p < 0.001. IID: LM p > 0.01. Both F p-values in [0, 1].
    fn detects_ar1_residuals() {
        // Arrange
        let (x_ar, e_ar) = regression_residuals(0.6, 11);
        let (x_iid, e_iid) = regression_residuals(0.0, 12);

        // Act
        let ar = breusch_godfrey(&x_ar, &e_ar, 1).unwrap();
        let iid = breusch_godfrey(&x_iid, &e_iid, 1).unwrap();

        // Assert
        assert!(ar.autocorrelation_detected(0.001), "p = {}", ar.lm_p_value);
        assert!(!iid.autocorrelation_detected(0.01), "p = {}", iid.lm_p_value);
        assert!((0.0..=1.0).contains(&ar.f_p_value));
    }

    #[test]
    // Purpose
    // -------
    // Zero lags and length mismatches are rejected.
    //
    // Given
    // -----
    // - lags = 0; residuals one shorter than the design.
    //
    // Expect
    // ------
    // - `InvalidLag`, then `InsufficientData`.
    fn rejects_bad_arguments() {
        let (x, e) = regression_residuals(0.0, 3);
        assert!(matches!(breusch_godfrey(&x, &e, 0), Err(TestError::InvalidLag { .. })));
        assert!(matches!(
            breusch_godfrey(&x, &e[1..], 1),
            Err(TestError::InsufficientData { .. })
        ));
    }
}
