//! adf — Augmented Dickey–Fuller unit-root test with a constant.
//!
//! Purpose
//! -------
//! Decide whether a level series is stationary before it enters a
//! regression. The test regression is
//!
//! ```text
//! Δy_t = α + γ y_{t−1} + Σ_{i=1}^{k} δ_i Δy_{t−i} + ε_t
//! ```
//!
//! and the statistic is the OLS t-ratio of `γ`.
//!
//! Key behaviors
//! -------------
//! - Maximum lag `⌈12 (n/100)^{1/4}⌉`, capped so the regression keeps
//!   positive degrees of freedom.
//! - Lag `k` chosen by minimum AIC over `0..=maxlag` on a common sample
//!   (the first `maxlag` differences are held out for every candidate),
//!   then the chosen regression is refitted on all usable rows. Ties go to
//!   the smaller lag.
//! - p-value from MacKinnon's (1994) response-surface approximation;
//!   critical values from MacKinnon (2010) finite-sample polynomials.
//!
//! Conventions
//! -----------
//! - `Stationary` means the unit root is rejected at `alpha`.
use crate::{
    regression::least_squares::LeastSquares,
    statistical_tests::{
        errors::{TestError, TestResult},
        pvalues::std_normal_cdf,
        validation::validate_series,
    },
};
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::fmt;

/// Smallest series the test accepts.
pub const ADF_MIN_OBS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stationarity {
    Stationary,
    NonStationary,
}

impl fmt::Display for Stationarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stationarity::Stationary => f.write_str("stationary"),
            Stationarity::NonStationary => f.write_str("non-stationary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfOutcome {
    pub series: String,
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub critical_values: CriticalValues,
    pub classification: Stationarity,
}

impl AdfOutcome {
    pub fn is_stationary(&self) -> bool {
        self.classification == Stationarity::Stationary
    }
}

/// Default maximum lag `⌈12 (n/100)^{1/4}⌉`, capped at `n/2 − 2`.
pub fn default_max_lag(n: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min((n / 2).saturating_sub(2))
}

/// Run the ADF test with a constant and AIC lag selection.
///
/// # Errors
/// - `InsufficientData` below [`ADF_MIN_OBS`] observations.
/// - `NonFiniteData` for NaN/∞ input.
/// - `ConstantSeries` if the series never changes.
/// - `Regression` if an auxiliary regression is singular.
pub fn adf_test(
    series: &str, y: &[f64], max_lag: Option<usize>, alpha: f64,
) -> TestResult<AdfOutcome> {
    validate_series(y, ADF_MIN_OBS)?;
    let diffs: Vec<f64> = y.windows(2).map(|w| w[1] - w[0]).collect();
    if diffs.iter().all(|d| *d == 0.0) {
        return Err(TestError::ConstantSeries);
    }

    let maxlag = max_lag.unwrap_or_else(|| default_max_lag(y.len())).min(default_max_lag(y.len()));
    let used_lag = select_lag_by_aic(y, &diffs, maxlag)?;

    let (x, dy) = adf_design(y, &diffs, used_lag, used_lag);
    let fit = LeastSquares::fit(&x, &dy)?;
    let se = (fit.sigma2() * fit.xtx_inv[[0, 0]]).sqrt();
    let statistic = fit.coefficients[0] / se;
    let nobs = dy.len();
    let p_value = mackinnon_p_value(statistic);

    let classification =
        if p_value < alpha { Stationarity::Stationary } else { Stationarity::NonStationary };

    Ok(AdfOutcome {
        series: series.to_string(),
        statistic,
        p_value,
        used_lag,
        nobs,
        critical_values: critical_values(nobs),
        classification,
    })
}

/// MacKinnon (1994) approximate p-value for the constant-only case.
pub fn mackinnon_p_value(tau: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    if !tau.is_finite() {
        return f64::NAN;
    }
    if tau > TAU_MAX {
        return 1.0;
    }
    if tau < TAU_MIN {
        return 0.0;
    }
    let poly = if tau <= TAU_STAR {
        2.1659 + 1.4412 * tau + 0.038269 * tau * tau
    } else {
        1.7339 + 0.93202 * tau - 0.12745 * tau * tau - 0.010368 * tau.powi(3)
    };
    std_normal_cdf(poly)
}

/// MacKinnon (2010) finite-sample critical values, constant only.
pub fn critical_values(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs as f64;
    let surface = |c: [f64; 4]| c[0] + c[1] * inv + c[2] * inv * inv + c[3] * inv.powi(3);
    CriticalValues {
        one_pct: surface([-3.43035, -6.5393, -16.786, -79.433]),
        five_pct: surface([-2.86154, -2.8903, -4.234, -40.040]),
        ten_pct: surface([-2.56677, -1.5384, -2.809, 0.0]),
    }
}

// ---- Helper methods ----

/// AIC-minimizing lag on the common sample that drops `maxlag` leading rows.
fn select_lag_by_aic(y: &[f64], diffs: &[f64], maxlag: usize) -> TestResult<usize> {
    let mut best = (0, f64::INFINITY);
    for lag in 0..=maxlag {
        let (x, dy) = adf_design(y, diffs, lag, maxlag);
        let aic = LeastSquares::fit(&x, &dy)?.aic();
        if aic < best.1 {
            best = (lag, aic);
        }
    }
    Ok(best.0)
}

/// Rows `t = start..diffs.len()` of `[y_{t}, Δy_{t−1}, …, Δy_{t−lag}, 1]`
/// against `Δy_t`, where `diffs[t] = y[t+1] − y[t]`.
fn adf_design(y: &[f64], diffs: &[f64], lag: usize, start: usize) -> (Array2<f64>, Array1<f64>) {
    let rows: Vec<usize> = (start..diffs.len()).collect();
    let k = lag + 2;
    let x = Array2::from_shape_fn((rows.len(), k), |(r, c)| {
        let t = rows[r];
        match c {
            0 => y[t],
            c if c == k - 1 => 1.0,
            c => diffs[t - c],
        }
    });
    let dy = Array1::from_iter(rows.iter().map(|&t| diffs[t]));
    (x, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - MacKinnon p-value boundaries and critical value magnitudes.
    // - Classification of a white-noise series and a random walk.
    // - Degenerate inputs.
    // -------------------------------------------------------------------------

    fn noise(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(0.0, 1.0).unwrap();
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    #[test]
    // Purpose
    // -------
    // The p-value surface is monotone with the documented clamps.
    //
    // Given
    // -----
    // - τ ∈ {−20, −2.86, 0, 3}.
    //
    // Expect
    // ------
    // - 0 at the left clamp, ≈0.05 at the 5% asymptotic critical value,
    //   1 at the right clamp.
    fn mackinnon_p_value_boundaries() {
        assert_eq!(mackinnon_p_value(-20.0), 0.0);
        assert_relative_eq!(mackinnon_p_value(-2.86154), 0.05, epsilon = 0.005);
        assert!(mackinnon_p_value(0.0) > 0.9);
        assert_eq!(mackinnon_p_value(3.0), 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Critical values are ordered and near their asymptotic limits.
    //
    // Given
    // -----
    // - nobs = 500.
    //
    // Expect
    // ------
    // - 1% < 5% < 10% and 5% ≈ −2.87.
    fn critical_values_are_ordered() {
        let cv = critical_values(500);
        assert!(cv.one_pct < cv.five_pct && cv.five_pct < cv.ten_pct);
        assert_relative_eq!(cv.five_pct, -2.867, epsilon = 0.01);
    }

    #[test]
    // Purpose
    // -------
    // White noise is classified stationary, its cumulative sum is not.
    //
    // Given
    // -----
    // - 300 seeded N(0, 1) draws and their running sum with drift 0.5.
    //
    // Expect
    // ------
    // - Noise: Stationary with p < 0.01.
    // - Random walk: NonStationary.
    // - Used lag within the default bound.
    fn classifies_noise_and_random_walk() {
        // Arrange
        let e = noise(7, 300);
        let walk: Vec<f64> = e
            .iter()
            .scan(0.0, |acc, v| {
                *acc += 0.5 + v;
                Some(*acc)
            })
            .collect();

        // Act
        let stationary = adf_test("noise", &e, None, 0.05).unwrap();
        let unit_root = adf_test("walk", &walk, None, 0.05).unwrap();

        // Assert
        assert!(stationary.is_stationary());
        assert!(stationary.p_value < 0.01);
        assert_eq!(unit_root.classification, Stationarity::NonStationary);
        assert!(unit_root.used_lag <= default_max_lag(300));
        assert_eq!(stationary.nobs, 299 - stationary.used_lag);
    }

    #[test]
    // Purpose
    // -------
    // Too-short and constant inputs are rejected.
    //
    // Given
    // -----
    // - Five observations; twenty identical observations.
    //
    // Expect
    // ------
    // - `InsufficientData`, then `ConstantSeries`.
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            adf_test("short", &[1.0, 2.0, 3.0, 4.0, 5.0], None, 0.05),
            Err(TestError::InsufficientData { .. })
        ));
        assert_eq!(adf_test("flat", &[2.0; 20], None, 0.05), Err(TestError::ConstantSeries));
    }
}
