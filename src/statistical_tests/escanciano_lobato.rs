//! Escanciano–Lobato (2009) automatic portmanteau test.
//!
//! Purpose
//! -------
//! Test `H₀: ρ₁ = … = ρ_d = 0` for a residual series whose conditional
//! variance may be time-varying. The usual Box–Pierce statistic is built
//! from heteroskedasticity-robust autocorrelations
//!
//! ```text
//! ρ̃_j² = γ̂_j² / τ̂_j,
//! γ̂_j = (1/(n−j)) Σ (y_t − ȳ)(y_{t−j} − ȳ),
//! τ̂_j = (1/(n−j)) Σ (y_t − ȳ)²(y_{t−j} − ȳ)²,
//! ```
//!
//! and the lag `p̃` is chosen automatically by maximizing
//! `Q*_p − π(p, n, q)`, where the penalty switches from BIC-like `p ln n`
//! to AIC-like `2p` once the largest `√n |ρ̃_j|` exceeds `√(q ln n)`.
//! Under `H₀`, `Q*_{p̃} = n Σ_{j ≤ p̃} ρ̃_j²` is asymptotically `χ²(1)`.
//!
//! Downstream usage
//! ----------------
//! - Run on MLR residuals next to Breusch–Godfrey, which is not robust
//!   to ARCH effects.
use crate::statistical_tests::{
    errors::{TestError, TestResult},
    pvalues::chi2_sf,
    validation::{validate_lag, validate_positive, validate_series},
};
use serde::Serialize;

/// Penalty tuning constant recommended by Escanciano and Lobato.
pub const DEFAULT_EL_Q: f64 = 2.4;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ElOutcome {
    pub selected_lag: usize,
    pub statistic: f64,
    pub p_value: f64,
    pub max_lag: usize,
}

impl ElOutcome {
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run the test with maximum lag `d` and penalty constant `q`.
///
/// # Errors
/// - `InsufficientData` / `NonFiniteData` from input validation.
/// - `InvalidTuning` for `q ≤ 0`; `InvalidLag` unless `1 ≤ d < n`.
/// - `ZeroTau` if some `τ̂_j` is exactly zero.
pub fn escanciano_lobato(data: &[f64], q: f64, d: usize) -> TestResult<ElOutcome> {
    validate_series(data, 2)?;
    validate_positive("q", q)?;
    validate_lag(d, data.len())?;

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let rho2 = robust_autocorrelations(data, d, mean)?;
    let selected_lag = select_lag(&rho2, n, q);
    let statistic = n * rho2[..selected_lag].iter().sum::<f64>();

    Ok(ElOutcome { selected_lag, statistic, p_value: chi2_sf(statistic, 1.0), max_lag: d })
}

// ---- Helper methods ----

/// `ρ̃_j²` for `j = 1..=d`, stored at index `j − 1`.
fn robust_autocorrelations(data: &[f64], d: usize, mean: f64) -> TestResult<Vec<f64>> {
    (1..=d)
        .map(|j| {
            let (gamma, tau) = lagged_moments(data, j, mean);
            if tau == 0.0 {
                return Err(TestError::ZeroTau { lag: j });
            }
            Ok(gamma * gamma / tau)
        })
        .collect()
}

/// `(γ̂_j, τ̂_j)`.
fn lagged_moments(data: &[f64], j: usize, mean: f64) -> (f64, f64) {
    let m = (data.len() - j) as f64;
    let (g, t) = data[j..].iter().zip(data).fold((0.0, 0.0), |(g, t), (y, y_lag)| {
        let (a, b) = (y - mean, y_lag - mean);
        (g + a * b, t + a * a * b * b)
    });
    (g / m, t / m)
}

fn select_lag(rho2: &[f64], n: f64, q: f64) -> usize {
    let log_n = n.ln();
    let max_abs = rho2.iter().map(|r| r.sqrt()).fold(0.0, f64::max);
    let bic_regime = n.sqrt() * max_abs <= (q * log_n).sqrt();

    let mut best = (1, f64::NEG_INFINITY);
    let mut cumulative = 0.0;
    for (idx, r) in rho2.iter().enumerate() {
        let p = idx + 1;
        cumulative += r;
        let penalty = if bic_regime { p as f64 * log_n } else { 2.0 * p as f64 };
        let value = n * cumulative - penalty;
        if value > best.1 {
            best = (p, value);
        }
    }
    best.0
}
