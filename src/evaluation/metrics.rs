//! metrics — forecast accuracy on the held-out window.
//!
//! Key behaviors
//! -------------
//! - `MAPE = mean(|(a − p)/a|) · 100` over observations with `a ≠ 0`.
//!   Excluded zeros, tiny denominators, and an all-zero window are
//!   reported as [`MetricWarning`]s rather than errors.
//! - `MSE`, `MAE`, and `R² = 1 − SSE/SST`. A constant actual series
//!   leaves `R²` undefined (`NaN`, with a warning).
//! - Pure: nothing is logged here.
use crate::evaluation::errors::{MetricError, MetricResult};
use chrono::NaiveDate;
use serde::Serialize;

/// Below this magnitude an actual value inflates MAPE enough to warn.
pub const NEAR_ZERO_ACTUAL: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricWarning {
    ZeroActuals { excluded: usize },
    NearZeroActuals { count: usize },
    MetricUndefined { metric: &'static str },
}

impl std::fmt::Display for MetricWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricWarning::ZeroActuals { excluded } => {
                write!(f, "{excluded} zero actual(s) excluded from MAPE")
            }
            MetricWarning::NearZeroActuals { count } => {
                write!(f, "{count} actual(s) below {NEAR_ZERO_ACTUAL:e} may inflate MAPE")
            }
            MetricWarning::MetricUndefined { metric } => write!(f, "{metric} is undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastMetrics {
    pub mape: f64,
    pub mse: f64,
    pub mae: f64,
    pub r_squared: f64,
    pub warnings: Vec<MetricWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Aligned forecasts of one model and their metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub model: String,
    pub points: Vec<ForecastPoint>,
    pub metrics: ForecastMetrics,
}

impl ForecastResult {
    /// # Errors
    /// Any [`MetricError`] from [`evaluate`], plus a length check on `dates`.
    pub fn new(
        model: impl Into<String>, dates: &[NaiveDate], actual: &[f64], predicted: &[f64],
    ) -> MetricResult<Self> {
        let metrics = evaluate(actual, predicted)?;
        if dates.len() != actual.len() {
            return Err(MetricError::LengthMismatch { actual: dates.len(), predicted: actual.len() });
        }
        let points = dates
            .iter()
            .zip(actual.iter().zip(predicted))
            .map(|(&date, (&actual, &predicted))| ForecastPoint { date, actual, predicted })
            .collect();
        Ok(Self { model: model.into(), points, metrics })
    }
}

/// Compute every metric.
///
/// # Errors
/// - `LengthMismatch`, `Empty`, `NonFinite`.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> MetricResult<ForecastMetrics> {
    if actual.len() != predicted.len() {
        return Err(MetricError::LengthMismatch { actual: actual.len(), predicted: predicted.len() });
    }
    if actual.is_empty() {
        return Err(MetricError::Empty);
    }
    for (index, (&a, &p)) in actual.iter().zip(predicted).enumerate() {
        if !a.is_finite() || !p.is_finite() {
            return Err(MetricError::NonFinite { index });
        }
    }

    let n = actual.len() as f64;
    let mut warnings = Vec::new();
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
    let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    let mape = mape(actual, &errors, &mut warnings);

    let mean = actual.iter().sum::<f64>() / n;
    let sst: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let r_squared = if sst > 0.0 {
        1.0 - mse * n / sst
    } else {
        warnings.push(MetricWarning::MetricUndefined { metric: "R²" });
        f64::NAN
    };

    Ok(ForecastMetrics { mape, mse, mae, r_squared, warnings })
}

/// Out-of-sample R² alone, as used to rank ARIMAX orders.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> MetricResult<f64> {
    Ok(evaluate(actual, predicted)?.r_squared)
}

// ---- Helper methods ----

fn mape(actual: &[f64], errors: &[f64], warnings: &mut Vec<MetricWarning>) -> f64 {
    let (mut sum, mut used, mut zeros, mut tiny) = (0.0, 0usize, 0usize, 0usize);
    for (a, e) in actual.iter().zip(errors) {
        if *a == 0.0 {
            zeros += 1;
            continue;
        }
        if a.abs() < NEAR_ZERO_ACTUAL {
            tiny += 1;
        }
        sum += (e / a).abs();
        used += 1;
    }
    if zeros > 0 {
        warnings.push(MetricWarning::ZeroActuals { excluded: zeros });
    }
    if tiny > 0 {
        warnings.push(MetricWarning::NearZeroActuals { count: tiny });
    }
    if used == 0 {
        warnings.push(MetricWarning::MetricUndefined { metric: "MAPE" });
        return f64::NAN;
    }
    100.0 * sum / used as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Perfect forecasts on nonzero actuals.
    // - Hand-computed values.
    // - Zero-actual handling and R² on constant actuals.
    // - Input errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Exact predictions on nonzero actuals have zero error.
    //
    // Given
    // -----
    // - actual = predicted = [0.01, −0.02, 0.03].
    //
    // Expect
    // ------
    // - MAPE = MSE = MAE = 0, R² = 1, no warnings.
    fn perfect_forecast_has_zero_error() {
        let a = [0.01, -0.02, 0.03];
        let m = evaluate(&a, &a).unwrap();
        assert_eq!(m.mape, 0.0);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_relative_eq!(m.r_squared, 1.0);
        assert!(m.warnings.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Metrics match a hand computation.
    //
    // Given
    // -----
    // - actual [1, 2, 4], predicted [2, 2, 2].
    //
    // Expect
    // ------
    // - errors [−1, 0, 2]; MSE 5/3; MAE 1; MAPE (1 + 0 + 0.5)/3·100 = 50;
    //   SST = 14/3, so R² = 1 − 5/(14/3) = −1/14.
    fn metrics_match_hand_computation() {
        let m = evaluate(&[1.0, 2.0, 4.0], &[2.0, 2.0, 2.0]).unwrap();
        assert_relative_eq!(m.mse, 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.mae, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.mape, 50.0, epsilon = 1e-12);
        assert_relative_eq!(m.r_squared, 1.0 - 5.0 / (14.0 / 3.0), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Zero actuals are excluded from MAPE with warnings; an all-zero
    // window leaves MAPE and R² undefined.
    //
    // Given
    // -----
    // - actual [0, 2], predicted [1, 1]; actual [0, 0].
    //
    // Expect
    // ------
    // - MAPE 50 with a ZeroActuals warning.
    // - NaN MAPE and NaN R² with MetricUndefined warnings.
    fn zero_actuals_become_warnings() {
        let m = evaluate(&[0.0, 2.0], &[1.0, 1.0]).unwrap();
        assert_relative_eq!(m.mape, 50.0);
        assert!(m.warnings.contains(&MetricWarning::ZeroActuals { excluded: 1 }));

        let z = evaluate(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        assert!(z.mape.is_nan() && z.r_squared.is_nan());
        assert!(z.warnings.contains(&MetricWarning::MetricUndefined { metric: "MAPE" }));
    }

    #[test]
    // Purpose
    // -------
    // Input problems are errors, not warnings.
    //
    // Given
    // -----
    // - Different lengths, empty input, a NaN prediction.
    //
    // Expect
    // ------
    // - LengthMismatch, Empty, NonFinite.
    fn invalid_inputs_are_errors() {
        assert!(matches!(evaluate(&[1.0], &[1.0, 2.0]), Err(MetricError::LengthMismatch { .. })));
        assert_eq!(evaluate(&[], &[]), Err(MetricError::Empty));
        assert_eq!(evaluate(&[1.0], &[f64::NAN]), Err(MetricError::NonFinite { index: 0 }));
    }
}
