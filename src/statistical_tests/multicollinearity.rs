//! multicollinearity — Pearson correlation matrix and variance inflation
//! factors.
//!
//! - [`correlation_matrix`] works on named level series of equal length.
//! - [`variance_inflation_factors`] regresses each column of a design on an
//!   intercept and the remaining columns: `VIF_j = 1 / (1 − R²_j)`.
//!   A perfect fit gives `VIF = ∞`.
use crate::{
    regression::least_squares::{LeastSquares, add_constant},
    statistical_tests::{
        errors::{TestError, TestResult},
        validation::validate_series,
    },
};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.9;
pub const DEFAULT_VIF_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

impl CorrelationMatrix {
    /// Upper-triangle pairs with `|ρ| ≥ threshold`.
    pub fn flagged_pairs(&self, threshold: f64) -> Vec<CorrelatedPair> {
        let k = self.names.len();
        let mut out = Vec::new();
        for i in 0..k {
            for j in (i + 1)..k {
                let rho = self.values[i][j];
                if rho.abs() >= threshold {
                    out.push(CorrelatedPair {
                        first: self.names[i].clone(),
                        second: self.names[j].clone(),
                        correlation: rho,
                    });
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifEntry {
    pub name: String,
    pub vif: f64,
    pub flagged: bool,
}

/// Pearson correlations between named columns.
///
/// A constant column correlates as `NaN` with everything but itself.
pub fn correlation_matrix(columns: &[(String, Vec<f64>)]) -> TestResult<CorrelationMatrix> {
    let n = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    for (_, values) in columns {
        validate_series(values, 2)?;
        if values.len() != n {
            return Err(TestError::InsufficientData { needed: n, found: values.len() });
        }
    }
    let centered: Vec<Vec<f64>> = columns
        .iter()
        .map(|(_, v)| {
            let mean = v.iter().sum::<f64>() / n as f64;
            v.iter().map(|x| x - mean).collect()
        })
        .collect();
    let norms: Vec<f64> = centered.iter().map(|c| c.iter().map(|x| x * x).sum::<f64>().sqrt()).collect();

    let k = columns.len();
    let mut values = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in i..k {
            let rho = if i == j {
                1.0
            } else {
                let dot: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
                let denom = norms[i] * norms[j];
                if denom > 0.0 { dot / denom } else { f64::NAN }
            };
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }
    Ok(CorrelationMatrix { names: columns.iter().map(|(n, _)| n.clone()).collect(), values })
}

/// VIF of every column of `regressors` (no intercept column expected).
///
/// # Errors
/// - `InsufficientData` when the design has fewer rows than columns + 2.
/// - `Regression` if an auxiliary regression is singular.
pub fn variance_inflation_factors(
    names: &[String], regressors: &Array2<f64>, threshold: f64,
) -> TestResult<Vec<VifEntry>> {
    let (n, k) = regressors.dim();
    if n < k + 2 {
        return Err(TestError::InsufficientData { needed: k + 2, found: n });
    }
    if k == 1 {
        return Ok(vec![VifEntry { name: names[0].clone(), vif: 1.0, flagged: 1.0 >= threshold }]);
    }
    (0..k)
        .map(|j| {
            let target: Array1<f64> = regressors.column(j).to_owned();
            let others: Vec<usize> = (0..k).filter(|&c| c != j).collect();
            let rest = regressors.select(Axis(1), &others);
            let fit = LeastSquares::fit(&add_constant(&rest), &target)?;
            let r2 = fit.r_squared();
            let vif = if r2 >= 1.0 { f64::INFINITY } else { 1.0 / (1.0 - r2) };
            Ok(VifEntry { name: names[j].clone(), vif, flagged: vif >= threshold })
        })
        .collect()
}

/// True when any entry is flagged.
pub fn any_flagged(entries: &[VifEntry]) -> bool {
    entries.iter().any(|e| e.flagged)
}
