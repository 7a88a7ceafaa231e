//! ols — multiple linear regression with selectable coefficient covariance.
//!
//! Purpose
//! -------
//! Fit `y = c + Xβ + ε` by least squares on a named design, report
//! coefficients with standard errors, t statistics and two-sided p-values,
//! and predict on new covariate rows built the same way.
//!
//! Key behaviors
//! -------------
//! - The intercept is always added internally and named `"const"`.
//! - [`OlsModel::fit`] reports classical standard errors. Switching to a
//!   robust estimator is an explicit, non-mutating step via
//!   [`OlsModel::with_covariance`].
//! - p-values use Student-t with `n − k` degrees of freedom for every
//!   covariance type.
//!
//! Downstream usage
//! ----------------
//! - The pipeline fits on the training split, consults the ARCH test, and
//!   calls `with_covariance(config.robust_covariance, ..)` when needed.
//! - Diagnostics (Breusch–Godfrey, ARCH, Escanciano–Lobato) consume
//!   `residuals` and `design`.
use crate::{
    inference::{CovarianceType, HACOptions, OlsDesign, ols_covariance, standard_errors},
    regression::{
        errors::{RegressionError, RegressionResult},
        least_squares::{LeastSquares, add_constant},
    },
};
use ndarray::{Array1, Array2};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

pub const INTERCEPT_NAME: &str = "const";

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientEstimate {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub statistic: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OlsModel {
    pub coefficients: Vec<CoefficientEstimate>,
    pub covariance_type: CovarianceType,
    #[serde(skip)]
    pub covariance: Array2<f64>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub nobs: usize,
    /// Design with the leading intercept column, as fitted.
    #[serde(skip)]
    pub design: Array2<f64>,
    #[serde(skip)]
    fit: LeastSquares,
}

impl OlsModel {
    /// Fit with an intercept and classical covariance.
    ///
    /// # Errors
    /// - `DimensionMismatch` if `names` does not match the column count or
    ///   `y` does not match the row count.
    /// - Anything [`LeastSquares::fit`] reports.
    pub fn fit(names: &[String], regressors: &Array2<f64>, y: &Array1<f64>) -> RegressionResult<Self> {
        if names.len() != regressors.ncols() {
            return Err(RegressionError::DimensionMismatch {
                expected: regressors.ncols(),
                found: names.len(),
                what: "regressor names",
            });
        }
        let design = add_constant(regressors);
        let fit = LeastSquares::fit(&design, y)?;
        let covariance = fit.classical_covariance();

        let mut labels = Vec::with_capacity(names.len() + 1);
        labels.push(INTERCEPT_NAME.to_string());
        labels.extend(names.iter().cloned());

        let coefficients = coefficient_table(&labels, &fit, &covariance);
        Ok(Self {
            coefficients,
            covariance_type: CovarianceType::Classical,
            covariance,
            fitted: fit.fitted.to_vec(),
            residuals: fit.residuals.to_vec(),
            r_squared: fit.r_squared(),
            adj_r_squared: fit.adj_r_squared(),
            nobs: fit.nobs,
            design,
            fit,
        })
    }

    /// Same fit, standard errors recomputed under `kind`.
    pub fn with_covariance(&self, kind: CovarianceType, hac: &HACOptions) -> RegressionResult<Self> {
        let covariance = ols_covariance(
            kind,
            OlsDesign {
                x: &self.design,
                residuals: &self.fit.residuals,
                xtx_inv: &self.fit.xtx_inv,
                sigma2: self.fit.sigma2(),
            },
            hac,
        )?;
        let labels: Vec<String> = self.coefficients.iter().map(|c| c.name.clone()).collect();
        Ok(Self {
            coefficients: coefficient_table(&labels, &self.fit, &covariance),
            covariance_type: kind,
            covariance,
            ..self.clone()
        })
    }

    /// Predictions for covariate rows without the intercept column.
    pub fn predict(&self, regressors: &Array2<f64>) -> RegressionResult<Array1<f64>> {
        let k = self.fit.nparams;
        if regressors.ncols() + 1 != k {
            return Err(RegressionError::DimensionMismatch {
                expected: k - 1,
                found: regressors.ncols(),
                what: "prediction design columns",
            });
        }
        Ok(add_constant(regressors).dot(&self.fit.coefficients))
    }

    pub fn params(&self) -> &Array1<f64> {
        &self.fit.coefficients
    }

    pub fn df_resid(&self) -> usize {
        self.fit.df_resid()
    }

    pub fn ssr(&self) -> f64 {
        self.fit.ssr
    }

    pub fn coefficient(&self, name: &str) -> Option<&CoefficientEstimate> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

// ---- Helper methods ----

fn coefficient_table(
    labels: &[String], fit: &LeastSquares, covariance: &Array2<f64>,
) -> Vec<CoefficientEstimate> {
    let se = standard_errors(covariance);
    let dist = StudentsT::new(0.0, 1.0, fit.df_resid() as f64).ok();
    labels
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = fit.coefficients[j];
            let statistic = estimate / se[j];
            let p_value = match (&dist, statistic.is_finite()) {
                (Some(t), true) => 2.0 * (1.0 - t.cdf(statistic.abs())),
                _ => f64::NAN,
            };
            CoefficientEstimate { name: name.clone(), estimate, std_error: se[j], statistic, p_value }
        })
        .collect()
}
