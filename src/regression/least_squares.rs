//! least_squares — dense OLS kernel shared by the MLR estimator and the
//! auxiliary regressions behind ADF, VIF, Breusch–Godfrey, and ARCH.
//!
//! Purpose
//! -------
//! Solve `min_β ‖y − Xβ‖²` once, keep everything downstream code needs
//! (`(X'X)⁻¹`, residuals, SSR, centered TSS) and expose the usual summary
//! statistics without re-solving.
//!
//! Key behaviors
//! -------------
//! - Rank check on the column-scaled Gram matrix: if the ratio of its
//!   smallest to largest eigenvalue is below `RANK_TOL`, the design is
//!   reported as singular instead of producing garbage coefficients.
//! - Solve via Cholesky of `X'X` (nalgebra).
//! - `aic`/`log_likelihood` follow the Gaussian profile likelihood with
//!   `σ̂² = SSR / n`, matching what lag-selection criteria expect.
//!
//! Conventions
//! -----------
//! - The design is used as given; [`add_constant`] prepends an intercept
//!   column when the caller wants one.
//! - `r_squared` is the centered R², so it is only meaningful when the
//!   design contains an intercept (every caller in this crate adds one).
use crate::{
    optimization::numerical_stability::RANK_TOL,
    regression::errors::{RegressionError, RegressionResult},
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Prepend a column of ones.
pub fn add_constant(x: &Array2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((x.nrows(), x.ncols() + 1), |(i, j)| if j == 0 { 1.0 } else { x[[i, j - 1]] })
}

pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    pub coefficients: Array1<f64>,
    pub fitted: Array1<f64>,
    pub residuals: Array1<f64>,
    pub xtx_inv: Array2<f64>,
    pub ssr: f64,
    pub centered_tss: f64,
    pub nobs: usize,
    pub nparams: usize,
}

impl LeastSquares {
    /// Fit `y` on `x`.
    ///
    /// # Errors
    /// - `DimensionMismatch` when row counts differ.
    /// - `InsufficientObservations` when `n < k`.
    /// - `NonFiniteInput` for NaN/∞ anywhere in `x` or `y`.
    /// - `SingularDesign` when `X'X` is rank deficient.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> RegressionResult<Self> {
        let (n, k) = x.dim();
        if y.len() != n {
            return Err(RegressionError::DimensionMismatch {
                expected: n,
                found: y.len(),
                what: "response length",
            });
        }
        if k == 0 || n < k {
            return Err(RegressionError::InsufficientObservations { nobs: n, needed: k.max(1) });
        }
        check_finite(x, y)?;

        let xd = to_dmatrix(x);
        let yd = DVector::from_iterator(n, y.iter().copied());
        let gram = xd.transpose() * &xd;
        check_rank(&gram)?;

        let chol = gram
            .clone()
            .cholesky()
            .ok_or(RegressionError::SingularDesign { min_eigen_ratio: 0.0 })?;
        let beta = chol.solve(&(xd.transpose() * &yd));
        let xtx_inv = from_dmatrix(&chol.inverse());

        let coefficients = Array1::from_iter(beta.iter().copied());
        let fitted = x.dot(&coefficients);
        let residuals = y - &fitted;
        let ssr = residuals.dot(&residuals);
        let mean = y.sum() / n as f64;
        let centered_tss = y.iter().map(|v| (v - mean).powi(2)).sum();

        Ok(Self { coefficients, fitted, residuals, xtx_inv, ssr, centered_tss, nobs: n, nparams: k })
    }

    pub fn df_resid(&self) -> usize {
        self.nobs - self.nparams
    }

    /// Unbiased residual variance `SSR / (n − k)`; `NaN` when `n == k`.
    pub fn sigma2(&self) -> f64 {
        match self.df_resid() {
            0 => f64::NAN,
            df => self.ssr / df as f64,
        }
    }

    /// Centered R². `NaN` when the response is constant.
    pub fn r_squared(&self) -> f64 {
        if self.centered_tss == 0.0 {
            return f64::NAN;
        }
        1.0 - self.ssr / self.centered_tss
    }

    /// Adjusted R², assuming the design carries an intercept.
    pub fn adj_r_squared(&self) -> f64 {
        let n = self.nobs as f64;
        let df = self.df_resid();
        if df == 0 {
            return f64::NAN;
        }
        1.0 - (1.0 - self.r_squared()) * (n - 1.0) / df as f64
    }

    /// Gaussian log-likelihood at `σ̂² = SSR / n`.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.nparams as f64
    }

    /// `σ̂² (X'X)⁻¹`.
    pub fn classical_covariance(&self) -> Array2<f64> {
        &self.xtx_inv * self.sigma2()
    }
}

// ---- Helper methods ----

fn check_finite(x: &Array2<f64>, y: &Array1<f64>) -> RegressionResult<()> {
    if let Some(((row, col), &value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(RegressionError::NonFiniteInput { row, col, value });
    }
    if let Some(row) = y.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFiniteResponse { row, value: y[row] });
    }
    Ok(())
}

fn check_rank(gram: &DMatrix<f64>) -> RegressionResult<()> {
    let k = gram.nrows();
    let scales: Vec<f64> = (0..k).map(|j| gram[(j, j)].sqrt()).collect();
    if scales.iter().any(|&s| s == 0.0 || !s.is_finite()) {
        return Err(RegressionError::SingularDesign { min_eigen_ratio: 0.0 });
    }
    let scaled = DMatrix::from_fn(k, k, |i, j| gram[(i, j)] / (scales[i] * scales[j]));
    let eigen = scaled.symmetric_eigen();
    let max = eigen.eigenvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    let ratio = if max > 0.0 { min / max } else { 0.0 };
    if ratio <= RANK_TOL {
        return Err(RegressionError::SingularDesign { min_eigen_ratio: ratio });
    }
    Ok(())
}
