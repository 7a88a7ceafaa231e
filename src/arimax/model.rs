//! model — ARIMAX(p, 0, q) estimated by exact maximum likelihood.
//!
//! Purpose
//! -------
//! Regression with ARMA errors,
//! `y_t = c + x_tβ + u_t`, `φ(L) u_t = θ(L) ε_t`, `ε_t ~ N(0, σ²)`,
//! estimated jointly by maximizing the Kalman-filter likelihood.
//!
//! Key behaviors
//! -------------
//! - Parameter vector `θ = [c, β₁…β_k, φ₁…φ_p, θ₁…θ_q]`, unconstrained.
//!   The scale `σ²` is concentrated out and reported separately.
//! - [`LogLikelihood::value`] returns the *average* concentrated
//!   log-likelihood so finite-difference steps and solver tolerances do
//!   not depend on the sample length.
//! - Start values: OLS of `y` on `[1, X]` for `(c, β)`, an AR(p) fit by OLS
//!   on the OLS residuals for `φ` (zeroed if non-stationary), and `θ = 0`.
//! - Standard errors from the pseudo-inverse of the observed information;
//!   when the Hessian cannot be formed they are `NaN` and a warning is
//!   logged.
//!
//! Downstream usage
//! ----------------
//! - [`ArimaxFit::forecast`] produces dynamic multi-step forecasts given
//!   the future exogenous rows; the order search scores these.
use crate::{
    arimax::{
        errors::{ArimaxError, ArimaxResult},
        kalman::{ArmaStateSpace, FilterOutput, Initialization},
        order::ArimaOrder,
    },
    inference::{covariance_from_information, observed_information, standard_errors},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, MLEOptions, Theta, maximize, scalar_hessian},
    },
    regression::{CoefficientEstimate, INTERCEPT_NAME, LeastSquares, add_constant},
    statistical_tests::pvalues::std_normal_cdf,
};
use ndarray::{Array1, Array2, s};
use serde::Serialize;
use tracing::warn;

/// Response and exogenous regressors, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaxData {
    pub y: Array1<f64>,
    pub x: Array2<f64>,
}

impl ArimaxData {
    /// # Errors
    /// `DimensionMismatch` when `x` and `y` differ in rows.
    pub fn new(y: Array1<f64>, x: Array2<f64>) -> ArimaxResult<Self> {
        if x.nrows() != y.len() {
            return Err(ArimaxError::DimensionMismatch {
                what: "exogenous rows",
                expected: y.len(),
                found: x.nrows(),
            });
        }
        Ok(Self { y, x })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaxModel {
    order: ArimaOrder,
    n_exog: usize,
}

impl ArimaxModel {
    pub fn new(order: ArimaOrder, n_exog: usize) -> Self {
        Self { order, n_exog }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn n_params(&self) -> usize {
        1 + self.n_exog + self.order.p + self.order.q
    }

    /// `const`, the exogenous names, `ar.L1…`, `ma.L1…`.
    pub fn param_names(&self, exog_names: &[String]) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_params());
        names.push(INTERCEPT_NAME.to_string());
        names.extend(exog_names.iter().cloned());
        names.extend((1..=self.order.p).map(|i| format!("ar.L{i}")));
        names.extend((1..=self.order.q).map(|j| format!("ma.L{j}")));
        names
    }

    /// Run the filter at `theta`.
    ///
    /// # Errors
    /// `ThetaLengthMismatch`, plus any filtering error.
    pub fn filter(&self, theta: &Theta, data: &ArimaxData) -> OptResult<FilterOutput> {
        if theta.len() != self.n_params() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.n_params(),
                actual: theta.len(),
            });
        }
        let u = self.regression_errors(theta, data).to_vec();
        self.state_space(theta).filter(&u)
    }

    /// OLS-based starting point.
    ///
    /// # Errors
    /// `StartValues` when the OLS regression of `y` on `[1, X]` fails.
    pub fn start_values(&self, data: &ArimaxData) -> ArimaxResult<Theta> {
        let ols = LeastSquares::fit(&add_constant(&data.x), &data.y)?;
        let ar = self.ar_start(&ols.residuals);
        let mut theta = Vec::with_capacity(self.n_params());
        theta.extend(ols.coefficients.iter().copied());
        theta.extend(ar);
        theta.extend(std::iter::repeat(0.0).take(self.order.q));
        Ok(Array1::from_vec(theta))
    }

    /// Maximize the likelihood and assemble the fitted model.
    ///
    /// # Errors
    /// - `DimensionMismatch` for a wrong number of exogenous columns or names.
    /// - `StartValues` and `EstimationFailure` from the steps above.
    pub fn fit(
        &self, exog_names: &[String], data: &ArimaxData, opts: &MLEOptions,
    ) -> ArimaxResult<ArimaxFit> {
        if data.x.ncols() != self.n_exog {
            return Err(ArimaxError::DimensionMismatch {
                what: "exogenous columns",
                expected: self.n_exog,
                found: data.x.ncols(),
            });
        }
        if exog_names.len() != self.n_exog {
            return Err(ArimaxError::DimensionMismatch {
                what: "exogenous names",
                expected: self.n_exog,
                found: exog_names.len(),
            });
        }

        let theta0 = self.start_values(data)?;
        let outcome = maximize(self, theta0, data, opts)?;
        let theta = outcome.theta_hat;
        let filtered = self.filter(&theta, data)?;
        let m = filtered.nobs_used();
        let log_likelihood = filtered.log_likelihood();
        let sigma2 = filtered.sigma2();

        let std_errors = self.standard_errors(&theta, data, m);
        let coefficients = self
            .param_names(exog_names)
            .into_iter()
            .zip(theta.iter().zip(std_errors.iter()))
            .map(|(name, (&estimate, &std_error))| {
                let statistic = estimate / std_error;
                let p_value = 2.0 * (1.0 - std_normal_cdf(statistic.abs()));
                CoefficientEstimate { name, estimate, std_error, statistic, p_value }
            })
            .collect();

        // σ² counts as a parameter in the information criteria.
        let k = (self.n_params() + 1) as f64;
        Ok(ArimaxFit {
            order: self.order,
            coefficients,
            sigma2,
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * (m as f64).ln(),
            nobs: m,
            converged: outcome.converged,
            status: outcome.status,
            iterations: outcome.iterations,
            initialization: filtered.initialization,
            residuals: filtered.innovations,
            n_exog: self.n_exog,
            state_space: self.state_space(&theta),
            next_state: filtered.next_state,
            theta,
        })
    }

    // ---- Helper methods ----

    /// Callers guarantee `theta.len() == n_params()`.
    fn split(&self, theta: &Theta) -> (f64, Vec<f64>, Vec<f64>, Vec<f64>) {
        let k = self.n_exog;
        let p = self.order.p;
        let beta = theta.slice(s![1..1 + k]).to_vec();
        let ar = theta.slice(s![1 + k..1 + k + p]).to_vec();
        let ma = theta.slice(s![1 + k + p..]).to_vec();
        (theta[0], beta, ar, ma)
    }

    fn state_space(&self, theta: &Theta) -> ArmaStateSpace {
        let (_, _, ar, ma) = self.split(theta);
        ArmaStateSpace::new(&ar, &ma)
    }

    fn regression_errors(&self, theta: &Theta, data: &ArimaxData) -> Array1<f64> {
        let (c, beta, _, _) = self.split(theta);
        &data.y - &data.x.dot(&Array1::from_vec(beta)) - c
    }

    fn ar_start(&self, residuals: &Array1<f64>) -> Vec<f64> {
        let p = self.order.p;
        if p == 0 {
            return Vec::new();
        }
        let n = residuals.len();
        if n <= 2 * p {
            return vec![0.0; p];
        }
        let lags = Array2::from_shape_fn((n - p, p), |(t, j)| residuals[t + p - j - 1]);
        let target = residuals.slice(s![p..]).to_owned();
        let phi = match LeastSquares::fit(&lags, &target) {
            Ok(fit) => fit.coefficients.to_vec(),
            Err(_) => return vec![0.0; p],
        };
        match ArmaStateSpace::new(&phi, &[]).initial_covariance().1 {
            Initialization::Stationary => phi,
            Initialization::Diffuse => vec![0.0; p],
        }
    }

    fn standard_errors(&self, theta: &Theta, data: &ArimaxData, m: usize) -> Array1<f64> {
        let objective = |th: &Theta| self.value(th, data);
        let result = scalar_hessian(&objective, theta)
            .map_err(|e| e.to_string())
            .and_then(|h| {
                covariance_from_information(&observed_information(&h, m))
                    .map_err(|e| e.to_string())
            });
        match result {
            Ok(cov) => {
                if cov.dropped > 0 {
                    warn!(order = %self.order, dropped = cov.dropped, "weakly identified ARIMAX parameters");
                }
                standard_errors(&cov.matrix)
            }
            Err(reason) => {
                warn!(order = %self.order, %reason, "ARIMAX standard errors unavailable");
                Array1::from_elem(theta.len(), f64::NAN)
            }
        }
    }
}

impl LogLikelihood for ArimaxModel {
    type Data = ArimaxData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        self.check(theta, data)?;
        let filtered = self.filter(theta, data)?;
        let ll = filtered.log_likelihood();
        if !ll.is_finite() {
            return Err(OptError::NonFiniteCost { value: ll });
        }
        Ok(ll / filtered.nobs_used() as f64)
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        if theta.len() != self.n_params() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.n_params(),
                actual: theta.len(),
            });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        if data.y.len() != data.x.nrows() {
            return Err(OptError::DataLengthMismatch {
                response: data.y.len(),
                regressors: data.x.nrows(),
            });
        }
        let needed = self.n_params() + self.order.state_dim() + 1;
        if data.y.len() < needed {
            return Err(OptError::InsufficientData { needed, found: data.y.len() });
        }
        Ok(())
    }
}

/// A fitted ARIMAX model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaxFit {
    pub order: ArimaOrder,
    pub coefficients: Vec<CoefficientEstimate>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Likelihood terms after any diffuse burn-in.
    pub nobs: usize,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub initialization: Initialization,
    /// One-step-ahead innovations over the training sample.
    pub residuals: Vec<f64>,
    #[serde(skip)]
    n_exog: usize,
    #[serde(skip)]
    state_space: ArmaStateSpace,
    #[serde(skip)]
    next_state: Array1<f64>,
    #[serde(skip)]
    theta: Theta,
}

impl ArimaxFit {
    pub fn params(&self) -> &Theta {
        &self.theta
    }

    pub fn coefficient(&self, name: &str) -> Option<&CoefficientEstimate> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Dynamic forecasts for `exog.nrows()` periods after the sample.
    ///
    /// # Errors
    /// `DimensionMismatch` when `exog` has the wrong number of columns.
    pub fn forecast(&self, exog: &Array2<f64>) -> ArimaxResult<Array1<f64>> {
        if exog.ncols() != self.n_exog {
            return Err(ArimaxError::DimensionMismatch {
                what: "forecast exogenous columns",
                expected: self.n_exog,
                found: exog.ncols(),
            });
        }
        let c = self.theta[0];
        let beta = self.theta.slice(s![1..=self.n_exog]).to_owned();
        let errors = self.state_space.project(&self.next_state, exog.nrows());
        Ok(exog.dot(&beta) + Array1::from_vec(errors) + c)
    }
}
