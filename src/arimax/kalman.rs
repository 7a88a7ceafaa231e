//! kalman — exact Gaussian likelihood of an ARMA(p, q) error process.
//!
//! Purpose
//! -------
//! Cast the regression error `u_t = y_t − c − x_tβ` as an ARMA(p, q) in
//! Harvey state-space form and run the Kalman filter to obtain one-step
//! innovations, their variances, and the concentrated log-likelihood.
//!
//! Key behaviors
//! -------------
//! - State dimension `r = max(p, q + 1)`; transition `T` carries `φ` in its
//!   first column and ones on the superdiagonal; selection `R = [1, θ₁, …]`;
//!   observation picks the first state element.
//! - The filter runs with unit innovation variance. The scale `σ²` is
//!   concentrated out: `σ̂² = (1/m) Σ v_t² / F_t`.
//! - Initial covariance solves `P = T P Tᵀ + R Rᵀ` by doubling. When the
//!   AR part is non-stationary the doubling does not settle and a diffuse
//!   start `κ·I` is used instead, with the first `r` terms left out of the
//!   likelihood.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every prediction variance `F_t` must be finite and strictly positive;
//!   otherwise the filter stops with `InvalidPredictionVariance`.
//! - Pure functions; nothing is logged.
use crate::optimization::{
    errors::{OptError, OptResult},
    numerical_stability::{GENERAL_TOL, max_abs, symmetrize},
};
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::f64::consts::PI;

/// Prior variance scale of a diffuse start.
pub const DIFFUSE_KAPPA: f64 = 1e6;

const MAX_DOUBLINGS: usize = 64;
const DIVERGENCE_LIMIT: f64 = 1e10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Initialization {
    Stationary,
    Diffuse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmaStateSpace {
    transition: Array2<f64>,
    selection: Array1<f64>,
}

/// Everything a caller needs after one filtering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    pub innovations: Vec<f64>,
    pub variances: Vec<f64>,
    pub initialization: Initialization,
    /// Leading terms excluded from the likelihood.
    pub burn: usize,
    /// Predicted state for the first period after the sample.
    pub next_state: Array1<f64>,
}

impl FilterOutput {
    /// Number of likelihood terms `m`.
    pub fn nobs_used(&self) -> usize {
        self.innovations.len().saturating_sub(self.burn)
    }

    /// Concentrated scale `σ̂²`.
    pub fn sigma2(&self) -> f64 {
        let m = self.nobs_used();
        if m == 0 {
            return f64::NAN;
        }
        let ss: f64 = self
            .innovations
            .iter()
            .zip(&self.variances)
            .skip(self.burn)
            .map(|(v, f)| v * v / f)
            .sum();
        ss / m as f64
    }

    /// Concentrated Gaussian log-likelihood over the `m` retained terms.
    pub fn log_likelihood(&self) -> f64 {
        let m = self.nobs_used() as f64;
        let sigma2 = self.sigma2();
        let sum_log_f: f64 = self.variances.iter().skip(self.burn).map(|f| f.ln()).sum();
        -0.5 * m * ((2.0 * PI).ln() + 1.0 + sigma2.ln()) - 0.5 * sum_log_f
    }
}

impl ArmaStateSpace {
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let r = ar.len().max(ma.len() + 1);
        let mut transition = Array2::zeros((r, r));
        for (i, &phi) in ar.iter().enumerate() {
            transition[[i, 0]] = phi;
        }
        for i in 0..r - 1 {
            transition[[i, i + 1]] = 1.0;
        }
        let mut selection = Array1::zeros(r);
        selection[0] = 1.0;
        for (j, &theta) in ma.iter().enumerate() {
            selection[j + 1] = theta;
        }
        Self { transition, selection }
    }

    pub fn dim(&self) -> usize {
        self.selection.len()
    }

    /// Initial `(P₀, initialization)` for a zero initial state mean.
    pub fn initial_covariance(&self) -> (Array2<f64>, Initialization) {
        let q = self.state_noise();
        match stationary_covariance(&self.transition, &q) {
            Some(p) => (p, Initialization::Stationary),
            None => (Array2::eye(self.dim()) * DIFFUSE_KAPPA, Initialization::Diffuse),
        }
    }

    /// Filter the regression errors `u`.
    ///
    /// # Errors
    /// - `InsufficientData` when `u` does not outlast the burn-in.
    /// - `InvalidPredictionVariance { t, value }` for the first `F_t` that is
    ///   non-finite or not strictly positive.
    pub fn filter(&self, u: &[f64]) -> OptResult<FilterOutput> {
        let r = self.dim();
        let (mut p, initialization) = self.initial_covariance();
        let burn = match initialization {
            Initialization::Stationary => 0,
            Initialization::Diffuse => r,
        };
        if u.len() <= burn {
            return Err(OptError::InsufficientData { needed: burn + 1, found: u.len() });
        }

        let q = self.state_noise();
        let t_mat = &self.transition;
        let mut a = Array1::<f64>::zeros(r);
        let mut innovations = Vec::with_capacity(u.len());
        let mut variances = Vec::with_capacity(u.len());

        for (t, &obs) in u.iter().enumerate() {
            let f = p[[0, 0]];
            if !f.is_finite() || f <= GENERAL_TOL {
                return Err(OptError::InvalidPredictionVariance { t, value: f });
            }
            let v = obs - a[0];
            let gain = t_mat.dot(&p.column(0)) / f;

            a = t_mat.dot(&a) + &gain * v;
            let outer = gain
                .view()
                .insert_axis(ndarray::Axis(1))
                .dot(&gain.view().insert_axis(ndarray::Axis(0)));
            p = t_mat.dot(&p).dot(&t_mat.t()) - outer * f + &q;
            symmetrize(&mut p);

            innovations.push(v);
            variances.push(f);
        }

        Ok(FilterOutput { innovations, variances, initialization, burn, next_state: a })
    }

    /// Expected errors `E[u_{n+h} | 𝓕_n]`, `h = 1..=horizon`, from the
    /// post-sample predicted state.
    pub fn project(&self, next_state: &Array1<f64>, horizon: usize) -> Vec<f64> {
        let mut a = next_state.clone();
        let mut out = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            out.push(a[0]);
            a = self.transition.dot(&a);
        }
        out
    }

    // ---- Helper methods ----

    fn state_noise(&self) -> Array2<f64> {
        let col = self.selection.view().insert_axis(ndarray::Axis(1));
        col.dot(&col.t())
    }
}

/// Solve `P = T P Tᵀ + Q` by doubling: `P ← P + A P Aᵀ`, `A ← A²`.
///
/// Returns `None` when `A` fails to vanish or `P` diverges, which is the
/// case exactly when `T` has an eigenvalue on or outside the unit circle
/// (up to the iteration cap).
fn stationary_covariance(t: &Array2<f64>, q: &Array2<f64>) -> Option<Array2<f64>> {
    let mut a = t.clone();
    let mut p = q.clone();
    for _ in 0..MAX_DOUBLINGS {
        p = &p + &a.dot(&p).dot(&a.t());
        a = a.dot(&a);
        let size = max_abs(&p);
        if !(size.is_finite() && size <= DIVERGENCE_LIMIT) {
            return None;
        }
        if max_abs(&a) <= GENERAL_TOL {
            symmetrize(&mut p);
            return Some(p);
        }
    }
    None
}
