//! HAC kernels and Andrews (1991) plug-in bandwidths.
//!
//! Weights are evaluated at `x = k / (L + 1)` for lag `k` and bandwidth `L`.
//! The plug-in rule fits an AR(1) to each score column with the `arima`
//! crate, aggregates the `α(q)` ratio, and falls back to `round(n^{1/4})`
//! whenever that step is unstable.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::{GENERAL_TOL, STATIONARITY_MARGIN},
};
use arima::estimate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelType {
    IID,
    Bartlett,
    Parzen,
    QuadraticSpectral,
}

impl KernelType {
    /// Kernel weight `w(x)`.
    pub fn weight(&self, x: f64) -> f64 {
        let a = x.abs();
        match self {
            KernelType::IID => {
                if x == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            KernelType::Bartlett => (1.0 - a).max(0.0),
            KernelType::Parzen => match a {
                a if a <= 0.5 => 1.0 - 6.0 * a * a + 6.0 * a * a * a,
                a if a <= 1.0 => 2.0 * (1.0 - a).powi(3),
                _ => 0.0,
            },
            KernelType::QuadraticSpectral => {
                if x == 0.0 {
                    return 1.0;
                }
                let z = 6.0 * PI * x / 5.0;
                25.0 / (12.0 * PI * PI * x * x) * (z.sin() / z - z.cos())
            }
        }
    }

    /// `(q, c, r)` such that `L = c · (n α(q))^{r}`.
    fn plug_in_constants(&self) -> Option<(usize, f64, f64)> {
        match self {
            KernelType::IID => None,
            KernelType::Bartlett => Some((1, 1.1447, 1.0 / 3.0)),
            KernelType::Parzen => Some((2, 2.6614, 1.0 / 5.0)),
            KernelType::QuadraticSpectral => Some((2, 1.3221, 1.0 / 5.0)),
        }
    }

    /// Plug-in bandwidth for an `n × p` score matrix (rows are time).
    ///
    /// `IID` always returns 0. The caller truncates to `n − 1`.
    pub fn optimal_bandwidth(&self, scores: &Array2<f64>) -> usize {
        let n = scores.nrows() as f64;
        let Some((ord, constant, rate)) = self.plug_in_constants() else {
            return 0;
        };
        match ar1_alpha(scores, ord) {
            Ok(alpha) => (constant * (n * alpha).powf(rate)).round() as usize,
            Err(_) => n.powf(0.25).round() as usize,
        }
    }
}

/// Aggregate `α(q)` across score columns from per-column AR(1) fits.
fn ar1_alpha(scores: &Array2<f64>, ord: usize) -> InferenceResult<f64> {
    let (mut num, mut den) = (0.0, 0.0);
    for column in scores.columns() {
        let series = column.to_vec();
        let coeffs = estimate::fit(&series, 1, 0, 0)?;
        let (intercept, phi) = (coeffs[0], coeffs[1]);
        if phi.abs() >= 1.0 - STATIONARITY_MARGIN {
            return Err(InferenceError::StationarityViolated { phi });
        }
        let resid = estimate::residuals(&series, intercept, Some(&[phi]), None)?;
        let sigma2 = resid.iter().map(|e| e * e).sum::<f64>() / (resid.len() - 1) as f64;
        let sigma4 = sigma2 * sigma2;
        let phi2 = phi * phi;

        den += sigma4 / (1.0 - phi2).powi(4);
        num += match ord {
            1 => 4.0 * phi2 * sigma4 / ((1.0 - phi).powi(6) * (1.0 + phi).powi(2)),
            2 => 4.0 * phi2 * sigma4 / (1.0 - phi).powi(8),
            _ => return Err(InferenceError::OrderNotSupported { ord }),
        };
    }
    if den < GENERAL_TOL {
        return Err(InferenceError::DenominatorTooSmall { denominator: den });
    }
    Ok(num / den)
}
