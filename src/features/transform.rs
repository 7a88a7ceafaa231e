//! transform — log returns, stationarizing differences, and the one-period
//! covariate lag.
//!
//! Purpose
//! -------
//! Apply one documented policy to the aligned panel so that the MLR and
//! ARIMAX estimators see identical regressors.
//!
//! Key behaviors
//! -------------
//! Under [`TransformPolicy::Adaptive`]:
//! 1. ADF on each covariate level, once. Non-stationary covariates are
//!    first-differenced; the decision is never revisited.
//! 2. VIF on the resulting lagged design. If any VIF reaches the
//!    threshold, every covariate not yet differenced is differenced once.
//!    The VIF uses every feature row, before the train/test split, so both
//!    sides of the split share one decision.
//! 3. Every covariate is lagged one row: row `t` uses `x(t − 1)`.
//! 4. Rows without a complete lagged history are dropped.
//!
//! `Levels` and `ForceDifference` skip the decisions (ADF is still run
//! and recorded).
//!
//! Invariants & assumptions
//! ------------------------
//! - A covariate is differenced at most once.
//! - `regressors[[i, j]]` equals the transformed covariate `j` on the
//!   panel row preceding `dates[i]`.
use crate::{
    data::{AlignedPanel, Covariate, TimeSeries},
    features::errors::{FeatureError, FeatureResult},
    statistical_tests::{
        AdfOutcome, VifEntry, adf_test, multicollinearity::any_flagged, variance_inflation_factors,
    },
};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransformPolicy {
    #[default]
    Adaptive,
    Levels,
    ForceDifference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceReason {
    None,
    UnitRoot,
    Multicollinearity,
    Forced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformDecision {
    pub covariate: Covariate,
    pub adf: AdfOutcome,
    pub differenced: bool,
    pub reason: DifferenceReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOptions {
    pub policy: TransformPolicy,
    pub alpha: f64,
    pub vif_threshold: f64,
    pub adf_max_lag: Option<usize>,
}

/// Target and lagged regressors ready for estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFrame {
    pub dates: Vec<NaiveDate>,
    #[serde(skip)]
    pub target: Array1<f64>,
    pub regressor_names: Vec<String>,
    #[serde(skip)]
    pub regressors: Array2<f64>,
    pub decisions: Vec<TransformDecision>,
    pub initial_vif: Vec<VifEntry>,
    pub final_vif: Vec<VifEntry>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// `ln(P_t / P_{t−1})` over consecutive rows, dated at `t`.
///
/// # Errors
/// - `InsufficientObservations` for fewer than two prices.
/// - `NonPositivePrice` for any price ≤ 0.
pub fn log_returns(prices: &TimeSeries) -> FeatureResult<TimeSeries> {
    if prices.len() < 2 {
        return Err(FeatureError::InsufficientObservations { needed: 2, found: prices.len() });
    }
    if let Some((date, value)) = prices.iter().find(|(_, p)| *p <= 0.0) {
        return Err(FeatureError::NonPositivePrice { date, value });
    }
    let v = prices.values();
    let returns = v.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    TimeSeries::new(prices.name(), prices.dates()[1..].to_vec(), returns)
        .map_err(|err| FeatureError::InvalidSeries(err.to_string()))
}

/// `x_t − x_{t−1}`; the result is one element shorter.
pub fn first_difference(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Apply the transform policy to the panel.
///
/// # Errors
/// - `InsufficientObservations` if fewer than `k + 4` rows survive.
/// - `Diagnostics` if ADF or VIF cannot be computed.
pub fn build_features(panel: &AlignedPanel, opts: &TransformOptions) -> FeatureResult<FeatureFrame> {
    let mut decisions = Vec::with_capacity(Covariate::ALL.len());
    for cov in Covariate::ALL {
        let adf = adf_test(cov.name(), panel.covariate(cov), opts.adf_max_lag, opts.alpha)?;
        let (differenced, reason) = match opts.policy {
            TransformPolicy::Levels => (false, DifferenceReason::None),
            TransformPolicy::ForceDifference => (true, DifferenceReason::Forced),
            TransformPolicy::Adaptive if adf.is_stationary() => (false, DifferenceReason::None),
            TransformPolicy::Adaptive => (true, DifferenceReason::UnitRoot),
        };
        info!(
            covariate = cov.name(),
            adf_stat = adf.statistic,
            p_value = adf.p_value,
            differenced,
            "stationarity decision"
        );
        decisions.push(TransformDecision { covariate: cov, adf, differenced, reason });
    }

    let names: Vec<String> = Covariate::ALL.iter().map(|c| c.name().to_string()).collect();
    let (_, design) = lagged_design(panel, &decisions);
    let initial_vif = variance_inflation_factors(&names, &design, opts.vif_threshold)?;

    let mut final_vif = initial_vif.clone();
    if opts.policy == TransformPolicy::Adaptive && any_flagged(&initial_vif) {
        for d in decisions.iter_mut().filter(|d| !d.differenced) {
            d.differenced = true;
            d.reason = DifferenceReason::Multicollinearity;
            info!(covariate = d.covariate.name(), "differenced after VIF check");
        }
        let (_, design) = lagged_design(panel, &decisions);
        final_vif = variance_inflation_factors(&names, &design, opts.vif_threshold)?;
    }

    let (start, regressors) = lagged_design(panel, &decisions);
    let k = names.len();
    if regressors.nrows() < k + 4 {
        return Err(FeatureError::InsufficientObservations { needed: k + 5 + start, found: panel.len() });
    }
    let first = start + 1;
    Ok(FeatureFrame {
        dates: panel.dates[first..].to_vec(),
        target: Array1::from_iter(panel.log_return[first..].iter().copied()),
        regressor_names: names,
        regressors,
        decisions,
        initial_vif,
        final_vif,
    })
}

// ---- Helper methods ----

/// Transformed covariates for panel rows `start..`, where `start` is 1 if
/// anything was differenced.
fn transformed_design(panel: &AlignedPanel, decisions: &[TransformDecision]) -> (usize, Array2<f64>) {
    let start = usize::from(decisions.iter().any(|d| d.differenced));
    let n = panel.len();
    let columns: Vec<Vec<f64>> = decisions
        .iter()
        .map(|d| {
            let raw = panel.covariate(d.covariate);
            if d.differenced {
                first_difference(raw)
            } else {
                raw[start..].to_vec()
            }
        })
        .collect();
    let rows = n - start;
    (start, Array2::from_shape_fn((rows, columns.len()), |(i, j)| columns[j][i]))
}

/// Transformed covariates lagged one row: row `i` pairs with panel row
/// `start + 1 + i` and holds the covariates of row `start + i`.
fn lagged_design(panel: &AlignedPanel, decisions: &[TransformDecision]) -> (usize, Array2<f64>) {
    let (start, unlagged) = transformed_design(panel, decisions);
    let rows = unlagged.nrows().saturating_sub(1);
    (start, unlagged.slice(ndarray::s![..rows, ..]).to_owned())
}
