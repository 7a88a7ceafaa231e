//! search — pick the ARIMAX order with the best out-of-sample R².
//!
//! Purpose
//! -------
//! Fit every `(p, 0, q)` on the training split, forecast the test window
//! with the test exogenous rows, and keep the order whose forecasts have
//! the highest R².
//!
//! Key behaviors
//! -------------
//! - Candidates run on the rayon pool when `parallel` is set. Results are
//!   collected in grid order either way, so the outcome does not depend on
//!   scheduling.
//! - A candidate that fails to estimate, stops before the optimizer
//!   converges, or has an undefined R² is logged and recorded in
//!   `failures`; the search continues.
//! - Ties on R² go to the first order in p-major grid order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Test and training exogenous matrices have the same columns.
use crate::{
    arimax::{
        errors::{ArimaxError, ArimaxResult},
        model::{ArimaxData, ArimaxFit, ArimaxModel},
        order::ArimaOrder,
    },
    evaluation::r_squared,
    features::{Dataset, TrainTestSplit},
    optimization::loglik_optimizer::MLEOptions,
};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSearchOptions {
    pub max_p: usize,
    pub max_q: usize,
    pub parallel: bool,
    pub mle: MLEOptions,
}

impl Default for OrderSearchOptions {
    fn default() -> Self {
        Self { max_p: 3, max_q: 3, parallel: false, mle: MLEOptions::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub order: ArimaOrder,
    pub r_squared: f64,
    pub aic: f64,
    pub bic: f64,
    pub log_likelihood: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    pub order: ArimaOrder,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSearchOutcome {
    /// Successful candidates, best first.
    pub ranked: Vec<CandidateScore>,
    pub failures: Vec<CandidateFailure>,
    pub best: ArimaxFit,
    pub best_r_squared: f64,
    /// Forecasts of `best` over the test window.
    pub best_forecast: Vec<f64>,
}

struct Candidate {
    fit: ArimaxFit,
    forecast: Vec<f64>,
    r_squared: f64,
}

/// Grid search over `(p, q) ∈ [0, max_p] × [0, max_q]`.
///
/// # Errors
/// - `NoCandidates` when every order fails.
pub fn search_orders(
    split: &TrainTestSplit, opts: &OrderSearchOptions,
) -> ArimaxResult<OrderSearchOutcome> {
    let grid = ArimaOrder::grid(opts.max_p, opts.max_q);
    let train = ArimaxData::new(split.train.target.clone(), split.train.regressors.clone())?;
    let names = &split.regressor_names;

    let run = |order: &ArimaOrder| (*order, evaluate(*order, names, &train, &split.test, &opts.mle));
    let results: Vec<(ArimaOrder, ArimaxResult<Candidate>)> = if opts.parallel {
        grid.par_iter().map(&run).collect()
    } else {
        grid.iter().map(&run).collect()
    };

    let mut failures = Vec::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    for (order, result) in results {
        match result {
            Ok(candidate) if !candidate.fit.converged => {
                warn!(
                    order = %order,
                    status = %candidate.fit.status,
                    iterations = candidate.fit.iterations,
                    "ARIMAX candidate did not converge"
                );
                failures.push(CandidateFailure {
                    order,
                    reason: format!("optimizer did not converge: {}", candidate.fit.status),
                });
            }
            Ok(candidate) if candidate.r_squared.is_finite() => {
                debug!(
                    order = %order,
                    r_squared = candidate.r_squared,
                    aic = candidate.fit.aic,
                    "ARIMAX candidate scored"
                );
                candidates.push(candidate);
            }
            Ok(_) => {
                warn!(order = %order, "ARIMAX candidate has undefined out-of-sample R²");
                failures.push(CandidateFailure {
                    order,
                    reason: "out-of-sample R² undefined".to_string(),
                });
            }
            Err(err) => {
                warn!(order = %order, error = %err, "ARIMAX candidate failed");
                failures.push(CandidateFailure { order, reason: err.to_string() });
            }
        }
    }

    let mut ranked: Vec<CandidateScore> = candidates
        .iter()
        .map(|c| CandidateScore {
            order: c.fit.order,
            r_squared: c.r_squared,
            aic: c.fit.aic,
            bic: c.fit.bic,
            log_likelihood: c.fit.log_likelihood,
        })
        .collect();
    ranked.sort_by(|a, b| b.r_squared.partial_cmp(&a.r_squared).unwrap_or(Ordering::Equal));

    let best_idx = first_max(candidates.iter().map(|c| c.r_squared))
        .ok_or(ArimaxError::NoCandidates { attempted: grid.len() })?;
    let best = candidates.swap_remove(best_idx);

    info!(
        order = %best.fit.order,
        r_squared = best.r_squared,
        failed = failures.len(),
        "ARIMAX order selected"
    );
    Ok(OrderSearchOutcome {
        ranked,
        failures,
        best_r_squared: best.r_squared,
        best_forecast: best.forecast,
        best: best.fit,
    })
}

// ---- Helper methods ----

/// Index of the first strict maximum, so ties keep the earliest entry.
fn first_max(scores: impl Iterator<Item = f64>) -> Option<usize> {
    scores
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((i, score)),
        })
        .map(|(i, _)| i)
}

fn evaluate(
    order: ArimaOrder, names: &[String], train: &ArimaxData, test: &Dataset, mle: &MLEOptions,
) -> ArimaxResult<Candidate> {
    let fit = ArimaxModel::new(order, names.len()).fit(names, train, mle)?;
    let forecast = fit.forecast(&test.regressors)?.to_vec();
    let r_squared = r_squared(&test.target.to_vec(), &forecast)?;
    Ok(Candidate { fit, forecast, r_squared })
}
