//! macro_regression — MLR vs. ARIMAX forecasts of index log returns.
//!
//! Purpose
//! -------
//! Serve as the crate root for a batch econometric comparison: load an
//! equity index together with inflation (KPI), the USD/NOK exchange rate,
//! and a zero-coupon yield; diagnose and transform the covariates; fit a
//! multiple linear regression and a regression with ARMA errors on the
//! first 80% of the sample; and score both on the remainder.
//!
//! Key behaviors
//! -------------
//! - [`data`] reads semicolon CSV exports, upsamples monthly inflation to
//!   daily, and inner-joins all sources into an aligned panel.
//! - [`features`] builds log returns, differences covariates that fail the
//!   ADF test or inflate VIFs, lags them one period, and splits
//!   chronologically.
//! - [`statistical_tests`] holds ADF, correlation/VIF, Breusch–Godfrey,
//!   ARCH-LM, and Escanciano–Lobato.
//! - [`regression`] and [`inference`] fit OLS with classical,
//!   HC0–HC3, or HAC covariance.
//! - [`arimax`] and [`optimization`] estimate ARIMAX(p, 0, q) by exact
//!   Kalman-filter likelihood and search the order grid.
//! - [`evaluation`] computes MAPE, MSE, MAE, and R².
//! - [`pipeline`] runs the stages into an [`pipeline::AnalysisReport`];
//!   [`report`] renders it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every stage consumes immutable inputs and returns a new value; no
//!   panel is shared or mutated across stages.
//! - Numerical modules never log or print; the pipeline and loader emit
//!   `tracing` events.
//!
//! Downstream usage
//! ----------------
//! - The `macro_regression` binary is a thin clap front end over
//!   [`pipeline::run_analysis`] and [`report`].
//! - Library callers can run individual stages, e.g. fit
//!   [`arimax::ArimaxModel`] on their own data.

pub mod arimax;
pub mod config;
pub mod data;
pub mod evaluation;
pub mod features;
pub mod inference;
pub mod optimization;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod statistical_tests;

pub mod prelude {
    pub use crate::arimax::{ArimaOrder, ArimaxData, ArimaxFit, ArimaxModel, search_orders};
    pub use crate::config::AnalysisConfig;
    pub use crate::data::{AlignedPanel, SourcePaths, TimeSeries};
    pub use crate::evaluation::{ForecastMetrics, ForecastResult, evaluate};
    pub use crate::features::{FeatureFrame, TrainTestSplit, chronological_split};
    pub use crate::inference::{CovarianceType, HACOptions};
    pub use crate::optimization::prelude::*;
    pub use crate::pipeline::{AnalysisReport, PipelineError, run_analysis};
    pub use crate::regression::OlsModel;
}
