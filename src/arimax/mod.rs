//! arimax — regression with ARMA errors, by exact maximum likelihood.
//!
//! Purpose
//! -------
//! The time-series competitor to the MLR model: the same covariates, with
//! serial dependence in the error modeled as ARMA(p, q).
//!
//! Key behaviors
//! -------------
//! - [`kalman`]: Harvey state-space form, stationary or diffuse start, and
//!   the concentrated Gaussian likelihood.
//! - [`model`]: [`ArimaxModel`] implements
//!   [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood)
//!   and is maximized with L-BFGS; [`ArimaxFit`] forecasts.
//! - [`search`]: out-of-sample R² grid search over `(p, q)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `d = 0` always; any differencing happens in feature construction.

pub mod errors;
pub mod kalman;
pub mod model;
pub mod order;
pub mod search;

// ---- Re-exports ----
pub use self::errors::{ArimaxError, ArimaxResult};
pub use self::kalman::{ArmaStateSpace, FilterOutput, Initialization};
pub use self::model::{ArimaxData, ArimaxFit, ArimaxModel};
pub use self::order::ArimaOrder;
pub use self::search::{
    CandidateFailure, CandidateScore, OrderSearchOptions, OrderSearchOutcome, search_orders,
};
