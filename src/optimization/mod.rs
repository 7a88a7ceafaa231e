//! optimization — likelihood maximization and shared numeric guards.
//!
//! Purpose
//! -------
//! Provide the optimizer used by the ARIMAX estimator together with a
//! single error surface and the numeric thresholds shared with inference
//! and filtering code.
//!
//! Key behaviors
//! -------------
//! - [`loglik_optimizer`]: L-BFGS maximization of user log-likelihoods with
//!   finite-difference fallbacks.
//! - [`numerical_stability`]: tolerances (`EIGEN_EPS`, `GENERAL_TOL`,
//!   `STATIONARITY_MARGIN`, `RANK_TOL`) and small matrix guards.
//! - [`errors`]: `OptError` / `OptResult`, including recovery of model
//!   errors that travelled through Argmin.
//!
//! Conventions
//! -----------
//! - Public APIs speak in terms of `ℓ(θ)`; the cost `-ℓ(θ)` never leaks.
//! - No I/O and no logging here. Callers decide what to report.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
