//! inference — standard errors for fitted regressions and likelihood models.
//!
//! Purpose
//! -------
//! Post-estimation uncertainty for the two estimators in this crate:
//! sandwich covariances (HC0–HC3, HAC) for OLS coefficients and
//! pseudo-inverse information covariances for ARIMAX maximum likelihood.
//!
//! Key behaviors
//! -------------
//! - [`CovarianceType`] selects the OLS estimator; [`ols_covariance`]
//!   evaluates it.
//! - [`HACOptions`] and [`KernelType`] configure Newey–West style
//!   long-run covariances, with Andrews plug-in bandwidths by default.
//! - [`covariance_from_information`] inverts an observed information
//!   matrix, truncating directions with eigenvalues below `EIGEN_EPS`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Score matrices are `n × p` with rows indexing time.
//! - All routines return [`InferenceError`] instead of panicking.
//!
//! Conventions
//! -----------
//! - No logging or I/O. Callers decide how to surface failures.

pub mod errors;
pub mod hac;
pub mod hessian;
pub mod kernel;
pub mod sandwich;

// ---- Re-exports ----
pub use self::errors::{InferenceError, InferenceResult};
pub use self::hac::{HACOptions, calculate_avg_scores_cov};
pub use self::hessian::{
    PseudoInverse, covariance_from_information, observed_information, standard_errors,
};
pub use self::kernel::KernelType;
pub use self::sandwich::{CovarianceType, OlsDesign, leverages, ols_covariance};

pub mod prelude {
    pub use super::{
        CovarianceType, HACOptions, InferenceError, InferenceResult, KernelType,
        covariance_from_information, ols_covariance, standard_errors,
    };
}
