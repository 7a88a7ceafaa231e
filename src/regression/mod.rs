//! regression — least squares for the MLR model and auxiliary regressions.
//!
//! - [`least_squares`]: the dense OLS kernel (`LeastSquares`), reused by
//!   every diagnostic test that needs an auxiliary regression.
//! - [`ols`]: the user-facing MLR estimator with named coefficients,
//!   t statistics, and selectable covariance.

pub mod errors;
pub mod least_squares;
pub mod ols;

// ---- Re-exports ----
pub use self::errors::{RegressionError, RegressionResult};
pub use self::least_squares::{LeastSquares, add_constant};
pub use self::ols::{CoefficientEstimate, INTERCEPT_NAME, OlsModel};
