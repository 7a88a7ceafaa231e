//! Error type for least-squares estimation and prediction.
use crate::inference::errors::InferenceError;

pub type RegressionResult<T> = Result<T, RegressionError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// `X'X` is not invertible (perfect collinearity or a zero column).
    SingularDesign { min_eigen_ratio: f64 },

    /// Fewer observations than parameters (plus the degrees of freedom the
    /// caller asked for).
    InsufficientObservations { nobs: usize, needed: usize },

    /// Response and design disagree on the number of rows, or a prediction
    /// design has the wrong number of columns.
    DimensionMismatch { expected: usize, found: usize, what: &'static str },

    /// Non-finite value in the design.
    NonFiniteInput { row: usize, col: usize, value: f64 },

    /// Non-finite value in the response.
    NonFiniteResponse { row: usize, value: f64 },

    /// Robust covariance could not be formed.
    Covariance(InferenceError),
}

impl std::error::Error for RegressionError {}

impl std::fmt::Display for RegressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegressionError::SingularDesign { min_eigen_ratio } => write!(
                f,
                "Singular design matrix: smallest scaled eigenvalue ratio {min_eigen_ratio:e}"
            ),
            RegressionError::InsufficientObservations { nobs, needed } => {
                write!(f, "Regression needs at least {needed} observations, got {nobs}")
            }
            RegressionError::DimensionMismatch { expected, found, what } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}")
            }
            RegressionError::NonFiniteInput { row, col, value } => {
                write!(f, "Non-finite regression input {value} at row {row}, column {col}")
            }
            RegressionError::NonFiniteResponse { row, value } => {
                write!(f, "Non-finite response value {value} at row {row}")
            }
            RegressionError::Covariance(err) => write!(f, "Covariance estimation failed: {err}"),
        }
    }
}

impl From<InferenceError> for RegressionError {
    fn from(err: InferenceError) -> Self {
        RegressionError::Covariance(err)
    }
}
