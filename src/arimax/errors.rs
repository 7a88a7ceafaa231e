//! Error type for ARIMAX estimation, forecasting, and order search.
use crate::{
    evaluation::errors::MetricError, optimization::errors::OptError,
    regression::errors::RegressionError,
};

pub type ArimaxResult<T> = Result<T, ArimaxError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ArimaxError {
    /// Only `d = 0` is estimated; inputs are differenced upstream.
    InvalidOrder { p: usize, d: usize, q: usize },

    /// Likelihood maximization failed (configuration, filtering, or solver).
    EstimationFailure(OptError),

    /// Exogenous design or response has the wrong shape.
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    /// OLS start values could not be computed.
    StartValues(RegressionError),

    /// Out-of-sample scoring failed.
    Scoring(MetricError),

    /// Every candidate order failed.
    NoCandidates { attempted: usize },
}

impl std::error::Error for ArimaxError {}

impl std::fmt::Display for ArimaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArimaxError::InvalidOrder { p, d, q } => {
                write!(f, "ARIMAX order ({p}, {d}, {q}) not supported: d must be 0")
            }
            ArimaxError::EstimationFailure(err) => write!(f, "ARIMAX estimation failed: {err}"),
            ArimaxError::DimensionMismatch { what, expected, found } => {
                write!(f, "ARIMAX {what}: expected {expected}, found {found}")
            }
            ArimaxError::StartValues(err) => write!(f, "ARIMAX start values failed: {err}"),
            ArimaxError::Scoring(err) => write!(f, "ARIMAX forecast scoring failed: {err}"),
            ArimaxError::NoCandidates { attempted } => {
                write!(f, "All {attempted} ARIMAX candidate orders failed")
            }
        }
    }
}

impl From<OptError> for ArimaxError {
    fn from(err: OptError) -> Self {
        ArimaxError::EstimationFailure(err)
    }
}

impl From<RegressionError> for ArimaxError {
    fn from(err: RegressionError) -> Self {
        ArimaxError::StartValues(err)
    }
}

impl From<MetricError> for ArimaxError {
    fn from(err: MetricError) -> Self {
        ArimaxError::Scoring(err)
    }
}
