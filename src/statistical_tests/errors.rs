//! Error type for the diagnostic test suite.
//!
//! `TestError` covers invalid inputs (too few observations, non-finite
//! values, lag orders out of range, bad tuning constants) and degenerate
//! statistics. Auxiliary regression failures are wrapped as-is.
use crate::regression::errors::RegressionError;

pub type TestResult<T> = Result<T, TestError>;

#[derive(Debug, Clone, PartialEq)]
pub enum TestError {
    //------ Input validation errors ------
    InsufficientData { needed: usize, found: usize },
    NonFiniteData { index: usize, value: f64 },
    InvalidLag { lag: usize, n: usize },
    InvalidTuning { name: &'static str, value: f64 },

    //------ Degenerate statistics ------
    ZeroTau { lag: usize },
    ConstantSeries,

    //------ Wrapped ------
    Regression(RegressionError),
}

impl std::error::Error for TestError {}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::InsufficientData { needed, found } => {
                write!(f, "Test needs at least {needed} observations, got {found}.")
            }
            TestError::NonFiniteData { index, value } => {
                write!(f, "Invalid data value {value} at index {index}. Must be a finite number.")
            }
            TestError::InvalidLag { lag, n } => {
                write!(f, "Invalid lag order {lag} for a series of length {n}.")
            }
            TestError::InvalidTuning { name, value } => {
                write!(f, "Invalid tuning constant {name} = {value}.")
            }
            TestError::ZeroTau { lag } => write!(f, "Zero τ̂ value at lag {lag}"),
            TestError::ConstantSeries => write!(f, "Series is constant; statistic undefined."),
            TestError::Regression(err) => write!(f, "Auxiliary regression failed: {err}"),
        }
    }
}

impl From<RegressionError> for TestError {
    fn from(err: RegressionError) -> Self {
        TestError::Regression(err)
    }
}
