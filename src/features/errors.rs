//! Error type for feature construction and splitting.
use crate::statistical_tests::errors::TestError;
use chrono::NaiveDate;

pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    NonPositivePrice { date: NaiveDate, value: f64 },
    InsufficientObservations { needed: usize, found: usize },
    InvalidSplit { fraction: f64, nobs: usize },
    /// A derived series broke a [`TimeSeries`](crate::data::TimeSeries) invariant.
    InvalidSeries(String),
    /// Stationarity or multicollinearity diagnostics failed.
    Diagnostics(TestError),
}

impl std::error::Error for FeatureError {}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureError::NonPositivePrice { date, value } => {
                write!(f, "Non-positive price {value} on {date}; log return undefined")
            }
            FeatureError::InsufficientObservations { needed, found } => {
                write!(f, "Need at least {needed} observations, got {found}")
            }
            FeatureError::InvalidSplit { fraction, nobs } => write!(
                f,
                "Split fraction {fraction} leaves an empty train or test set for {nobs} rows"
            ),
            FeatureError::InvalidSeries(msg) => write!(f, "Derived series is invalid: {msg}"),
            FeatureError::Diagnostics(err) => write!(f, "Feature diagnostics failed: {err}"),
        }
    }
}

impl From<TestError> for FeatureError {
    fn from(err: TestError) -> Self {
        FeatureError::Diagnostics(err)
    }
}
