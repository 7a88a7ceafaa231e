//! Error type for forecast metrics.
pub type MetricResult<T> = Result<T, MetricError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    LengthMismatch { actual: usize, predicted: usize },
    Empty,
    NonFinite { index: usize },
}

impl std::error::Error for MetricError {}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricError::LengthMismatch { actual, predicted } => write!(
                f,
                "Metric inputs differ in length: {actual} actual vs {predicted} predicted"
            ),
            MetricError::Empty => write!(f, "Metric inputs are empty"),
            MetricError::NonFinite { index } => {
                write!(f, "Non-finite actual or predicted value at index {index}")
            }
        }
    }
}
