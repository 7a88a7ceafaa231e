//! evaluation — forecast accuracy metrics (MAPE, MSE, MAE, R²).

pub mod errors;
pub mod metrics;

// ---- Re-exports ----
pub use self::errors::{MetricError, MetricResult};
pub use self::metrics::{
    ForecastMetrics, ForecastPoint, ForecastResult, MetricWarning, evaluate, r_squared,
};
