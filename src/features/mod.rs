//! features — from aligned panel to estimation-ready train/test data.
//!
//! - [`transform`]: log returns, the stationarity/VIF differencing policy,
//!   and the one-row covariate lag.
//! - [`split`]: chronological 80/20 partition.

pub mod errors;
pub mod split;
pub mod transform;

// ---- Re-exports ----
pub use self::errors::{FeatureError, FeatureResult};
pub use self::split::{DEFAULT_TRAIN_FRACTION, Dataset, TrainTestSplit, chronological_split};
pub use self::transform::{
    DifferenceReason, FeatureFrame, TransformDecision, TransformOptions, TransformPolicy,
    build_features, first_difference, log_returns,
};
