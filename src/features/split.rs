//! split — chronological train/test partition of a [`FeatureFrame`].
//!
//! The first `⌊fraction · N⌋` rows train, the rest test. No shuffling, so
//! every training date precedes every test date.
use crate::features::{
    errors::{FeatureError, FeatureResult},
    transform::FeatureFrame,
};
use chrono::NaiveDate;
use ndarray::{Array1, Array2, s};

pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// One side of the split.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub dates: Vec<NaiveDate>,
    pub target: Array1<f64>,
    pub regressors: Array2<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub regressor_names: Vec<String>,
    pub train: Dataset,
    pub test: Dataset,
}

/// Split `frame` at `⌊fraction · N⌋`.
///
/// # Errors
/// - `InvalidSplit` unless `0 < fraction < 1` and both sides are
///   non-empty.
pub fn chronological_split(frame: &FeatureFrame, fraction: f64) -> FeatureResult<TrainTestSplit> {
    let n = frame.len();
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(FeatureError::InvalidSplit { fraction, nobs: n });
    }
    let cut = (fraction * n as f64).floor() as usize;
    if cut == 0 || cut >= n {
        return Err(FeatureError::InvalidSplit { fraction, nobs: n });
    }
    let side = |range: std::ops::Range<usize>| Dataset {
        dates: frame.dates[range.clone()].to_vec(),
        target: frame.target.slice(s![range.clone()]).to_owned(),
        regressors: frame.regressors.slice(s![range, ..]).to_owned(),
    };
    Ok(TrainTestSplit {
        regressor_names: frame.regressor_names.clone(),
        train: side(0..cut),
        test: side(cut..n),
    })
}
