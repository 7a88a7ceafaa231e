//! Error type for covariance estimation.
//!
//! `InferenceError` groups the failures of plug-in bandwidth selection,
//! heteroskedasticity-consistent sandwiches, and Hessian-based standard
//! errors. `InferenceResult<T>` is the matching alias.
use crate::optimization::errors::OptError;

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Bandwidth selection ----
    /// AR(1) fit used for the plug-in bandwidth is at or beyond a unit root.
    StationarityViolated { phi: f64 },

    /// Plug-in denominator is numerically zero.
    DenominatorTooSmall { denominator: f64 },

    /// Kernel order without a plug-in constant.
    OrderNotSupported { ord: usize },

    // ---- Sandwich estimators ----
    /// An observation has leverage `h_ii ≈ 1`, so HC2/HC3 weights blow up.
    LeverageOne { index: usize, leverage: f64 },

    /// Scores, design, or bread matrices disagree in shape.
    ShapeMismatch { what: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// No observations to aggregate.
    EmptyScores,

    // ---- Hessian ----
    /// Finite-difference Hessian could not be formed.
    Hessian(OptError),

    // ---- Anyhow catchall ----
    Anyhow(String),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        InferenceError::Anyhow(err.to_string())
    }
}

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::Hessian(err)
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::StationarityViolated { phi } => {
                write!(f, "Inference Error: AR(1) coefficient {phi} is not stationary")
            }
            InferenceError::DenominatorTooSmall { denominator } => write!(
                f,
                "Inference Error: bandwidth denominator {denominator} is numerically zero"
            ),
            InferenceError::OrderNotSupported { ord } => {
                write!(f, "Inference Error: kernel order {ord} has no plug-in rule")
            }
            InferenceError::LeverageOne { index, leverage } => write!(
                f,
                "Inference Error: observation {index} has leverage {leverage}, HC2/HC3 undefined"
            ),
            InferenceError::ShapeMismatch { what, expected, found } => write!(
                f,
                "Inference Error: {what} has shape {found:?}, expected {expected:?}"
            ),
            InferenceError::EmptyScores => write!(f, "Inference Error: no observations"),
            InferenceError::Hessian(err) => write!(f, "Inference Error: Hessian failed: {err}"),
            InferenceError::Anyhow(msg) => write!(f, "Inference Error: {msg}"),
        }
    }
}
