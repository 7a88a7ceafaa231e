//! Error surface for the optimization layer.
//!
//! Every failure that can occur while maximizing a log-likelihood (bad
//! configuration, non-finite evaluations, backend solver errors, model-level
//! domain violations raised from inside `ℓ(θ)`) is normalized into
//! [`OptError`] so that model code never has to match on Argmin types.
use argmin::core::{ArgminError, Error};

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Signals that the caller should fall back to finite differences.
    GradientNotImplemented,

    /// Gradient length differs from the parameter length.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient entry is NaN or infinite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- MLEOptions ----
    InvalidTolGrad { tol: f64, reason: &'static str },
    InvalidTolCost { tol: f64, reason: &'static str },
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    NoTolerancesProvided,
    InvalidLineSearch { name: String, reason: &'static str },
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective ----
    /// Objective returned NaN or an infinity.
    NonFiniteCost { value: f64 },

    /// Parameter vector handed to the objective has the wrong length.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Parameter vector handed to the objective has a non-finite entry.
    InvalidThetaInput { index: usize, value: f64 },

    /// Response and regressor payloads disagree on the number of rows.
    DataLengthMismatch { response: usize, regressors: usize },

    /// Too few observations to evaluate the likelihood.
    InsufficientData { needed: usize, found: usize },

    /// A one-step prediction variance collapsed to zero, went negative, or
    /// overflowed during filtering.
    InvalidPredictionVariance { t: usize, value: f64 },

    // ---- Optimizer outcome ----
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },
    MissingThetaHat,

    // ---- Argmin ----
    InvalidParameter { text: String },
    NotImplemented { text: String },
    NotInitialized { text: String },
    ConditionViolated { text: String },
    CheckPointNotFound { text: String },
    PotentialBug { text: String },
    ImpossibleError { text: String },
    BackendError { text: String },

    // ---- Finite differences ----
    HessianDimMismatch { expected: usize, found: (usize, usize) },
    InvalidHessian { row: usize, col: usize, value: f64 },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::GradientNotImplemented => write!(f, "Analytic gradient not implemented"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has length {found}, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }

            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Gradient tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Cost-change tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Iteration cap {max_iter} rejected: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one stopping rule (tol_grad, tol_cost, max_iter) is required")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "L-BFGS memory {mem} rejected: {reason}")
            }

            OptError::NonFiniteCost { value } => write!(f, "Objective evaluated to {value}"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector has length {actual}, expected {expected}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Parameter {index} is {value}, must be finite")
            }
            OptError::DataLengthMismatch { response, regressors } => write!(
                f,
                "Response has {response} observations but regressors have {regressors} rows"
            ),
            OptError::InsufficientData { needed, found } => {
                write!(f, "Need at least {needed} observations, found {found}")
            }
            OptError::InvalidPredictionVariance { t, value } => {
                write!(f, "Prediction variance at t = {t} is {value}, must be finite and > 0")
            }

            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Estimated parameter {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver returned no parameter estimate"),

            OptError::InvalidParameter { text } => write!(f, "Invalid parameter: {text}"),
            OptError::NotImplemented { text } => write!(f, "Not implemented: {text}"),
            OptError::NotInitialized { text } => write!(f, "Not initialized: {text}"),
            OptError::ConditionViolated { text } => write!(f, "Condition violated: {text}"),
            OptError::CheckPointNotFound { text } => write!(f, "Checkpoint not found: {text}"),
            OptError::PotentialBug { text } => write!(f, "Potential bug: {text}"),
            OptError::ImpossibleError { text } => write!(f, "Impossible error: {text}"),
            OptError::BackendError { text } => write!(f, "Solver error: {text}"),

            OptError::HessianDimMismatch { expected, found } => write!(
                f,
                "Hessian has shape {found:?}, expected ({expected}, {expected})"
            ),
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Hessian entry ({row}, {col}) is {value}, must be finite")
            }

            OptError::UnknownError => write!(f, "Unknown optimizer error"),
        }
    }
}

/// Unwrap Argmin errors. Our own `OptError`s travel through Argmin boxed in
/// `argmin::core::Error`, so they are recovered first.
impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(other) => other,
        };
        match err.downcast::<ArgminError>() {
            Ok(ArgminError::InvalidParameter { text }) => OptError::InvalidParameter { text },
            Ok(ArgminError::NotImplemented { text }) => OptError::NotImplemented { text },
            Ok(ArgminError::NotInitialized { text }) => OptError::NotInitialized { text },
            Ok(ArgminError::ConditionViolated { text }) => OptError::ConditionViolated { text },
            Ok(ArgminError::CheckpointNotFound { text }) => OptError::CheckPointNotFound { text },
            Ok(ArgminError::PotentialBug { text }) => OptError::PotentialBug { text },
            Ok(ArgminError::ImpossibleError { text }) => OptError::ImpossibleError { text },
            Ok(_) => OptError::UnknownError,
            Err(other) => OptError::BackendError { text: other.to_string() },
        }
    }
}
