//! config — every analysis threshold in one place.
//!
//! Purpose
//! -------
//! Collect the constants of a run (split fraction, significance level,
//! multicollinearity thresholds, ARIMAX grid, test lags, covariance
//! choice, optimizer tolerances, CSV column names) in [`AnalysisConfig`],
//! loadable from an optional TOML file with every field defaulted.
//!
//! Conventions
//! -----------
//! - Missing TOML keys take their defaults (`#[serde(default)]`).
//! - [`AnalysisConfig::validate`] range-checks everything before the
//!   pipeline starts; nothing downstream re-checks configuration.
use crate::{
    data::SourceColumns,
    features::{DEFAULT_TRAIN_FRACTION, TransformOptions, TransformPolicy},
    inference::{CovarianceType, HACOptions},
    optimization::{
        errors::OptError,
        loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    },
    statistical_tests::{
        arch::DEFAULT_ARCH_LAGS,
        escanciano_lobato::DEFAULT_EL_Q,
        multicollinearity::{DEFAULT_CORRELATION_THRESHOLD, DEFAULT_VIF_THRESHOLD},
    },
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    OutOfRange { field: &'static str, value: String, reason: &'static str },
    Optimizer(OptError),
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Optimizer(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Invalid config {}: {message}", path.display())
            }
            ConfigError::OutOfRange { field, value, reason } => {
                write!(f, "Config field '{field}' = {value}: {reason}")
            }
            ConfigError::Optimizer(err) => write!(f, "Invalid optimizer settings: {err}"),
        }
    }
}

impl From<OptError> for ConfigError {
    fn from(err: OptError) -> Self {
        ConfigError::Optimizer(err)
    }
}

/// L-BFGS settings as written in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
    /// `"MoreThuente"` or `"HagerZhang"`.
    pub line_search: String,
    pub lbfgs_mem: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            tol_grad: Some(1e-6),
            tol_cost: None,
            max_iter: Some(300),
            line_search: "MoreThuente".to_string(),
            lbfgs_mem: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub train_fraction: f64,
    pub alpha: f64,
    pub correlation_threshold: f64,
    pub vif_threshold: f64,
    pub transform_policy: TransformPolicy,
    /// `None` uses `12·(n/100)^{1/4}`.
    pub adf_max_lag: Option<usize>,
    pub max_p: usize,
    pub max_q: usize,
    pub bg_lags: usize,
    pub arch_lags: usize,
    pub el_q: f64,
    pub el_max_lag: usize,
    /// Used for the MLR when the ARCH test rejects.
    pub robust_covariance: CovarianceType,
    pub hac: HACOptions,
    pub parallel_search: bool,
    pub optimizer: OptimizerConfig,
    pub columns: SourceColumns,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            train_fraction: DEFAULT_TRAIN_FRACTION,
            alpha: 0.05,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            vif_threshold: DEFAULT_VIF_THRESHOLD,
            transform_policy: TransformPolicy::default(),
            adf_max_lag: None,
            max_p: 3,
            max_q: 3,
            bg_lags: 1,
            arch_lags: DEFAULT_ARCH_LAGS,
            el_q: DEFAULT_EL_Q,
            el_max_lag: 10,
            robust_covariance: CovarianceType::HC3,
            hac: HACOptions::default(),
            parallel_search: false,
            optimizer: OptimizerConfig::default(),
            columns: SourceColumns::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read and validate a TOML file.
    ///
    /// # Errors
    /// `Io`, `Parse`, and anything [`AnalysisConfig::validate`] reports.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `OutOfRange` for the first field outside its domain; `Optimizer`
    /// for invalid tolerances or line search.
    pub fn validate(&self) -> ConfigResult<()> {
        open_unit("train_fraction", self.train_fraction)?;
        open_unit("alpha", self.alpha)?;
        if !(self.correlation_threshold > 0.0 && self.correlation_threshold <= 1.0) {
            return Err(out_of_range(
                "correlation_threshold",
                self.correlation_threshold,
                "must lie in (0, 1]",
            ));
        }
        if !(self.vif_threshold.is_finite() && self.vif_threshold >= 1.0) {
            return Err(out_of_range("vif_threshold", self.vif_threshold, "must be at least 1"));
        }
        if !(self.el_q.is_finite() && self.el_q > 0.0) {
            return Err(out_of_range("el_q", self.el_q, "must be positive"));
        }
        for (field, value) in
            [("bg_lags", self.bg_lags), ("arch_lags", self.arch_lags), ("el_max_lag", self.el_max_lag)]
        {
            if value == 0 {
                return Err(out_of_range(field, value, "must be at least 1"));
            }
        }
        self.mle_options()?;
        Ok(())
    }

    /// # Errors
    /// `Optimizer` when tolerances, line search, or memory are invalid.
    pub fn mle_options(&self) -> ConfigResult<MLEOptions> {
        let opt = &self.optimizer;
        let tols = Tolerances::new(opt.tol_grad, opt.tol_cost, opt.max_iter)?;
        let line_searcher: LineSearcher = opt.line_search.parse()?;
        Ok(MLEOptions::new(tols, line_searcher, opt.lbfgs_mem)?)
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            policy: self.transform_policy,
            alpha: self.alpha,
            vif_threshold: self.vif_threshold,
            adf_max_lag: self.adf_max_lag,
        }
    }
}

// ---- Helper methods ----

fn open_unit(field: &'static str, value: f64) -> ConfigResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, "must lie strictly between 0 and 1"))
    }
}

fn out_of_range(field: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError::OutOfRange { field, value: value.to_string(), reason }
}
