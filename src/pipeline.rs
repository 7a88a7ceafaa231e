//! pipeline — one batch run from CSV inputs to a typed report.
//!
//! Purpose
//! -------
//! Wire the stages in order: load, align, diagnose, transform, split, fit
//! the MLR, test its residuals, search ARIMAX orders, and evaluate both
//! models on the held-out window.
//!
//! Key behaviors
//! -------------
//! - Every stage takes immutable inputs and returns a new value; the
//!   result is an [`AnalysisReport`] with no rendering applied.
//! - The MLR switches to `config.robust_covariance` when the ARCH-LM test
//!   rejects at `config.alpha`.
//! - The Escanciano–Lobato test is advisory: a failure is logged and the
//!   field left empty.
//! - Parse, alignment, and estimation errors of the MLR are fatal; ARIMAX
//!   candidate failures are absorbed by the order search.
use crate::{
    arimax::{ArimaxError, OrderSearchOptions, OrderSearchOutcome, search_orders},
    config::{AnalysisConfig, ConfigError},
    data::{
        Covariate, DataError, MissingCellReport, SourcePaths, align_sources, load_sources,
    },
    evaluation::{ForecastResult, MetricError},
    features::{FeatureError, FeatureFrame, build_features, chronological_split},
    inference::CovarianceType,
    regression::{OlsModel, RegressionError},
    statistical_tests::{
        AdfOutcome, ArchOutcome, BreuschGodfreyOutcome, CorrelatedPair, CorrelationMatrix,
        ElOutcome, TestError, adf_test, arch_lm, breusch_godfrey, correlation_matrix,
        escanciano_lobato,
    },
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Data(DataError),
    Features(FeatureError),
    Diagnostics(TestError),
    Regression(RegressionError),
    Arimax(ArimaxError),
    Metrics(MetricError),
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(e) => Some(e),
            PipelineError::Data(e) => Some(e),
            PipelineError::Features(e) => Some(e),
            PipelineError::Diagnostics(e) => Some(e),
            PipelineError::Regression(e) => Some(e),
            PipelineError::Arimax(e) => Some(e),
            PipelineError::Metrics(e) => Some(e),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Config(e) => write!(f, "configuration: {e}"),
            PipelineError::Data(e) => write!(f, "data loading: {e}"),
            PipelineError::Features(e) => write!(f, "feature construction: {e}"),
            PipelineError::Diagnostics(e) => write!(f, "diagnostics: {e}"),
            PipelineError::Regression(e) => write!(f, "MLR estimation: {e}"),
            PipelineError::Arimax(e) => write!(f, "ARIMAX estimation: {e}"),
            PipelineError::Metrics(e) => write!(f, "forecast evaluation: {e}"),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for PipelineError {
            fn from(err: $source) -> Self {
                PipelineError::$variant(err)
            }
        })*
    };
}

impl_from! {
    ConfigError => Config,
    DataError => Data,
    FeatureError => Features,
    TestError => Diagnostics,
    RegressionError => Regression,
    ArimaxError => Arimax,
    MetricError => Metrics,
}

/// Date coverage of the aligned panel and the split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub panel_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub feature_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
}

/// Residual diagnostics of the training-sample MLR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualDiagnostics {
    pub breusch_godfrey: BreuschGodfreyOutcome,
    pub arch: ArchOutcome,
    pub escanciano_lobato: Option<ElOutcome>,
    pub autocorrelation_detected: bool,
    pub heteroskedasticity_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub missing_cells: Vec<MissingCellReport>,
    pub sample: SampleSummary,
    /// ADF on the return series and each covariate level.
    pub stationarity: Vec<AdfOutcome>,
    pub correlation: CorrelationMatrix,
    pub correlated_pairs: Vec<CorrelatedPair>,
    pub features: FeatureFrame,
    pub mlr: OlsModel,
    pub residual_diagnostics: ResidualDiagnostics,
    pub arimax: OrderSearchOutcome,
    pub mlr_forecast: ForecastResult,
    pub arimax_forecast: ForecastResult,
}

/// Run the whole analysis.
///
/// # Errors
/// The first fatal [`PipelineError`] from any stage.
pub fn run_analysis(paths: &SourcePaths, config: &AnalysisConfig) -> PipelineResult<AnalysisReport> {
    config.validate()?;
    let alpha = config.alpha;

    let raw = load_sources(paths, &config.columns)?;
    let panel = align_sources(&raw)?;
    info!(
        rows = panel.len(),
        first = %panel.dates[0],
        last = %panel.dates[panel.len() - 1],
        "aligned panel built"
    );


    let levels: Vec<(String, Vec<f64>)> = Covariate::ALL
        .iter()
        .map(|&c| (c.name().to_string(), panel.covariate(c).to_vec()))
        .collect();
    let correlation = correlation_matrix(&levels)?;
    let correlated_pairs = correlation.flagged_pairs(config.correlation_threshold);
    for pair in &correlated_pairs {
        warn!(
            first = %pair.first,
            second = %pair.second,
            rho = pair.correlation,
            "highly correlated covariates"
        );
    }

    let features = build_features(&panel, &config.transform_options())?;
    // Covariate levels were tested while building features; only the
    // return series still needs its ADF.
    let stationarity: Vec<AdfOutcome> =
        std::iter::once(adf_test("log_return", &panel.log_return, config.adf_max_lag, alpha)?)
            .chain(features.decisions.iter().map(|d| d.adf.clone()))
            .collect();
    let split = chronological_split(&features, config.train_fraction)?;
    let sample = SampleSummary {
        panel_rows: panel.len(),
        first_date: panel.dates[0],
        last_date: panel.dates[panel.len() - 1],
        feature_rows: features.len(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        train_end: split.train.dates[split.train.len() - 1],
        test_start: split.test.dates[0],
    };
    info!(train = sample.train_rows, test = sample.test_rows, "chronological split");

    let ols = OlsModel::fit(&split.regressor_names, &split.train.regressors, &split.train.target)?;
    let breusch_godfrey = breusch_godfrey(&ols.design, &ols.residuals, config.bg_lags)?;
    let arch = arch_lm(&ols.residuals, config.arch_lags)?;
    let escanciano_lobato = match escanciano_lobato(&ols.residuals, config.el_q, config.el_max_lag)
    {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            warn!(error = %err, "Escanciano–Lobato test skipped");
            None
        }
    };
    let residual_diagnostics = ResidualDiagnostics {
        autocorrelation_detected: breusch_godfrey.autocorrelation_detected(alpha),
        heteroskedasticity_detected: arch.is_significant(alpha),
        breusch_godfrey,
        arch,
        escanciano_lobato,
    };

    let mlr = if residual_diagnostics.heteroskedasticity_detected
        && config.robust_covariance != CovarianceType::Classical
    {
        info!(
            covariance = %config.robust_covariance,
            arch_p = residual_diagnostics.arch.lm_p_value,
            "ARCH effects detected, using robust MLR covariance"
        );
        ols.with_covariance(config.robust_covariance, &config.hac)?
    } else {
        ols
    };

    let test_actual = split.test.target.to_vec();
    let mlr_predicted = mlr.predict(&split.test.regressors)?.to_vec();
    let mlr_forecast = ForecastResult::new("MLR", &split.test.dates, &test_actual, &mlr_predicted)?;

    let search_opts = OrderSearchOptions {
        max_p: config.max_p,
        max_q: config.max_q,
        parallel: config.parallel_search,
        mle: config.mle_options()?,
    };
    let arimax = search_orders(&split, &search_opts)?;
    let arimax_forecast = ForecastResult::new(
        format!("ARIMAX{}", arimax.best.order),
        &split.test.dates,
        &test_actual,
        &arimax.best_forecast,
    )?;

    for forecast in [&mlr_forecast, &arimax_forecast] {
        for warning in &forecast.metrics.warnings {
            warn!(model = %forecast.model, %warning, "forecast metric warning");
        }
        info!(
            model = %forecast.model,
            mape = forecast.metrics.mape,
            mse = forecast.metrics.mse,
            mae = forecast.metrics.mae,
            r_squared = forecast.metrics.r_squared,
            "out-of-sample evaluation"
        );
    }

    Ok(AnalysisReport {
        config: config.clone(),
        missing_cells: raw.missing,
        sample,
        stationarity,
        correlation,
        correlated_pairs,
        features,
        mlr,
        residual_diagnostics,
        arimax,
        mlr_forecast,
        arimax_forecast,
    })
}
