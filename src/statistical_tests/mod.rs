//! statistical_tests — diagnostics run before and after the regressions.
//!
//! Purpose
//! -------
//! Provide the test battery the analysis relies on:
//!
//! - [`adf`]: Augmented Dickey–Fuller stationarity test with AIC lag
//!   selection and MacKinnon p-values.
//! - [`multicollinearity`]: Pearson correlation matrix and VIFs.
//! - [`breusch_godfrey`]: LM/F test for residual serial correlation.
//! - [`arch`]: Engle's ARCH-LM test on squared residuals.
//! - [`escanciano_lobato`]: automatic, heteroskedasticity-robust
//!   portmanteau test.
//!
//! Conventions
//! -----------
//! - Every test returns a plain, serializable outcome struct; decisions at
//!   a significance level are methods on that struct.
//! - Errors are reported through [`TestError`]; reference-distribution
//!   failures produce `NaN` p-values rather than errors.
//! - No logging here. The pipeline logs decisions taken from outcomes.

pub mod adf;
pub mod arch;
pub mod breusch_godfrey;
pub mod errors;
pub mod escanciano_lobato;
pub mod multicollinearity;
pub mod pvalues;
pub mod validation;

// ---- Re-exports ----
pub use self::adf::{AdfOutcome, CriticalValues, Stationarity, adf_test};
pub use self::arch::{ArchOutcome, arch_lm};
pub use self::breusch_godfrey::{BreuschGodfreyOutcome, breusch_godfrey};
pub use self::errors::{TestError, TestResult};
pub use self::escanciano_lobato::{ElOutcome, escanciano_lobato};
pub use self::multicollinearity::{
    CorrelatedPair, CorrelationMatrix, VifEntry, correlation_matrix, variance_inflation_factors,
};
