//! report — presentation of an [`AnalysisReport`](crate::pipeline::AnalysisReport).
//!
//! Computation never prints. This module turns the typed report into
//! stdout tables ([`tables`]), SVG charts ([`plots`]), and an optional JSON
//! dump ([`write_json`]).

pub mod errors;
pub mod plots;
pub mod tables;

use crate::pipeline::AnalysisReport;
use std::{fs::File, io::BufWriter, path::Path};

// ---- Re-exports ----
pub use self::errors::{ReportError, ReportResult};
pub use self::plots::{correlation_heatmap, forecast_chart, write_plots};
pub use self::tables::render_report;

/// Pretty-printed JSON of the whole report.
///
/// # Errors
/// `Io` when the file cannot be created; `Json` on serialization failure.
pub fn write_json(report: &AnalysisReport, path: &Path) -> ReportResult<()> {
    let file =
        File::create(path).map_err(|source| ReportError::Io { path: path.to_path_buf(), source })?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|source| ReportError::Json { path: path.to_path_buf(), source })
}
