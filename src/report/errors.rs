//! Error type for rendering and writing report artifacts.
use std::path::PathBuf;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug)]
pub enum ReportError {
    Io { path: PathBuf, source: std::io::Error },
    /// Plot backend failure, flattened to its message.
    Plot { path: PathBuf, message: String },
    Json { path: PathBuf, source: serde_json::Error },
    /// Nothing to draw.
    EmptyChart { chart: &'static str },
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io { source, .. } => Some(source),
            ReportError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io { path, source } => write!(f, "Cannot write {}: {source}", path.display()),
            ReportError::Plot { path, message } => {
                write!(f, "Cannot render plot {}: {message}", path.display())
            }
            ReportError::Json { path, source } => {
                write!(f, "Cannot serialize report to {}: {source}", path.display())
            }
            ReportError::EmptyChart { chart } => write!(f, "No data to draw in {chart}"),
        }
    }
}
