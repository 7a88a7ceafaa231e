//! Error type for loading and aligning the input series.
use std::path::PathBuf;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug)]
pub enum DataError {
    //------ Parsing ------
    /// A declared numeric or date field could not be converted.
    Parse { source: String, line: u64, column: String, text: String },
    /// A required header is absent.
    MissingColumn { source: String, column: String },

    //------ Series invariants ------
    DuplicateDate { series: String, date: chrono::NaiveDate },
    UnsortedDates { series: String, index: usize },
    NonFiniteValue { series: String, index: usize, value: f64 },
    LengthMismatch { series: String, dates: usize, values: usize },
    EmptySeries { series: String },

    //------ Alignment ------
    /// The sources share no dates after upsampling.
    Alignment { detail: String },

    //------ I/O ------
    Io { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io { source, .. } => Some(source),
            DataError::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Parse { source, line, column, text } => write!(
                f,
                "Parse error in {source}, line {line}, column '{column}': cannot convert '{text}'"
            ),
            DataError::MissingColumn { source, column } => {
                write!(f, "Column '{column}' not found in {source}")
            }
            DataError::DuplicateDate { series, date } => {
                write!(f, "Series '{series}' has duplicate date {date}")
            }
            DataError::UnsortedDates { series, index } => {
                write!(f, "Series '{series}' is not strictly increasing at index {index}")
            }
            DataError::NonFiniteValue { series, index, value } => {
                write!(f, "Series '{series}' has non-finite value {value} at index {index}")
            }
            DataError::LengthMismatch { series, dates, values } => write!(
                f,
                "Series '{series}' has {dates} dates but {values} values"
            ),
            DataError::EmptySeries { series } => write!(f, "Series '{series}' is empty"),
            DataError::Alignment { detail } => write!(f, "Alignment failed: {detail}"),
            DataError::Io { path, source } => {
                write!(f, "I/O error reading {}: {source}", path.display())
            }
            DataError::Csv { path, source } => {
                write!(f, "CSV error reading {}: {source}", path.display())
            }
        }
    }
}
