//! loader — read the four semicolon-delimited sources into [`TimeSeries`].
//!
//! Purpose
//! -------
//! Turn raw exports (index prices, Norges Bank SDMX yield and FX files,
//! and the monthly KPI table) into validated, date-ordered series.
//!
//! Key behaviors
//! -------------
//! - `;` delimiter, flexible record length, whitespace trimmed, a leading
//!   UTF-8 BOM stripped from the first header.
//! - Decimal commas are converted to dots before parsing.
//! - Dates accept `YYYY-MM-DD` (optionally followed by a time part),
//!   `DD.MM.YYYY`, `YYYYMmm` and `YYYY-MM`; monthly forms map to the first
//!   day of the month.
//! - Empty cells are counted per source and reported with `tracing::warn!`;
//!   rows whose date or value cell is empty are skipped. A non-empty cell
//!   that does not parse is a hard [`DataError::Parse`].
use crate::data::{
    errors::{DataError, DataResult},
    series::TimeSeries,
};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::{
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Which columns of a source hold the date and the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub date: String,
    pub value: String,
}

impl ColumnSpec {
    pub fn new(date: &str, value: &str) -> Self {
        Self { date: date.to_string(), value: value.to_string() }
    }
}

/// Column layout of every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceColumns {
    pub prices: ColumnSpec,
    pub yield_curve: ColumnSpec,
    pub fx: ColumnSpec,
    pub inflation: ColumnSpec,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            prices: ColumnSpec::new("Date", "Close"),
            yield_curve: ColumnSpec::new("TIME_PERIOD", "OBS_VALUE"),
            fx: ColumnSpec::new("TIME_PERIOD", "OBS_VALUE"),
            inflation: ColumnSpec::new("Date", "kpi"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub prices: PathBuf,
    pub yield_curve: PathBuf,
    pub fx: PathBuf,
    pub inflation: PathBuf,
}

/// Missing-cell summary for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCellReport {
    pub source: String,
    pub rows: usize,
    pub missing_cells: usize,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub series: TimeSeries,
    pub missing: MissingCellReport,
}

/// All four raw sources.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSources {
    pub prices: TimeSeries,
    pub zero_coupon_rate: TimeSeries,
    pub usd_nok_exchange_rate: TimeSeries,
    pub kpi: TimeSeries,
    pub missing: Vec<MissingCellReport>,
}

/// Load every source named in `paths`.
pub fn load_sources(paths: &SourcePaths, columns: &SourceColumns) -> DataResult<RawSources> {
    let prices = load_series_file("prices", &paths.prices, &columns.prices)?;
    let yields = load_series_file("zero_coupon_rate", &paths.yield_curve, &columns.yield_curve)?;
    let fx = load_series_file("usd_nok_exchange_rate", &paths.fx, &columns.fx)?;
    let kpi = load_series_file("kpi", &paths.inflation, &columns.inflation)?;
    Ok(RawSources {
        missing: vec![
            prices.missing.clone(),
            yields.missing.clone(),
            fx.missing.clone(),
            kpi.missing.clone(),
        ],
        prices: prices.series,
        zero_coupon_rate: yields.series,
        usd_nok_exchange_rate: fx.series,
        kpi: kpi.series,
    })
}

/// Open and parse one CSV file.
pub fn load_series_file(name: &str, path: &Path, columns: &ColumnSpec) -> DataResult<LoadedSeries> {
    let file = std::fs::File::open(path)
        .map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    debug!(source = name, path = %path.display(), "reading source");
    read_series(name, file, columns).map_err(|err| match err {
        DataError::Csv { source, .. } => DataError::Csv { path: path.to_path_buf(), source },
        other => other,
    })
}

/// Parse a semicolon-delimited source from any reader.
pub fn read_series<R: Read>(name: &str, reader: R, columns: &ColumnSpec) -> DataResult<LoadedSeries> {
    let mut rdr = ReaderBuilder::new().delimiter(b';').flexible(true).trim(Trim::All).from_reader(reader);
    let csv_err = |source: csv::Error| DataError::Csv { path: PathBuf::from(name), source };

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let date_idx = find_column(name, &headers, &columns.date)?;
    let value_idx = find_column(name, &headers, &columns.value)?;

    let mut obs = Vec::new();
    let mut report = MissingCellReport { source: name.to_string(), rows: 0, missing_cells: 0, skipped_rows: 0 };

    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        report.rows += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        report.missing_cells += (0..headers.len()).filter(|&i| record.get(i).map_or(true, str::is_empty)).count();

        let date_cell = record.get(date_idx).unwrap_or("");
        let value_cell = record.get(value_idx).unwrap_or("");
        if date_cell.is_empty() || value_cell.is_empty() {
            report.skipped_rows += 1;
            continue;
        }

        let date = parse_date(date_cell).ok_or_else(|| DataError::Parse {
            source: name.to_string(),
            line,
            column: columns.date.clone(),
            text: date_cell.to_string(),
        })?;
        let value = parse_decimal(value_cell).ok_or_else(|| DataError::Parse {
            source: name.to_string(),
            line,
            column: columns.value.clone(),
            text: value_cell.to_string(),
        })?;
        obs.push((date, value));
    }

    if report.missing_cells > 0 {
        warn!(
            source = name,
            missing_cells = report.missing_cells,
            skipped_rows = report.skipped_rows,
            "missing cells in raw input"
        );
    }
    let series = TimeSeries::from_unsorted(name, obs)?;
    Ok(LoadedSeries { series, missing: report })
}

/// Parse a number, treating `,` as the decimal separator.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse any supported date layout.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some((year, month)) = text.split_once('M') {
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(d) = text.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()) {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%d.%m.%Y") {
        return Some(d);
    }
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok()
}

// ---- Helper methods ----

fn find_column(source: &str, headers: &StringRecord, wanted: &str) -> DataResult<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
        .ok_or_else(|| DataError::MissingColumn { source: source.to_string(), column: wanted.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Every accepted date layout and decimal commas.
    // - Missing-cell accounting and row skipping.
    // - Parse and header failures.
    // -------------------------------------------------------------------------

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // All supported date layouts resolve to the expected calendar day.
    //
    // Given
    // -----
    // - "2015-03-02", "2015-03-02 00:00:00+01:00", "02.03.2015",
    //   "2015M03", "2015-03", and garbage.
    //
    // Expect
    // ------
    // - Daily forms give 2015-03-02, monthly forms 2015-03-01, garbage None.
    fn parse_date_accepts_supported_layouts() {
        assert_eq!(parse_date("2015-03-02"), Some(d(2015, 3, 2)));
        assert_eq!(parse_date("2015-03-02 00:00:00+01:00"), Some(d(2015, 3, 2)));
        assert_eq!(parse_date("02.03.2015"), Some(d(2015, 3, 2)));
        assert_eq!(parse_date("2015M03"), Some(d(2015, 3, 1)));
        assert_eq!(parse_date("2015-03"), Some(d(2015, 3, 1)));
        assert_eq!(parse_date("March 2015"), None);
        assert_eq!(parse_decimal("10,25"), Some(10.25));
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    // Purpose
    // -------
    // SDMX-style exports keep only the declared columns, skip rows with an
    // empty value, and count every missing cell.
    //
    // Given
    // -----
    // - Four rows, one of them with an empty OBS_VALUE and one with an
    //   empty metadata cell, listed out of order.
    //
    // Expect
    // ------
    // - Three observations, sorted; missing_cells = 2; skipped_rows = 1.
    fn read_series_skips_and_counts_missing_cells() {
        // Arrange
        let csv = "\u{feff}FREQ;TIME_PERIOD;OBS_VALUE\n\
                   B;2020-01-03;10,5\n\
                   B;2020-01-02;\n\
                   ;2020-01-01;10,1\n\
                   B;2020-01-06;10,7\n";

        // Act
        let loaded = read_series("fx", csv.as_bytes(), &ColumnSpec::new("TIME_PERIOD", "OBS_VALUE")).unwrap();

        // Assert
        assert_eq!(loaded.series.values(), &[10.1, 10.5, 10.7]);
        assert_eq!(loaded.series.first_date(), d(2020, 1, 1));
        assert_eq!(loaded.missing.missing_cells, 2);
        assert_eq!(loaded.missing.skipped_rows, 1);
        assert_eq!(loaded.missing.rows, 4);
    }

    #[test]
    // Purpose
    // -------
    // Malformed cells and absent headers are hard errors.
    //
    // Given
    // -----
    // - A value "1.2.3"; a file without the requested value column.
    //
    // Expect
    // ------
    // - `Parse` carrying the line and text; `MissingColumn`.
    fn read_series_reports_parse_and_header_errors() {
        let columns = ColumnSpec::new("Date", "kpi");
        let bad = "Date;kpi\n2015M01;100,0\n2015M02;1.2.3\n";
        match read_series("kpi", bad.as_bytes(), &columns) {
            Err(DataError::Parse { line, text, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(text, "1.2.3");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
        let missing = "Date;value\n2015M01;100\n";
        assert!(matches!(
            read_series("kpi", missing.as_bytes(), &columns),
            Err(DataError::MissingColumn { .. })
        ));
    }
}
