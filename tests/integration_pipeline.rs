//! Integration tests for the end-to-end analysis pipeline.
//!
//! Purpose
//! -------
//! - Drive `run_analysis` from raw semicolon CSV exports on disk through
//!   alignment, feature construction, both models, and evaluation.
//! - Check the report against properties that hold for any input: panel
//!   dates are the intersection of the sources, the split is
//!   chronological, and both forecasts cover the test window.
//!
//! Coverage
//! --------
//! - `data`: loader formats (ISO, `YYYYMmm`, comma decimals, empty
//!   cells) and the inner join.
//! - `pipeline::run_analysis` with a reduced ARIMAX grid.
//! - `report`: table rendering, SVG plots, and the JSON dump.
//! - Error propagation for malformed numbers and disjoint sources.
//!
//! Exclusions
//! ----------
//! - Statistical accuracy of individual tests and estimators; those are
//!   covered by unit tests next to each module.
use chrono::{Datelike, Days, NaiveDate, Weekday};
use macro_regression::{
    config::AnalysisConfig,
    data::{DataError, SourcePaths},
    pipeline::{PipelineError, run_analysis},
    report::{render_report, write_json, write_plots},
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use std::{collections::BTreeSet, fmt::Write as _, path::Path};

/// Purpose
/// -------
/// Weekdays from `start` (inclusive) for `days` calendar days.
fn business_days(start: NaiveDate, days: u64) -> Vec<NaiveDate> {
    (0..days)
        .map(|i| start + Days::new(i))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// Purpose
/// -------
/// Write four source files shaped like the real exports into `dir`.
///
/// Layout
/// ------
/// - Prices: `Date;Open;High;Low;Close;Volume`, ISO dates, one row per
///   business day. Returns load on the lagged FX change.
/// - Yield and FX: SDMX-style `…;TIME_PERIOD;OBS_VALUE`. Every 25th FX
///   row has an empty value, modelling a holiday.
/// - Inflation: `Date;kpi` with `YYYYMmm` months and comma decimals,
///   running one month past the last business day.
///
/// Returns
/// -------
/// - The paths, the business days, and the FX holiday dates.
fn write_sources(dir: &Path, seed: u64) -> (SourcePaths, Vec<NaiveDate>, BTreeSet<NaiveDate>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let days = business_days(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(), 730);

    let mut fx = vec![9.0];
    let mut rate = vec![1.5];
    for _ in 1..days.len() {
        fx.push(fx[fx.len() - 1] + 0.04 * noise.sample(&mut rng));
        rate.push(rate[rate.len() - 1] + 0.02 * noise.sample(&mut rng));
    }
    let mut price = vec![1000.0];
    for t in 1..days.len() {
        let dfx = if t >= 2 { fx[t - 1] - fx[t - 2] } else { 0.0 };
        let r: f64 = 0.0003 + 0.05 * dfx + 0.008 * noise.sample(&mut rng);
        price.push(price[t - 1] * r.exp());
    }

    let mut prices = String::from("Date;Open;High;Low;Close;Volume\n");
    let mut yields = String::from("FREQ;Frequency;TENOR;TIME_PERIOD;OBS_VALUE\n");
    let mut rates = String::from("FREQ;Frequency;BASE_CUR;QUOTE_CUR;TIME_PERIOD;OBS_VALUE\n");
    let mut holidays = BTreeSet::new();
    for (t, d) in days.iter().enumerate() {
        let p = price[t];
        writeln!(prices, "{d};{:.2};{:.2};{:.2};{p:.4};1000", p * 0.99, p * 1.01, p * 0.98).unwrap();
        writeln!(yields, "B;Business;10Y;{d};{:.4}", rate[t]).unwrap();
        if t % 25 == 7 {
            holidays.insert(*d);
            writeln!(rates, "B;Business;USD;NOK;{d};").unwrap();
        } else {
            writeln!(rates, "B;Business;USD;NOK;{d};{:.4}", fx[t]).unwrap();
        }
    }

    let mut kpi = String::from("Date;kpi\n");
    let mut level = 104.0;
    for year in 2019..=2021 {
        for month in 1..=12 {
            if year == 2021 && month > 1 {
                break;
            }
            level += 0.25 + 0.1 * noise.sample(&mut rng);
            writeln!(kpi, "{year}M{month:02};{}", format!("{level:.1}").replace('.', ",")).unwrap();
        }
    }

    let paths = SourcePaths {
        prices: dir.join("prices.csv"),
        yield_curve: dir.join("yield.csv"),
        fx: dir.join("usdnok.csv"),
        inflation: dir.join("kpi.csv"),
    };
    std::fs::write(&paths.prices, prices).unwrap();
    std::fs::write(&paths.yield_curve, yields).unwrap();
    std::fs::write(&paths.fx, rates).unwrap();
    std::fs::write(&paths.inflation, kpi).unwrap();
    (paths, days, holidays)
}

/// Defaults with a 2×2 ARIMAX grid to keep the run short.
fn quick_config() -> AnalysisConfig {
    AnalysisConfig { max_p: 1, max_q: 1, parallel_search: true, ..AnalysisConfig::default() }
}

#[test]
// Purpose
// -------
// A full run produces a coherent report from raw files.
//
// Given
// -----
// - Two years of synthetic business days with FX holidays and monthly
//   comma-decimal inflation.
//
// Expect
// ------
// - Panel rows equal the return dates minus the FX holidays.
// - FX missing cells are counted and no other source has any.
// - Training covers ⌊0.8·N⌋ feature rows and ends before the test window.
// - Stationarity is reported for the return and all three covariates;
//   covariate rows are the outcomes behind the transform decisions.
// - MLR carries a constant plus three coefficients.
// - Every grid order is either ranked or recorded as a failure.
// - Both forecasts span the test window with finite metrics.
fn pipeline_builds_consistent_report() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let (paths, days, holidays) = write_sources(dir.path(), 17);
    let expected_dates: Vec<NaiveDate> =
        days[1..].iter().copied().filter(|d| !holidays.contains(d)).collect();

    // Act
    let report = run_analysis(&paths, &quick_config()).unwrap();

    // Assert
    let sample = &report.sample;
    assert_eq!(sample.panel_rows, expected_dates.len());
    assert_eq!(sample.first_date, expected_dates[0]);
    assert_eq!(sample.last_date, expected_dates[expected_dates.len() - 1]);

    for missing in &report.missing_cells {
        if missing.source == "usd_nok_exchange_rate" {
            assert_eq!(missing.missing_cells, holidays.len());
            assert_eq!(missing.skipped_rows, holidays.len());
        } else {
            assert_eq!(missing.missing_cells, 0, "{}", missing.source);
        }
    }

    assert!(sample.feature_rows < sample.panel_rows);
    assert!(sample.feature_rows + 2 >= sample.panel_rows);
    assert_eq!(sample.train_rows, (0.8 * sample.feature_rows as f64).floor() as usize);
    assert_eq!(sample.train_rows + sample.test_rows, sample.feature_rows);
    assert!(sample.train_end < sample.test_start);

    assert_eq!(report.stationarity.len(), 4);
    assert_eq!(report.stationarity[0].series, "log_return");
    for (row, decision) in report.stationarity[1..].iter().zip(&report.features.decisions) {
        assert_eq!(row, &decision.adf);
    }
    assert_eq!(report.mlr.coefficients.len(), 4);

    let arimax = &report.arimax;
    assert_eq!(arimax.ranked.len() + arimax.failures.len(), 4);
    assert_eq!(arimax.best.order, arimax.ranked[0].order);

    for forecast in [&report.mlr_forecast, &report.arimax_forecast] {
        assert_eq!(forecast.points.len(), sample.test_rows);
        assert_eq!(forecast.points[0].date, sample.test_start);
        assert!(forecast.metrics.mse.is_finite() && forecast.metrics.mse >= 0.0);
        assert!(forecast.metrics.mae.is_finite() && forecast.metrics.mae >= 0.0);
        assert!(forecast.metrics.r_squared.is_finite());
    }
    assert!(report.arimax_forecast.model.starts_with("ARIMAX("));
}

#[test]
// Purpose
// -------
// The report renders to text, SVG, and JSON.
//
// Given
// -----
// - A completed run on synthetic sources.
//
// Expect
// ------
// - The rendered text names both models.
// - Two SVG files are written.
// - The JSON file parses and carries the sample summary.
fn report_renders_all_outputs() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let (paths, _, _) = write_sources(dir.path(), 23);
    let report = run_analysis(&paths, &quick_config()).unwrap();

    // Act
    let text = render_report(&report);
    let plots = write_plots(&report, &dir.path().join("plots")).unwrap();
    let json_path = dir.path().join("report.json");
    write_json(&report, &json_path).unwrap();

    // Assert
    assert!(text.contains("MLR"));
    assert!(text.contains(&report.arimax_forecast.model));
    assert_eq!(plots.len(), 2);
    for path in &plots {
        assert!(std::fs::read_to_string(path).unwrap().contains("<svg"));
    }
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["sample"]["panel_rows"], serde_json::json!(report.sample.panel_rows));
}

#[test]
// Purpose
// -------
// An unparsable number aborts the run with its location.
//
// Given
// -----
// - A price file whose second data row has `Close = n/a`.
//
// Expect
// ------
// - `PipelineError::Data(DataError::Parse)` naming the prices source,
//   line 3, and the `Close` column.
fn malformed_price_is_a_parse_error() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let (paths, _, _) = write_sources(dir.path(), 3);
    std::fs::write(
        &paths.prices,
        "Date;Open;High;Low;Close;Volume\n2019-01-02;1;1;1;100;1\n2019-01-03;1;1;1;n/a;1\n",
    )
    .unwrap();

    // Act
    let err = run_analysis(&paths, &quick_config()).unwrap_err();

    // Assert
    match err {
        PipelineError::Data(DataError::Parse { source, line, column, text }) => {
            assert_eq!(source, "prices");
            assert_eq!(line, 3);
            assert_eq!(column, "Close");
            assert_eq!(text, "n/a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
// Purpose
// -------
// Sources that never overlap cannot be aligned.
//
// Given
// -----
// - Valid sources except an FX file dated entirely in 2015.
//
// Expect
// ------
// - `PipelineError::Data(DataError::Alignment)`.
fn disjoint_sources_fail_alignment() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let (paths, _, _) = write_sources(dir.path(), 5);
    let mut rates = String::from("TIME_PERIOD;OBS_VALUE\n");
    for d in business_days(NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(), 60) {
        writeln!(rates, "{d};8.5").unwrap();
    }
    std::fs::write(&paths.fx, rates).unwrap();

    // Act
    let err = run_analysis(&paths, &quick_config()).unwrap_err();

    // Assert
    assert!(matches!(err, PipelineError::Data(DataError::Alignment { .. })), "{err}");
}
