//! plots — SVG charts of the correlation matrix and the test-window
//! forecasts.
//!
//! Both charts draw straight from typed results, so they can be produced
//! from a deserialized report as well as a live run.
use crate::{
    evaluation::ForecastResult,
    pipeline::AnalysisReport,
    report::errors::{ReportError, ReportResult},
    statistical_tests::CorrelationMatrix,
};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const HEATMAP_FILE: &str = "correlation_heatmap.svg";
const FORECAST_FILE: &str = "forecast_vs_actual.svg";
const SERIES_COLORS: [RGBColor; 3] = [RGBColor(31, 119, 180), RGBColor(214, 39, 40), GREEN];

/// Write every chart of `report` into `out_dir`, returning the paths.
///
/// # Errors
/// `Io` when the directory cannot be created; `Plot` from rendering.
pub fn write_plots(report: &AnalysisReport, out_dir: &Path) -> ReportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .map_err(|source| ReportError::Io { path: out_dir.to_path_buf(), source })?;
    let heatmap = out_dir.join(HEATMAP_FILE);
    correlation_heatmap(&report.correlation, &heatmap)?;
    let forecast = out_dir.join(FORECAST_FILE);
    forecast_chart(&[&report.mlr_forecast, &report.arimax_forecast], &forecast)?;
    Ok(vec![heatmap, forecast])
}

/// Annotated heatmap, red for positive and blue for negative correlation.
///
/// # Errors
/// `EmptyChart` for an empty matrix; `Plot` from the backend.
pub fn correlation_heatmap(matrix: &CorrelationMatrix, path: &Path) -> ReportResult<()> {
    if matrix.names.is_empty() {
        return Err(ReportError::EmptyChart { chart: "correlation heatmap" });
    }
    draw_heatmap(matrix, path).map_err(|e| plot_error(path, e))
}

/// Actual returns and every model's forecasts over the test window.
///
/// # Errors
/// `EmptyChart` without forecasts or points; `Plot` from the backend.
pub fn forecast_chart(forecasts: &[&ForecastResult], path: &Path) -> ReportResult<()> {
    if forecasts.first().map_or(true, |f| f.points.is_empty()) {
        return Err(ReportError::EmptyChart { chart: "forecast chart" });
    }
    draw_forecasts(forecasts, path).map_err(|e| plot_error(path, e))
}

// ---- Helper methods ----

fn plot_error(path: &Path, err: Box<dyn std::error::Error>) -> ReportError {
    ReportError::Plot { path: path.to_path_buf(), message: err.to_string() }
}

fn heat_color(rho: f64) -> RGBColor {
    if !rho.is_finite() {
        return RGBColor(200, 200, 200);
    }
    let fade = |c: u8, w: f64| (255.0 - (255.0 - c as f64) * w).round() as u8;
    let w = rho.abs().min(1.0);
    if rho >= 0.0 {
        RGBColor(fade(214, w), fade(39, w), fade(40, w))
    } else {
        RGBColor(fade(31, w), fade(119, w), fade(180, w))
    }
}

fn draw_heatmap(matrix: &CorrelationMatrix, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let k = matrix.names.len();
    let root = SVGBackend::new(path, (720, 640)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Covariate correlations (levels)", ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(160)
        .build_cartesian_2d(0f64..k as f64, 0f64..k as f64)?;
    chart.configure_mesh().disable_mesh().x_labels(0).y_labels(0).draw()?;

    chart.draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
        row.iter().enumerate().map(move |(j, &rho)| {
            let y = (k - 1 - i) as f64;
            Rectangle::new([(j as f64, y), (j as f64 + 1.0, y + 1.0)], heat_color(rho).filled())
        })
    }))?;
    chart.draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
        row.iter().enumerate().map(move |(j, &rho)| {
            let y = (k - 1 - i) as f64;
            Text::new(format!("{rho:.2}"), (j as f64 + 0.4, y + 0.55), ("sans-serif", 18))
        })
    }))?;

    let label = ("sans-serif", 16).into_font().color(&BLACK);
    for (idx, name) in matrix.names.iter().enumerate() {
        let (x, bottom) = chart.backend_coord(&(idx as f64 + 0.3, 0.0));
        root.draw(&Text::new(name.clone(), (x, bottom + 10), label.clone()))?;
        let (left, y) = chart.backend_coord(&(0.0, (k - 1 - idx) as f64 + 0.5));
        root.draw(&Text::new(name.clone(), (left - 150, y), label.clone()))?;
    }

    root.present()?;
    Ok(())
}

fn draw_forecasts(
    forecasts: &[&ForecastResult], path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let points = &forecasts[0].points;
    let n = points.len();
    let values = forecasts
        .iter()
        .flat_map(|f| f.points.iter().map(|p| p.predicted))
        .chain(points.iter().map(|p| p.actual))
        .filter(|v| v.is_finite());
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((hi - lo) * 0.05).max(1e-6);

    let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Test window: actual vs. forecast log returns", ("sans-serif", 26).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0usize..n, (lo - pad)..(hi + pad))?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|i: &usize| {
            points.get(*i).map(|p| p.date.to_string()).unwrap_or_default()
        })
        .y_desc("log return")
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().enumerate().map(|(i, p)| (i, p.actual)), &BLACK))?
        .label("actual")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

    for (idx, forecast) in forecasts.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                forecast.points.iter().enumerate().map(|(i, p)| (i, p.predicted)),
                color.stroke_width(2),
            ))?
            .label(forecast.model.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}
