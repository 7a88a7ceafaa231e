//! tables — plain-text tables for stdout.
//!
//! Each `*_table` renders one typed result; [`render_report`] stitches the
//! sections of a full run together under titled headers.
use crate::{
    arimax::CandidateScore,
    data::MissingCellReport,
    evaluation::ForecastResult,
    features::TransformDecision,
    pipeline::{AnalysisReport, ResidualDiagnostics},
    regression::CoefficientEstimate,
    statistical_tests::{AdfOutcome, CorrelationMatrix, VifEntry},
};
use std::fmt::Write;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

#[derive(Tabled)]
struct MissingRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Missing cells")]
    missing: usize,
    #[tabled(rename = "Skipped rows")]
    skipped: usize,
}

#[derive(Tabled)]
struct AdfRow {
    #[tabled(rename = "Series")]
    series: String,
    #[tabled(rename = "ADF stat")]
    statistic: String,
    #[tabled(rename = "p-value")]
    p_value: String,
    #[tabled(rename = "Lag")]
    lag: usize,
    #[tabled(rename = "Nobs")]
    nobs: usize,
    #[tabled(rename = "5% crit.")]
    critical: String,
    #[tabled(rename = "Result")]
    classification: String,
}

#[derive(Tabled)]
struct DecisionRow {
    #[tabled(rename = "Covariate")]
    covariate: String,
    #[tabled(rename = "Differenced")]
    differenced: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct VifRow {
    #[tabled(rename = "Regressor")]
    name: String,
    #[tabled(rename = "VIF")]
    vif: String,
    #[tabled(rename = "Flag")]
    flag: &'static str,
}

#[derive(Tabled)]
struct CoefficientRow {
    #[tabled(rename = "Parameter")]
    name: String,
    #[tabled(rename = "Estimate")]
    estimate: String,
    #[tabled(rename = "Std. error")]
    std_error: String,
    #[tabled(rename = "Stat")]
    statistic: String,
    #[tabled(rename = "p-value")]
    p_value: String,
}

#[derive(Tabled)]
struct TestRow {
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Statistic")]
    statistic: String,
    #[tabled(rename = "p-value")]
    p_value: String,
    #[tabled(rename = "Result")]
    result: &'static str,
}

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Order")]
    order: String,
    #[tabled(rename = "Test R²")]
    r_squared: String,
    #[tabled(rename = "AIC")]
    aic: String,
    #[tabled(rename = "BIC")]
    bic: String,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "MAPE (%)")]
    mape: String,
    #[tabled(rename = "MSE")]
    mse: String,
    #[tabled(rename = "MAE")]
    mae: String,
    #[tabled(rename = "R²")]
    r_squared: String,
}

pub fn missing_cells_table(reports: &[MissingCellReport]) -> String {
    let rows = reports.iter().map(|r| MissingRow {
        source: r.source.clone(),
        rows: r.rows,
        missing: r.missing_cells,
        skipped: r.skipped_rows,
    });
    styled(Table::new(rows))
}

pub fn stationarity_table(outcomes: &[AdfOutcome]) -> String {
    let rows = outcomes.iter().map(|o| AdfRow {
        series: o.series.clone(),
        statistic: num(o.statistic),
        p_value: num(o.p_value),
        lag: o.used_lag,
        nobs: o.nobs,
        critical: num(o.critical_values.five_pct),
        classification: o.classification.to_string(),
    });
    styled(Table::new(rows))
}

pub fn decisions_table(decisions: &[TransformDecision]) -> String {
    let rows = decisions.iter().map(|d| DecisionRow {
        covariate: d.covariate.to_string(),
        differenced: if d.differenced { "yes" } else { "no" }.to_string(),
        reason: format!("{:?}", d.reason),
    });
    styled(Table::new(rows))
}

/// Square matrix with the series names on both axes.
pub fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut builder = Builder::default();
    builder.push_record(std::iter::once(String::new()).chain(matrix.names.iter().cloned()));
    for (name, row) in matrix.names.iter().zip(&matrix.values) {
        builder.push_record(std::iter::once(name.clone()).chain(row.iter().map(|v| num(*v))));
    }
    styled(builder.build())
}

pub fn vif_table(entries: &[VifEntry]) -> String {
    let rows = entries.iter().map(|e| VifRow {
        name: e.name.clone(),
        vif: num(e.vif),
        flag: if e.flagged { "high" } else { "" },
    });
    styled(Table::new(rows))
}

pub fn coefficient_table(coefficients: &[CoefficientEstimate]) -> String {
    let rows = coefficients.iter().map(|c| CoefficientRow {
        name: c.name.clone(),
        estimate: num(c.estimate),
        std_error: num(c.std_error),
        statistic: num(c.statistic),
        p_value: num(c.p_value),
    });
    styled(Table::new(rows))
}

pub fn diagnostics_table(diag: &ResidualDiagnostics, alpha: f64) -> String {
    let verdict = |reject: bool| if reject { "reject H0" } else { "fail to reject" };
    let bg = &diag.breusch_godfrey;
    let mut rows = vec![
        TestRow {
            test: format!("Breusch–Godfrey LM ({} lag)", bg.lags),
            statistic: num(bg.lm_statistic),
            p_value: num(bg.lm_p_value),
            result: verdict(bg.lm_p_value < alpha),
        },
        TestRow {
            test: "Breusch–Godfrey F".to_string(),
            statistic: num(bg.f_statistic),
            p_value: num(bg.f_p_value),
            result: verdict(bg.f_p_value < alpha),
        },
        TestRow {
            test: format!("ARCH LM ({} lags)", diag.arch.lags),
            statistic: num(diag.arch.lm_statistic),
            p_value: num(diag.arch.lm_p_value),
            result: verdict(diag.arch.lm_p_value < alpha),
        },
    ];
    if let Some(el) = &diag.escanciano_lobato {
        rows.push(TestRow {
            test: format!("Escanciano–Lobato (lag {})", el.selected_lag),
            statistic: num(el.statistic),
            p_value: num(el.p_value),
            result: verdict(el.rejects(alpha)),
        });
    }
    styled(Table::new(rows))
}

pub fn candidate_table(ranked: &[CandidateScore]) -> String {
    let rows = ranked.iter().enumerate().map(|(i, c)| CandidateRow {
        rank: i + 1,
        order: c.order.to_string(),
        r_squared: num(c.r_squared),
        aic: num(c.aic),
        bic: num(c.bic),
    });
    styled(Table::new(rows))
}

pub fn metrics_table(forecasts: &[&ForecastResult]) -> String {
    let rows = forecasts.iter().map(|f| MetricRow {
        model: f.model.clone(),
        mape: num(f.metrics.mape),
        mse: num(f.metrics.mse),
        mae: num(f.metrics.mae),
        r_squared: num(f.metrics.r_squared),
    });
    styled(Table::new(rows))
}

/// Every section of a run, in pipeline order.
pub fn render_report(report: &AnalysisReport) -> String {
    let alpha = report.config.alpha;
    let s = &report.sample;
    let mut out = String::new();

    section(&mut out, "Input sources", &missing_cells_table(&report.missing_cells));
    let _ = writeln!(
        out,
        "Aligned panel: {} rows, {} to {}. Train {} rows (to {}), test {} rows (from {}).\n",
        s.panel_rows, s.first_date, s.last_date, s.train_rows, s.train_end, s.test_rows,
        s.test_start
    );
    section(&mut out, "Stationarity (ADF, constant)", &stationarity_table(&report.stationarity));
    section(&mut out, "Covariate correlations", &correlation_table(&report.correlation));
    for pair in &report.correlated_pairs {
        let _ = writeln!(
            out,
            "High correlation: {} / {} ({:.3})",
            pair.first, pair.second, pair.correlation
        );
    }
    section(&mut out, "Transform decisions", &decisions_table(&report.features.decisions));
    section(&mut out, "VIF before transform", &vif_table(&report.features.initial_vif));
    section(&mut out, "VIF of estimation design", &vif_table(&report.features.final_vif));

    let mlr_title = format!(
        "MLR coefficients ({} covariance), R² {:.4}, adj. R² {:.4}",
        report.mlr.covariance_type, report.mlr.r_squared, report.mlr.adj_r_squared
    );
    section(&mut out, &mlr_title, &coefficient_table(&report.mlr.coefficients));
    section(
        &mut out,
        "MLR residual diagnostics",
        &diagnostics_table(&report.residual_diagnostics, alpha),
    );

    section(&mut out, "ARIMAX order search", &candidate_table(&report.arimax.ranked));
    for failure in &report.arimax.failures {
        let _ = writeln!(out, "Skipped {}: {}", failure.order, failure.reason);
    }
    let best = &report.arimax.best;
    let arimax_title = format!(
        "ARIMAX{} coefficients, log-lik {:.2}, AIC {:.2}, σ² {:.3e}",
        best.order, best.log_likelihood, best.aic, best.sigma2
    );
    section(&mut out, &arimax_title, &coefficient_table(&best.coefficients));

    let forecasts = [&report.mlr_forecast, &report.arimax_forecast];
    section(&mut out, "Out-of-sample evaluation", &metrics_table(&forecasts));
    for f in forecasts {
        for w in &f.metrics.warnings {
            let _ = writeln!(out, "{}: {w}", f.model);
        }
    }
    out
}

// ---- Helper methods ----

fn styled(mut table: Table) -> String {
    table.with(Style::rounded());
    table.to_string()
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "== {title} ==\n{body}\n");
}

fn num(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x != 0.0 && (x.abs() < 1e-4 || x.abs() >= 1e6) {
        format!("{x:.4e}")
    } else {
        format!("{x:.4}")
    }
}
