use anyhow::{Context, Result};
use clap::Parser;
use macro_regression::{
    config::AnalysisConfig,
    data::SourcePaths,
    pipeline::run_analysis,
    report::{render_report, write_json, write_plots},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compare MLR and ARIMAX forecasts of index log returns.
#[derive(Debug, Parser)]
#[command(name = "macro_regression", version, about)]
struct Cli {
    /// Index prices (`Date;…;Close;…`)
    #[arg(long, value_name = "PATH")]
    prices: PathBuf,

    /// Zero-coupon yield export (`TIME_PERIOD`, `OBS_VALUE`)
    #[arg(long, value_name = "PATH")]
    yield_curve: PathBuf,

    /// USD/NOK exchange rate export (`TIME_PERIOD`, `OBS_VALUE`)
    #[arg(long, value_name = "PATH")]
    fx: PathBuf,

    /// Monthly inflation index (`Date` as `YYYYMmm`, `kpi`)
    #[arg(long, value_name = "PATH")]
    inflation: PathBuf,

    /// TOML file overriding analysis defaults
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Directory for SVG plots
    #[arg(long, value_name = "DIR", default_value = "output")]
    out_dir: PathBuf,

    /// Also write the full report as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Skip plot rendering
    #[arg(long)]
    no_plots: bool,

    /// Run the ARIMAX order search on all cores
    #[arg(long)]
    parallel: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if cli.parallel {
        config.parallel_search = true;
    }

    let paths = SourcePaths {
        prices: cli.prices,
        yield_curve: cli.yield_curve,
        fx: cli.fx,
        inflation: cli.inflation,
    };
    let report = run_analysis(&paths, &config).context("analysis failed")?;

    println!("{}", render_report(&report));

    if !cli.no_plots {
        let written = write_plots(&report, &cli.out_dir)
            .with_context(|| format!("writing plots to {}", cli.out_dir.display()))?;
        for path in written {
            info!(path = %path.display(), "plot written");
        }
    }
    if let Some(path) = &cli.json {
        write_json(&report, path)
            .with_context(|| format!("writing JSON report to {}", path.display()))?;
        info!(path = %path.display(), "JSON report written");
    }
    Ok(())
}
