//! Trajsim - pairwise trajectory similarity over a batch of experiments
//!
//! Loads normalized experiment records, compares every same-scenario pair
//! and prints the results as JSON on stdout. Logs go to stderr.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trajsim::analysis::{analyze_groups, ExperimentSummary};
use trajsim::experiment::{load_experiments, ExperimentStore};
use trajsim::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(name = "trajsim")]
#[command(about = "Compare logged simulation runs within each scenario")]
struct Cli {
    /// JSON array of experiment records
    experiments: PathBuf,

    /// JSON analysis configuration (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the low health ratio
    #[arg(long)]
    low_health_ratio: Option<f64>,

    /// Override the path overlap distance threshold
    #[arg(long)]
    overlap_threshold: Option<f64>,

    /// Compute pairs on a single thread
    #[arg(long)]
    serial: bool,

    /// Print the full report instead of one summary row per pair
    #[arg(long)]
    detailed: bool,

    /// Also print one summary row per loaded experiment
    #[arg(long)]
    experiment_summary: bool,
}

impl Cli {
    /// Config file (or defaults), then command-line overrides.
    fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let base = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        self.apply_overrides(base)
    }

    fn apply_overrides(&self, mut config: AnalysisConfig) -> anyhow::Result<AnalysisConfig> {
        if let Some(ratio) = self.low_health_ratio {
            config = config.with_low_health_ratio(ratio);
        }
        if let Some(threshold) = self.overlap_threshold {
            config = config.with_overlap_threshold(threshold);
        }
        if self.serial {
            config = config.with_parallel(false);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trajsim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.analysis_config()?;

    info!("Loading experiments from: {}", cli.experiments.display());
    let loaded = load_experiments(&cli.experiments)
        .with_context(|| format!("failed to read {}", cli.experiments.display()))?;
    for failure in &loaded.failures {
        warn!(
            index = failure.index,
            experiment = %failure.experiment,
            "excluded: {}",
            failure.error
        );
    }
    if loaded.experiments.is_empty() {
        bail!("no valid experiments in {}", cli.experiments.display());
    }

    let store: ExperimentStore = loaded.experiments.into_iter().collect();
    let groups = store.scenario_groups();
    info!(
        experiments = store.experiment_count(),
        scenarios = groups.len(),
        "starting pairwise analysis"
    );

    let report = analyze_groups(&groups, &config)?;

    let mut stdout = std::io::stdout().lock();
    if cli.experiment_summary {
        let rows: Vec<ExperimentSummary> =
            store.experiments().iter().map(ExperimentSummary::from).collect();
        serde_json::to_writer_pretty(&mut stdout, &rows)?;
        writeln!(stdout)?;
    }
    if cli.detailed {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
    } else {
        serde_json::to_writer_pretty(&mut stdout, &report.summaries())?;
    }
    writeln!(stdout)?;

    info!(
        pairs = report.results.len(),
        failed = report.failures.len(),
        "analysis complete"
    );
    Ok(())
}
