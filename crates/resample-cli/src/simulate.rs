//! CLI helpers for running a resampling study end to end.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use resample_classifiers::config::SimulationConfig;
use resample_classifiers::data_handling::Dataset;
use resample_classifiers::io::{read_passenger_dataset, InputConfig};
use resample_classifiers::report::{build_html_report, format_report, write_plots};
use resample_classifiers::simulation::{MonteCarloRunner, SimulationOutcome};
use resample_classifiers::stats::{aggregate, AggregateReport};

/// File the aggregate report is serialized to, next to the plots.
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.html";

/// Everything the `simulate` subcommand needs besides the data path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub input: InputConfig,
    /// Directory receiving the plot files and `summary.json`.
    pub output_dir: PathBuf,
    pub write_plots: bool,
    /// Also write a single-page HTML report with the summary table and plots.
    pub write_report: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            input: InputConfig::default(),
            output_dir: PathBuf::from("resample_output"),
            write_plots: true,
            write_report: true,
        }
    }
}

/// Load a run configuration from a JSON file. Missing keys take their defaults.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: RunConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// Results of a finished run.
#[derive(Debug)]
pub struct RunResult {
    pub dataset: Dataset,
    pub outcome: SimulationOutcome,
    pub report: AggregateReport,
}

impl RunResult {
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = format_report(&self.report);
        if self.outcome.n_skipped > 0 {
            lines.push(format!(
                "Skipped {} of {} trials (training fold could not be fitted)",
                self.outcome.n_skipped,
                self.outcome.n_skipped + self.outcome.trials.len()
            ));
        }
        lines
    }
}

/// Read the passenger table, run every trial and aggregate the results.
pub fn run_simulation<P: AsRef<Path>>(data_path: P, config: &RunConfig) -> Result<RunResult> {
    let dataset = read_passenger_dataset(&data_path, &config.input)?;
    dataset.log_input_data_summary();

    let runner = MonteCarloRunner::new(config.simulation.clone());
    let outcome = runner
        .run(&dataset)
        .context("Monte Carlo simulation failed")?;
    let report = aggregate(&outcome.trials, &dataset.feature_names)
        .context("Failed to aggregate trial results")?;

    Ok(RunResult {
        dataset,
        outcome,
        report,
    })
}

/// Write `summary.json` and, if enabled, the HTML plots and report page.
/// Returns the written paths.
pub fn write_run_outputs(result: &RunResult, config: &RunConfig) -> Result<Vec<PathBuf>> {
    let out_dir = &config.output_dir;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let summary_path = out_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&result.report)
        .context("Failed to serialize aggregate report")?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("Failed to write summary: {}", summary_path.display()))?;
    log::info!("Wrote {}", summary_path.display());

    let mut written = vec![summary_path];
    if config.write_plots {
        written.extend(write_plots(&result.outcome, out_dir)?);
    }
    if config.write_report {
        let config_json =
            serde_json::to_string_pretty(config).context("Failed to serialize run config")?;
        let report_path = out_dir.join(REPORT_FILE);
        std::fs::write(
            &report_path,
            build_html_report(&result.report, &result.outcome, &config_json),
        )
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        log::info!("Wrote {}", report_path.display());
        written.push(report_path);
    }
    Ok(written)
}
