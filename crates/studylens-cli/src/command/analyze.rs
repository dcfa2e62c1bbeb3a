//! Full analysis: load runs, annotate them, compare paired runs.

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::Context;
use studylens_analysis::{
    annotate::{self, AnnotatedRun},
    comparison::Comparisons,
    loader::{self, DEFAULT_EXCLUDED_PARTICIPANTS},
    visits::DEFAULT_DWELL_THRESHOLD,
};

use crate::{
    command::{StatsArg, report},
    util::Output,
};

const DEFAULT_LOGS_DIR: &str = "./logs";
const DEFAULT_NOTES_DIR: &str = "./notes";
const DEFAULT_OUTPUT: &str = "user-study-stats.json";

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Directory containing the interaction log files
    #[arg(long, default_value = DEFAULT_LOGS_DIR)]
    pub logs: PathBuf,

    /// Directory containing the notes files
    #[arg(long, default_value = DEFAULT_NOTES_DIR)]
    pub notes: PathBuf,

    /// Output file for per-run statistics ("-" for stdout)
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Minimum time a feature selection must be kept to count as visited
    #[arg(long, default_value_t = DEFAULT_DWELL_THRESHOLD, value_parser = parse_dwell_threshold)]
    pub dwell_threshold: f64,

    /// Participant IDs excluded from the analysis (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_EXCLUDED_PARTICIPANTS)]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub comparison: StatsArg,
}

impl Default for AnalyzeArg {
    fn default() -> Self {
        Self {
            logs: DEFAULT_LOGS_DIR.into(),
            notes: DEFAULT_NOTES_DIR.into(),
            output: DEFAULT_OUTPUT.into(),
            dwell_threshold: DEFAULT_DWELL_THRESHOLD,
            exclude: DEFAULT_EXCLUDED_PARTICIPANTS.map(str::to_owned).to_vec(),
            comparison: StatsArg::default(),
        }
    }
}

fn parse_dwell_threshold(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| e.to_string())?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("expected a finite, non-negative number, got {value}"))
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let (runs, comparisons) = analyze(arg)?;

    Output::save_json(&runs, &arg.output)?;
    log::info!("Per-run statistics saved to {}", arg.output.display());

    report::print_comparisons(&comparisons)
}

/// Runs the pipeline and returns the runs in output order.
fn analyze(arg: &AnalyzeArg) -> anyhow::Result<(Vec<AnnotatedRun>, Comparisons)> {
    let excluded = arg.exclude.iter().cloned().collect::<BTreeSet<_>>();

    log::info!(
        "Loading runs from {} and {}...",
        arg.logs.display(),
        arg.notes.display()
    );
    let runs = loader::load_runs(&arg.logs, &arg.notes, &excluded).with_context(|| {
        format!(
            "Failed to load runs from {} and {}",
            arg.logs.display(),
            arg.notes.display()
        )
    })?;
    log::info!("Loaded {} runs", runs.len());

    log::info!(
        "Computing run statistics (dwell threshold {})...",
        arg.dwell_threshold
    );
    let mut annotated = annotate::annotate_runs(&runs, arg.dwell_threshold)
        .context("Failed to compute run statistics")?;

    log::info!("Comparing paired runs...");
    let comparisons = Comparisons::compute(&annotated, &arg.comparison.stats)
        .context("Failed to compare participant runs")?;

    annotate::sort_for_output(&mut annotated);
    Ok((annotated, comparisons))
}
