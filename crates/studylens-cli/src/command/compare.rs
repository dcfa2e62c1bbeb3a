use std::path::PathBuf;

use anyhow::Context;
use studylens_analysis::{annotate::AnnotatedRun, comparison::Comparisons};

use crate::{
    command::{StatsArg, report},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CompareArg {
    /// Path to a per-run statistics JSON file written by `analyze`
    pub stats_file: PathBuf,

    #[command(flatten)]
    pub comparison: StatsArg,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let runs: Vec<AnnotatedRun> = util::read_json_file("statistics", &arg.stats_file)?;
    log::info!(
        "Loaded statistics for {} runs from {}",
        runs.len(),
        arg.stats_file.display()
    );

    let comparisons = Comparisons::compute(&runs, &arg.comparison.stats)
        .with_context(|| format!("Failed to compare runs in {}", arg.stats_file.display()))?;

    report::print_comparisons(&comparisons)
}
