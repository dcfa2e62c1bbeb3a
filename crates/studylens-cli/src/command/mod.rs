use clap::{Parser, Subcommand};
use studylens_analysis::annotate::Statistic;

use self::{analyze::AnalyzeArg, compare::CompareArg};

mod analyze;
mod compare;
mod report;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compute per-run statistics from ./logs and ./notes and compare paired runs
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Compare paired runs from a previously written statistics file
    Compare(#[clap(flatten)] CompareArg),
}

/// Statistics compared between the paired runs of each participant.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatsArg {
    /// Statistics to compare (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = Statistic::DEFAULT_COMPARED.map(Statistic::as_str))]
    pub stats: Vec<Statistic>,
}

impl Default for StatsArg {
    fn default() -> Self {
        Self {
            stats: Statistic::DEFAULT_COMPARED.to_vec(),
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Analyze(AnalyzeArg::default())) {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Compare(arg) => compare::run(&arg)?,
    }
    Ok(())
}
