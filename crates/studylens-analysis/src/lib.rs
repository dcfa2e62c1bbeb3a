//! Descriptive statistics for the feature-selection user study
//!
//! This crate turns the interaction logs and notes recorded during the study
//! into per-run statistics, and compares the two runs of each participant.
//!
//! # Overview
//!
//! Each participant performed two data analysis tasks in a feature-selection
//! tool, once with feature ratings shown and once without. A task session is
//! called a *run*.
//!
//! ## Analysis Workflow
//!
//! 1. **Load Runs** ([`loader::load_runs`]): Pair log and notes files by
//!    session name and parse them into [`run::Run`]s
//! 2. **Extract Visits** ([`visits::VisitStats`]): Replay the log into the
//!    feature combinations the participant dwelt on
//! 3. **Aggregate Notes** ([`notes::NoteStats`]): Collect the combinations the
//!    participant annotated
//! 4. **Annotate** ([`annotate::AnnotatedRun`]): Combine both into per-run
//!    statistics
//! 5. **Compare** ([`comparison::Comparisons`]): Count participants whose
//!    statistics moved between their paired runs
//!
//! # Examples
//!
//! ```no_run
//! use std::{collections::BTreeSet, path::Path};
//!
//! use studylens_analysis::{
//!     annotate::{self, Statistic},
//!     comparison::Comparisons,
//!     loader,
//!     visits::DEFAULT_DWELL_THRESHOLD,
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let excluded = BTreeSet::from(["03".to_owned(), "08".to_owned()]);
//! let runs = loader::load_runs(Path::new("logs"), Path::new("notes"), &excluded)?;
//! let annotated = annotate::annotate_runs(&runs, DEFAULT_DWELL_THRESHOLD)?;
//!
//! let comparisons = Comparisons::compute(&annotated, &Statistic::DEFAULT_COMPARED)?;
//! for (stat, count) in comparisons.ratings.iter() {
//!     println!("{stat} {count}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod combo;
pub mod comparison;
pub mod dataset;
pub mod loader;
pub mod notes;
pub mod run;
pub mod visits;
