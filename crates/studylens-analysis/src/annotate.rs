//! Per-run statistics combining visits and notes.
//!
//! [`AnnotatedRun`] is what gets written to the output file: the session
//! attributes, [`VisitStats`], [`NoteStats`] and the cross-metric
//! `pct_visited_states_with_notes`, without the raw logs and notes.

use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    notes::NoteStats,
    run::{Run, TaskOrder},
    visits::{StateError, VisitStats},
};

/// A run with all derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRun {
    pub participant: String,
    pub ratings: bool,
    pub dataset: Dataset,
    pub order: TaskOrder,
    #[serde(flatten)]
    pub visits: VisitStats,
    #[serde(flatten)]
    pub notes: NoteStats,
    /// Noted combinations per visited combination.
    ///
    /// `None` (JSON `null`) when no combination was visited.
    pub pct_visited_states_with_notes: Option<f64>,
}

impl AnnotatedRun {
    pub fn from_run(run: &Run, dwell_threshold: f64) -> Result<Self, StateError> {
        let visits = VisitStats::from_run(run, dwell_threshold)?;
        let notes = NoteStats::from_run(run);
        let pct_visited_states_with_notes =
            visited_fraction_with_notes(notes.num_states_with_notes, visits.num_states_visited);
        if pct_visited_states_with_notes.is_none() {
            log::warn!(
                "Participant {} ({}, {}) visited no states; pct_visited_states_with_notes is undefined",
                run.participant,
                run.dataset,
                run.order
            );
        }

        Ok(Self {
            participant: run.participant.clone(),
            ratings: run.ratings,
            dataset: run.dataset,
            order: run.order,
            visits,
            notes,
            pct_visited_states_with_notes,
        })
    }

    /// Value of `stat` for this run, `None` when it is undefined.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn statistic(&self, stat: Statistic) -> Option<f64> {
        let value = match stat {
            Statistic::NumStatesVisited => self.visits.num_states_visited as f64,
            Statistic::PctStatesVisited => self.visits.pct_states_visited,
            Statistic::NumFeaturesUsed => self.visits.num_features_used as f64,
            Statistic::PctFeaturesUsed => self.visits.pct_features_used,
            Statistic::NumNotes => self.notes.num_notes as f64,
            Statistic::NumStatesWithNotes => self.notes.num_states_with_notes as f64,
            Statistic::PctStatesWithNotes => self.notes.pct_states_with_notes,
            Statistic::NumFeaturesWithNotes => self.notes.num_features_with_notes as f64,
            Statistic::PctFeaturesWithNotes => self.notes.pct_features_with_notes,
            Statistic::PctVisitedStatesWithNotes => return self.pct_visited_states_with_notes,
        };
        Some(value)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("failed to replay the log of participant {participant} ({order} task)")]
pub struct AnnotateError {
    pub participant: String,
    pub order: TaskOrder,
    pub source: StateError,
}

/// Annotates every run, in order.
pub fn annotate_runs(runs: &[Run], dwell_threshold: f64) -> Result<Vec<AnnotatedRun>, AnnotateError> {
    runs.iter()
        .map(|run| {
            AnnotatedRun::from_run(run, dwell_threshold).map_err(|source| AnnotateError {
                participant: run.participant.clone(),
                order: run.order,
                source,
            })
        })
        .collect()
}

/// Sorts runs the way they are written out: by participant, then without
/// ratings before with ratings.
pub fn sort_for_output(runs: &mut [AnnotatedRun]) {
    runs.sort_by(|a, b| {
        (a.participant.as_str(), a.ratings).cmp(&(b.participant.as_str(), b.ratings))
    });
}

#[expect(clippy::cast_precision_loss)]
fn visited_fraction_with_notes(num_states_with_notes: usize, num_states_visited: usize) -> Option<f64> {
    (num_states_visited > 0).then(|| num_states_with_notes as f64 / num_states_visited as f64)
}

/// A scalar statistic that can be compared between paired runs.
///
/// Parsed from and displayed as its snake_case field name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
)]
#[display(rename_all = "snake_case")]
#[from_str(rename_all = "snake_case")]
pub enum Statistic {
    NumStatesVisited,
    PctStatesVisited,
    NumFeaturesUsed,
    PctFeaturesUsed,
    NumNotes,
    NumStatesWithNotes,
    PctStatesWithNotes,
    NumFeaturesWithNotes,
    PctFeaturesWithNotes,
    PctVisitedStatesWithNotes,
}

impl Statistic {
    pub const ALL: [Self; 10] = [
        Self::NumStatesVisited,
        Self::PctStatesVisited,
        Self::NumFeaturesUsed,
        Self::PctFeaturesUsed,
        Self::NumNotes,
        Self::NumStatesWithNotes,
        Self::PctStatesWithNotes,
        Self::NumFeaturesWithNotes,
        Self::PctFeaturesWithNotes,
        Self::PctVisitedStatesWithNotes,
    ];

    /// Statistics compared between paired runs by default.
    pub const DEFAULT_COMPARED: [Self; 5] = [
        Self::NumStatesVisited,
        Self::PctFeaturesUsed,
        Self::NumStatesWithNotes,
        Self::PctFeaturesWithNotes,
        Self::PctVisitedStatesWithNotes,
    ];

    /// Field name of the statistic in the output file, same as its display form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NumStatesVisited => "num_states_visited",
            Self::PctStatesVisited => "pct_states_visited",
            Self::NumFeaturesUsed => "num_features_used",
            Self::PctFeaturesUsed => "pct_features_used",
            Self::NumNotes => "num_notes",
            Self::NumStatesWithNotes => "num_states_with_notes",
            Self::PctStatesWithNotes => "pct_states_with_notes",
            Self::NumFeaturesWithNotes => "num_features_with_notes",
            Self::PctFeaturesWithNotes => "pct_features_with_notes",
            Self::PctVisitedStatesWithNotes => "pct_visited_states_with_notes",
        }
    }
}
