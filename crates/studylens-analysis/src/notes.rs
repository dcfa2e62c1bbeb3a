//! Statistics on the notes participants took during a run.

use serde::{Deserialize, Serialize};

use crate::{
    combo::{self, FeatureCombo},
    run::Run,
};

/// Annotation statistics of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteStats {
    pub num_notes: usize,
    /// Distinct combinations that were selected while a note was written
    pub states_with_notes: Vec<FeatureCombo>,
    pub num_states_with_notes: usize,
    pub pct_states_with_notes: f64,
    pub features_with_notes: Vec<String>,
    pub num_features_with_notes: usize,
    pub pct_features_with_notes: f64,
}

impl NoteStats {
    #[must_use]
    pub fn from_run(run: &Run) -> Self {
        let states_with_notes = combo::distinct_combos(run.notes.iter().map(|note| note.combo()));
        let features_with_notes = combo::union_features(&states_with_notes);

        Self {
            num_notes: run.notes.len(),
            num_states_with_notes: states_with_notes.len(),
            pct_states_with_notes: run.dataset.fraction_of_combos(states_with_notes.len()),
            num_features_with_notes: features_with_notes.len(),
            pct_features_with_notes: run.dataset.fraction_of_features(features_with_notes.len()),
            states_with_notes,
            features_with_notes,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::{dataset::Dataset, run::Note};

    /// Six notes over five distinct combinations, one of them with feature H.
    pub(crate) fn fixture_notes() -> Vec<Note> {
        serde_json::from_value(json!([
            {"body": "1", "state": {"selectedFeatures": ["A"]}},
            {"body": "2", "state": {"selectedFeatures": ["B", "C"]}},
            {"body": "3", "state": {"selectedFeatures": ["E", "A"]}},
            {"body": "4", "state": {"selectedFeatures": ["D", "H", "G", "F"]}},
            {"body": "5", "state": {"selectedFeatures": ["A", "E"]}},
            {"body": "6", "state": {"selectedFeatures": []}},
        ]))
        .unwrap()
    }

    #[test]
    fn test_fixture_note_stats() {
        for (name, dataset) in [
            ("01-no_ratings-bank-second", Dataset::Bank),
            ("02-ratings-rain-first", Dataset::Rain),
        ] {
            let run = Run::new(name.parse().unwrap(), vec![], fixture_notes());
            let stats = NoteStats::from_run(&run);

            assert_eq!(stats.num_notes, 6, "{dataset}");
            assert_eq!(
                stats.states_with_notes,
                [
                    FeatureCombo::new(Vec::<String>::new()),
                    FeatureCombo::new(["A"]),
                    FeatureCombo::new(["A", "E"]),
                    FeatureCombo::new(["B", "C"]),
                    FeatureCombo::new(["D", "F", "G", "H"]),
                ]
            );
            assert_eq!(stats.num_states_with_notes, 5);
            assert_eq!(stats.pct_states_with_notes, dataset.fraction_of_combos(5));
            assert_eq!(
                stats.features_with_notes,
                ["A", "B", "C", "D", "E", "F", "G", "H"]
            );
            assert_eq!(stats.num_features_with_notes, 8);
            assert_eq!(stats.pct_features_with_notes, dataset.fraction_of_features(8));
        }
    }

    #[test]
    fn test_blank_notes_are_not_counted() {
        let mut notes = fixture_notes();
        notes[0].body = "   ".to_owned();
        let run = Run::new("01-ratings-bank-first".parse().unwrap(), vec![], notes);
        let stats = NoteStats::from_run(&run);

        assert_eq!(stats.num_notes, 5);
        // (A) was only referenced by the blank note
        assert_eq!(stats.num_states_with_notes, 4);
    }

    #[test]
    fn test_no_notes() {
        let run = Run::new("01-ratings-bank-first".parse().unwrap(), vec![], vec![]);
        let stats = NoteStats::from_run(&run);
        assert_eq!(stats.num_notes, 0);
        assert!(stats.states_with_notes.is_empty());
        assert!(stats.features_with_notes.is_empty());
        assert!(stats.pct_states_with_notes.abs() < f64::EPSILON);
    }
}
