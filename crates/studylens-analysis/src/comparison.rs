//! Within-participant comparison of paired runs.
//!
//! Every participant did two tasks, so runs can be paired per participant
//! along two axes:
//!
//! - **Ratings**: the task with ratings shown against the task without
//! - **Order**: the first task against the second
//!
//! For each requested statistic the comparison counts how many participants
//! moved in the direction of interest. Only raw counts are produced.
//!
//! # Grouping
//!
//! Runs are grouped into `participant → axis value → run`. The grouping is
//! validated after it is built: a participant must have exactly one run for
//! every value of the axis, otherwise the comparison is rejected.

use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
};

use studylens_stats::paired::SignCount;

use crate::{
    annotate::{AnnotatedRun, Statistic},
    run::TaskOrder,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GroupingError {
    #[display("participant {participant} has more than one run with {axis} = {value}")]
    Duplicate {
        participant: String,
        axis: PairingAxis,
        value: String,
    },
    #[display("participant {participant} has no run with {axis} = {value}")]
    Missing {
        participant: String,
        axis: PairingAxis,
        value: String,
    },
}

/// Attribute along which two runs of a participant are paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairingAxis {
    Ratings,
    Order,
}

impl fmt::Display for PairingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairingAxis::Ratings => "ratings",
            PairingAxis::Order => "order",
        };
        fmt::Display::fmt(name, f)
    }
}

/// Two-level grouping `participant → key → run`, validated to be complete.
#[derive(Debug, Clone)]
pub struct ParticipantGroups<'a, K> {
    pub groups: BTreeMap<&'a str, BTreeMap<K, &'a AnnotatedRun>>,
}

impl<'a, K> ParticipantGroups<'a, K>
where
    K: Ord + Copy + Debug,
{
    /// Groups `runs` by participant and `key`.
    ///
    /// Fails if a participant has two runs with the same key, or lacks a run
    /// for any of `expected` keys.
    pub fn new<F>(
        runs: &'a [AnnotatedRun],
        axis: PairingAxis,
        expected: &[K],
        mut key: F,
    ) -> Result<Self, GroupingError>
    where
        F: FnMut(&AnnotatedRun) -> K,
    {
        let mut groups = BTreeMap::<&str, BTreeMap<K, &AnnotatedRun>>::new();
        for run in runs {
            let value = key(run);
            let inner = groups.entry(run.participant.as_str()).or_default();
            if inner.insert(value, run).is_some() {
                return Err(GroupingError::Duplicate {
                    participant: run.participant.clone(),
                    axis,
                    value: format!("{value:?}"),
                });
            }
        }

        for (participant, inner) in &groups {
            if let Some(value) = expected.iter().find(|value| !inner.contains_key(*value)) {
                return Err(GroupingError::Missing {
                    participant: (*participant).to_owned(),
                    axis,
                    value: format!("{value:?}"),
                });
            }
        }

        Ok(Self { groups })
    }

    /// `(baseline, treatment)` run pairs, one per participant.
    pub fn pairs(
        &self,
        baseline: K,
        treatment: K,
    ) -> impl Iterator<Item = (&'a AnnotatedRun, &'a AnnotatedRun)> + '_ {
        self.groups
            .values()
            .filter_map(move |inner| Some((*inner.get(&baseline)?, *inner.get(&treatment)?)))
    }
}

/// Participant counts per statistic, in requested order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticCounts(Vec<(Statistic, usize)>);

impl StatisticCounts {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Statistic, usize)>,
    {
        let mut pairs: Vec<(Statistic, usize)> = Vec::new();
        for (stat, count) in counts {
            if !pairs.iter().any(|(seen, _)| *seen == stat) {
                pairs.push((stat, count));
            }
        }
        Self(pairs)
    }

    #[must_use]
    pub fn get(&self, stat: Statistic) -> Option<usize> {
        self.0
            .iter()
            .find(|(seen, _)| *seen == stat)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Statistic, usize)> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn count_pairs<'a, I, F>(pairs: I, stats: &[Statistic], mut select: F) -> StatisticCounts
where
    I: IntoIterator<Item = (&'a AnnotatedRun, &'a AnnotatedRun)>,
    F: FnMut(&SignCount) -> usize,
{
    let pairs = pairs.into_iter().collect::<Vec<_>>();
    StatisticCounts::from_counts(stats.iter().map(|&stat| {
        let sign = SignCount::from_optional_pairs(
            pairs
                .iter()
                .map(|(baseline, treatment)| (baseline.statistic(stat), treatment.statistic(stat))),
        );
        (stat, select(&sign))
    }))
}

/// Counts participants whose value is strictly lower with ratings than without.
pub fn compare_ratings(
    runs: &[AnnotatedRun],
    stats: &[Statistic],
) -> Result<StatisticCounts, GroupingError> {
    let groups = ParticipantGroups::new(runs, PairingAxis::Ratings, &[false, true], |run| {
        run.ratings
    })?;
    Ok(count_pairs(groups.pairs(false, true), stats, |sign| {
        sign.lower
    }))
}

/// Counts participants whose value is strictly higher in the second task.
pub fn compare_order(
    runs: &[AnnotatedRun],
    stats: &[Statistic],
) -> Result<StatisticCounts, GroupingError> {
    let groups = ParticipantGroups::new(
        runs,
        PairingAxis::Order,
        &[TaskOrder::First, TaskOrder::Second],
        |run| run.order,
    )?;
    Ok(count_pairs(
        groups.pairs(TaskOrder::First, TaskOrder::Second),
        stats,
        |sign| sign.higher,
    ))
}

/// Results of both comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparisons {
    pub ratings: StatisticCounts,
    pub order: StatisticCounts,
}

impl Comparisons {
    pub fn compute(runs: &[AnnotatedRun], stats: &[Statistic]) -> Result<Self, GroupingError> {
        Ok(Self {
            ratings: compare_ratings(runs, stats)?,
            order: compare_order(runs, stats)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Dataset, notes::NoteStats, visits::VisitStats};

    #[expect(clippy::cast_precision_loss)]
    fn annotated(participant: &str, ratings: bool, order: TaskOrder, visited: usize) -> AnnotatedRun {
        AnnotatedRun {
            participant: participant.to_owned(),
            ratings,
            dataset: Dataset::Bank,
            order,
            visits: VisitStats {
                states_visited: vec![],
                num_states_visited: visited,
                pct_states_visited: Dataset::Bank.fraction_of_combos(visited),
                features_used: vec![],
                num_features_used: visited / 2,
                pct_features_used: Dataset::Bank.fraction_of_features(visited / 2),
            },
            notes: NoteStats {
                num_notes: 3,
                states_with_notes: vec![],
                num_states_with_notes: 2,
                pct_states_with_notes: Dataset::Bank.fraction_of_combos(2),
                features_with_notes: vec![],
                num_features_with_notes: 2,
                pct_features_with_notes: Dataset::Bank.fraction_of_features(2),
            },
            pct_visited_states_with_notes: (visited > 0).then(|| 2.0 / visited as f64),
        }
    }

    /// p1: fewer states with ratings (first task), more in second task
    /// p2: more states with ratings (second task), more in second task
    /// p3: equal everywhere
    fn study() -> Vec<AnnotatedRun> {
        vec![
            annotated("p1", true, TaskOrder::First, 4),
            annotated("p1", false, TaskOrder::Second, 10),
            annotated("p2", false, TaskOrder::First, 4),
            annotated("p2", true, TaskOrder::Second, 10),
            annotated("p3", true, TaskOrder::First, 6),
            annotated("p3", false, TaskOrder::Second, 6),
        ]
    }

    #[test]
    fn test_compare_ratings() {
        let counts = compare_ratings(&study(), &Statistic::DEFAULT_COMPARED).unwrap();
        assert_eq!(counts.get(Statistic::NumStatesVisited), Some(1));
        assert_eq!(counts.get(Statistic::PctFeaturesUsed), Some(1));
        // Lower fraction for p2 only, where ratings has more visits
        assert_eq!(counts.get(Statistic::PctVisitedStatesWithNotes), Some(1));
        assert_eq!(counts.get(Statistic::NumStatesWithNotes), Some(0));
        assert_eq!(counts.get(Statistic::PctFeaturesWithNotes), Some(0));
    }

    #[test]
    fn test_compare_order() {
        let counts = compare_order(&study(), &Statistic::DEFAULT_COMPARED).unwrap();
        assert_eq!(counts.get(Statistic::NumStatesVisited), Some(2));
        assert_eq!(counts.get(Statistic::PctFeaturesUsed), Some(2));
        assert_eq!(counts.get(Statistic::PctVisitedStatesWithNotes), Some(0));
        assert_eq!(counts.get(Statistic::NumStatesWithNotes), Some(0));
    }

    #[test]
    fn test_every_requested_stat_present_in_order() {
        let counts = compare_ratings(&study(), &Statistic::ALL).unwrap();
        let names = counts.iter().map(|(stat, _)| stat).collect::<Vec<_>>();
        assert_eq!(names, Statistic::ALL);
        assert!(counts.iter().all(|(_, count)| count <= 3));
    }

    #[test]
    fn test_duplicate_stats_reported_once() {
        let stats = [Statistic::NumNotes, Statistic::NumNotes];
        let counts = compare_order(&study(), &stats).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(Statistic::NumNotes), Some(0));
    }

    #[test]
    fn test_counts_keyed_by_statistic() {
        let counts = StatisticCounts::from_counts([
            (Statistic::NumNotes, 2),
            (Statistic::PctStatesVisited, 1),
            (Statistic::NumNotes, 5),
        ]);
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            [(Statistic::NumNotes, 2), (Statistic::PctStatesVisited, 1)]
        );
        assert_eq!(counts.get(Statistic::NumFeaturesUsed), None);
    }

    #[test]
    fn test_empty_input() {
        let counts = compare_ratings(&[], &Statistic::DEFAULT_COMPARED).unwrap();
        assert_eq!(counts.len(), 5);
        assert!(counts.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn test_missing_half_is_rejected() {
        let mut runs = study();
        runs.remove(1);
        let err = compare_ratings(&runs, &Statistic::DEFAULT_COMPARED).unwrap_err();
        assert!(
            matches!(&err, GroupingError::Missing { participant, axis: PairingAxis::Ratings, .. } if participant == "p1"),
            "{err}"
        );
        assert_eq!(err.to_string(), "participant p1 has no run with ratings = false");
    }

    #[test]
    fn test_duplicate_half_is_rejected() {
        let mut runs = study();
        runs.push(annotated("p3", true, TaskOrder::First, 6));
        assert!(matches!(
            compare_order(&runs, &Statistic::DEFAULT_COMPARED),
            Err(GroupingError::Duplicate { axis: PairingAxis::Order, .. })
        ));
    }

    #[test]
    fn test_grouping_independent_of_input_order() {
        let runs = study();
        let mut reversed = runs.clone();
        reversed.reverse();
        let mut rotated = runs.clone();
        rotated.rotate_left(3);

        let key = |run: &AnnotatedRun| run.ratings;
        let expected = ParticipantGroups::new(&runs, PairingAxis::Ratings, &[false, true], key)
            .unwrap()
            .groups;
        for shuffled in [&reversed, &rotated] {
            let groups = ParticipantGroups::new(shuffled, PairingAxis::Ratings, &[false, true], key)
                .unwrap()
                .groups;
            assert_eq!(groups, expected);
        }
    }

    #[test]
    fn test_undefined_values_never_count() {
        let runs = vec![
            annotated("p1", true, TaskOrder::First, 0),
            annotated("p1", false, TaskOrder::Second, 5),
        ];
        let stats = [Statistic::PctVisitedStatesWithNotes];
        assert_eq!(compare_ratings(&runs, &stats).unwrap().get(stats[0]), Some(0));
        assert_eq!(compare_order(&runs, &stats).unwrap().get(stats[0]), Some(0));
    }

    #[test]
    fn test_counts_survive_json_roundtrip() {
        let runs = study();
        let comparisons = Comparisons::compute(&runs, &Statistic::DEFAULT_COMPARED).unwrap();

        let text = serde_json::to_string_pretty(&runs).unwrap();
        let restored: Vec<AnnotatedRun> = serde_json::from_str(&text).unwrap();
        let recomputed = Comparisons::compute(&restored, &Statistic::DEFAULT_COMPARED).unwrap();

        assert_eq!(recomputed, comparisons);
    }
}
