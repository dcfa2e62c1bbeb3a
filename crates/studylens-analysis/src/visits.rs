//! Feature combinations a participant dwelt on during a run.
//!
//! # Algorithm
//!
//! The log is replayed into a sequence of *state samples*: after every feature
//! add or remove, the resulting selection and the event time. A sample's dwell
//! time runs until the next sample. The last sample has no successor, so its
//! dwell time is unbounded and it is always kept.
//!
//! ```text
//! time      0      1000     2000   2001    3000
//! event    +A       +B       +C     -C      +D
//! state    (A)     (A,B)  (A,B,C)  (A,B)  (A,B,D)
//! dwell    1000    1000      1      999     ∞
//! kept      ✓        ✓       ✗       ✗       ✓      (threshold 1000)
//! ```
//!
//! Kept samples are deduplicated into the set of visited combinations. A
//! combination counts as visited if any single visit to it meets the threshold;
//! visits are never summed.

use serde::{Deserialize, Serialize};

use crate::{
    combo::{self, FeatureCombo},
    run::{LogEvent, Run},
};

/// Minimum time, in log time units, a selection must persist to count as visited.
pub const DEFAULT_DWELL_THRESHOLD: f64 = 1000.0;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("feature '{feature}' removed at time {time} was not selected")]
pub struct StateError {
    pub feature: String,
    pub time: f64,
}

/// The selection right after an add or remove event.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSample {
    pub combo: FeatureCombo,
    pub time: f64,
}

impl StateSample {
    /// Replays `events` into state samples, in log order.
    ///
    /// Events other than feature adds and removes are skipped.
    pub fn from_events(events: &[LogEvent]) -> Result<Vec<Self>, StateError> {
        let mut samples = Vec::new();
        for event in events {
            let sample = match event {
                LogEvent::FeatureAdd {
                    feature,
                    selected,
                    time,
                } => {
                    let combo = selected.iter().chain([feature]).map(String::as_str);
                    StateSample {
                        combo: FeatureCombo::new(combo),
                        time: *time,
                    }
                }
                LogEvent::FeatureRemove {
                    feature,
                    selected,
                    time,
                } => {
                    if !selected.contains(feature) {
                        return Err(StateError {
                            feature: feature.clone(),
                            time: *time,
                        });
                    }
                    let combo = selected
                        .iter()
                        .filter(|f| *f != feature)
                        .map(String::as_str);
                    StateSample {
                        combo: FeatureCombo::new(combo),
                        time: *time,
                    }
                }
                LogEvent::Other { .. } => continue,
            };
            samples.push(sample);
        }
        Ok(samples)
    }
}

/// Time spent on each sample before the next one. The last is infinite.
#[must_use]
pub fn dwell_times(samples: &[StateSample]) -> Vec<f64> {
    let mut times = samples
        .windows(2)
        .map(|pair| pair[1].time - pair[0].time)
        .collect::<Vec<_>>();
    if !samples.is_empty() {
        times.push(f64::INFINITY);
    }
    times
}

/// Distinct combinations held for at least `threshold`, sorted.
pub fn visited_combos(events: &[LogEvent], threshold: f64) -> Result<Vec<FeatureCombo>, StateError> {
    let samples = StateSample::from_events(events)?;
    let dwell = dwell_times(&samples);

    if dwell.iter().any(|&d| d < 0.0) {
        log::warn!("Log timestamps decrease; affected states are treated as not visited");
    }

    // The last sample is kept whatever the threshold, even NaN
    let last = samples.len().saturating_sub(1);
    let visited = samples
        .into_iter()
        .zip(dwell)
        .enumerate()
        .filter(|(index, (_, dwell))| *index == last || *dwell >= threshold)
        .map(|(_, (sample, _))| sample.combo);
    Ok(combo::distinct_combos(visited))
}

/// Exploration statistics of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitStats {
    pub states_visited: Vec<FeatureCombo>,
    pub num_states_visited: usize,
    /// `num_states_visited` over the dataset's combination count
    pub pct_states_visited: f64,
    pub features_used: Vec<String>,
    pub num_features_used: usize,
    /// `num_features_used` over the dataset's feature count
    pub pct_features_used: f64,
}

impl VisitStats {
    pub fn from_run(run: &Run, threshold: f64) -> Result<Self, StateError> {
        let states_visited = visited_combos(&run.logs, threshold)?;
        let features_used = combo::union_features(&states_visited);

        Ok(Self {
            num_states_visited: states_visited.len(),
            pct_states_visited: run.dataset.fraction_of_combos(states_visited.len()),
            num_features_used: features_used.len(),
            pct_features_used: run.dataset.fraction_of_features(features_used.len()),
            states_visited,
            features_used,
        })
    }
}
