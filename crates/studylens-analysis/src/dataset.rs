//! Static metadata for the datasets used in the study.

use serde::{Deserialize, Serialize};
use studylens_stats::combinatorics;

/// Largest combination size participants could build in the tool.
pub const MAX_COMBINATION_SIZE: u64 = 4;

/// A dataset explored by participants during a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
#[display(rename_all = "lowercase")]
#[from_str(rename_all = "lowercase")]
pub enum Dataset {
    Bank,
    Rain,
}

impl Dataset {
    pub const ALL: [Self; 2] = [Self::Bank, Self::Rain];

    /// Number of features the dataset exposes.
    #[must_use]
    pub fn total_features(self) -> u64 {
        match self {
            Self::Bank => 19,
            Self::Rain => 23,
        }
    }

    /// Number of feature combinations of size `0..=MAX_COMBINATION_SIZE`.
    #[must_use]
    pub fn total_combos(self) -> u64 {
        combinatorics::subsets_up_to(self.total_features(), MAX_COMBINATION_SIZE)
    }

    /// `count` as a fraction of [`Dataset::total_features`].
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fraction_of_features(self, count: usize) -> f64 {
        count as f64 / self.total_features() as f64
    }

    /// `count` as a fraction of [`Dataset::total_combos`].
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fraction_of_combos(self, count: usize) -> f64 {
        count as f64 / self.total_combos() as f64
    }
}
