//! Canonical feature combinations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of selected features in canonical form.
///
/// Feature identifiers are kept sorted and duplicate-free, so two combinations
/// built from the same features in any order compare equal. The derived
/// ordering is lexicographic over the sorted identifiers, which puts the empty
/// combination first.
///
/// Serialized as a JSON array of strings. Deserialization canonicalizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureCombo(Vec<String>);

impl FeatureCombo {
    #[must_use]
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = features.into_iter().map(Into::into).collect::<BTreeSet<_>>();
        Self(set.into_iter().collect())
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, feature: &str) -> bool {
        self.0.binary_search_by(|f| f.as_str().cmp(feature)).is_ok()
    }
}

impl From<Vec<String>> for FeatureCombo {
    fn from(features: Vec<String>) -> Self {
        Self::new(features)
    }
}

impl From<FeatureCombo> for Vec<String> {
    fn from(combo: FeatureCombo) -> Self {
        combo.0
    }
}

/// Sorted, deduplicated combinations.
pub(crate) fn distinct_combos<I>(combos: I) -> Vec<FeatureCombo>
where
    I: IntoIterator<Item = FeatureCombo>,
{
    combos
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted union of the features appearing in any of `combos`.
pub(crate) fn union_features(combos: &[FeatureCombo]) -> Vec<String> {
    combos
        .iter()
        .flat_map(FeatureCombo::features)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        assert_eq!(FeatureCombo::new(["B", "A"]), FeatureCombo::new(["A", "B"]));
        assert_eq!(FeatureCombo::new(["B", "A"]).features(), ["A", "B"]);
    }

    #[test]
    fn test_idempotent() {
        let once = FeatureCombo::new(["C", "A", "B"]);
        let twice = FeatureCombo::new(once.features().to_vec());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicates_collapse() {
        let combo = FeatureCombo::new(["A", "A", "B"]);
        assert_eq!(combo.len(), 2);
        assert!(combo.contains("A"));
        assert!(!combo.contains("C"));
    }

    #[test]
    fn test_ordering_matches_sorted_tuples() {
        let mut combos = vec![
            FeatureCombo::new(["B"]),
            FeatureCombo::new(["A", "B"]),
            FeatureCombo::new(Vec::<String>::new()),
            FeatureCombo::new(["A"]),
        ];
        combos.sort();
        let as_vecs = combos
            .iter()
            .map(|c| c.features().join(","))
            .collect::<Vec<_>>();
        assert_eq!(as_vecs, ["", "A", "A,B", "B"]);
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let combo: FeatureCombo = serde_json::from_str(r#"["G", "A", "E"]"#).unwrap();
        assert_eq!(combo, FeatureCombo::new(["A", "E", "G"]));
        assert_eq!(serde_json::to_string(&combo).unwrap(), r#"["A","E","G"]"#);
    }

    #[test]
    fn test_union_features() {
        let combos = [FeatureCombo::new(["D", "A"]), FeatureCombo::new(["B", "A"])];
        assert_eq!(union_features(&combos), ["A", "B", "D"]);
        assert!(union_features(&[]).is_empty());
    }
}
