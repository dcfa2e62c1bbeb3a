//! Sign counts for paired observations.
//!
//! A paired observation is a `(baseline, treatment)` tuple measured on the same
//! subject under two conditions. [`SignCount`] tallies in which direction the
//! treatment value moved relative to the baseline. No significance test is
//! performed; only the raw counts are reported.

/// Direction counts over a set of paired observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignCount {
    /// Pairs where the treatment value is strictly less than the baseline.
    pub lower: usize,
    /// Pairs where the treatment value is strictly greater than the baseline.
    pub higher: usize,
    /// Pairs where both values are equal.
    pub tied: usize,
    /// Pairs that cannot be ordered (either value is missing or NaN).
    pub unordered: usize,
}

impl SignCount {
    /// Counts the sign of `treatment - baseline` for each pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use studylens_stats::paired::SignCount;
    ///
    /// let count = SignCount::from_pairs([(1.0, 2.0), (1.0, f64::NAN)]);
    /// assert_eq!(count.higher, 1);
    /// assert_eq!(count.unordered, 1);
    /// assert_eq!(count.total(), 2);
    /// ```
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::from_optional_pairs(pairs.into_iter().map(|(b, t)| (Some(b), Some(t))))
    }

    /// Like [`SignCount::from_pairs`], but a pair with a missing side is
    /// counted as unordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use studylens_stats::paired::SignCount;
    ///
    /// let count = SignCount::from_optional_pairs([(Some(2.0), Some(1.0)), (None, Some(1.0))]);
    /// assert_eq!(count.lower, 1);
    /// assert_eq!(count.unordered, 1);
    /// ```
    #[must_use]
    pub fn from_optional_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
    {
        let mut count = Self::default();
        for pair in pairs {
            let ordering = match pair {
                (Some(baseline), Some(treatment)) => treatment.partial_cmp(&baseline),
                _ => None,
            };
            match ordering {
                Some(std::cmp::Ordering::Less) => count.lower += 1,
                Some(std::cmp::Ordering::Greater) => count.higher += 1,
                Some(std::cmp::Ordering::Equal) => count.tied += 1,
                None => count.unordered += 1,
            }
        }
        count
    }

    /// Total number of pairs seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.lower + self.higher + self.tied + self.unordered
    }
}
