//! Binomial coefficients and bounded subset counts.

/// Computes the binomial coefficient `C(n, k)`.
///
/// Returns 0 when `k > n`. The multiplicative formula keeps every
/// intermediate value an exact integer.
///
/// # Examples
///
/// ```
/// use studylens_stats::combinatorics::binomial;
///
/// assert_eq!(binomial(19, 0), 1);
/// assert_eq!(binomial(19, 2), 171);
/// assert_eq!(binomial(3, 5), 0);
/// ```
#[must_use]
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Counts the subsets of size `0..=max_size` that can be drawn from `n` items.
///
/// # Examples
///
/// ```
/// use studylens_stats::combinatorics::subsets_up_to;
///
/// assert_eq!(subsets_up_to(19, 4), 5036);
/// assert_eq!(subsets_up_to(23, 4), 10903);
/// ```
#[must_use]
pub fn subsets_up_to(n: u64, max_size: u64) -> u64 {
    (0..=max_size).map(|k| binomial(n, k)).sum()
}
