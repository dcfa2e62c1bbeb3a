//! Small statistical helpers for the studylens project.
//!
//! This crate provides the numeric building blocks used by the user-study
//! analysis:
//!
//! - **Combinatorics**: Binomial coefficients and the number of subsets of
//!   bounded size, used as normalization denominators
//! - **Paired comparison**: Sign counts over paired observations (how many
//!   pairs went down, went up, or stayed the same)
//!
//! # Modules
//!
//! - [`combinatorics`]: Binomial coefficients and bounded subset counts
//! - [`paired`]: Sign counts for paired before/after observations
//!
//! # Examples
//!
//! ## Counting feature combinations
//!
//! ```
//! use studylens_stats::combinatorics::subsets_up_to;
//!
//! // Subsets of size 0..=2 from 4 items: 1 + 4 + 6
//! assert_eq!(subsets_up_to(4, 2), 11);
//! ```
//!
//! ## Counting changes in paired observations
//!
//! ```
//! use studylens_stats::paired::SignCount;
//!
//! // (baseline, treatment) pairs
//! let pairs = [(3.0, 1.0), (2.0, 2.0), (1.0, 5.0)];
//! let count = SignCount::from_pairs(pairs);
//! assert_eq!(count.lower, 1);
//! assert_eq!(count.higher, 1);
//! assert_eq!(count.tied, 1);
//! ```

pub mod combinatorics;
pub mod paired;
