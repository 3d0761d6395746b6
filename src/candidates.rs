//! Narrowing down and splitting candidate sets.

use std::{fmt::Display, ops::Deref};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::code::{feedback_from_counts, Code, DIGITS, SLOTS};

/// Keeps the candidates that would have produced `feedback` against `guess`.
///
/// The input is assumed to be consistent with every earlier observation, so
/// only the newest constraint is checked. The returned set keeps the input
/// order and is never larger than the input.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::{filter_candidates, generate_all_codes, Code};
/// let guess: Code = "0123".parse()?;
/// let left = filter_candidates(generate_all_codes(), &guess, 0);
/// assert_eq!(left.len(), 6 * 6 * 6 * 6);
/// #
/// # Ok::<_, mastermind_rs::CodeError>(())
/// ```
pub fn filter_candidates(candidates: &[Code], guess: &Code, feedback: u8) -> Vec<Code> {
    let guess_counts = guess.counts();
    candidates
        .iter()
        .filter(|c| feedback_from_counts(&guess_counts, &c.counts()) == feedback)
        .copied()
        .collect()
}

/// Drops a guess that was not an exact match from the candidate set.
///
/// Feedback never rules out the guess itself, so this is applied alongside
/// [`filter_candidates()`] whenever a guess misses.
pub fn exclude_guess(candidates: Vec<Code>, guess: &Code) -> Vec<Code> {
    let mut candidates = candidates;
    candidates.retain(|c| c != guess);
    candidates
}

/// The number of candidates that would produce each feedback value for a
/// fixed guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Partition {
    bins: [usize; SLOTS + 1],
}

impl Partition {
    /// Splits `candidates` by the feedback each would give against `guess`.
    pub fn new(guess: &Code, candidates: &[Code]) -> Self {
        let guess_counts = guess.counts();
        let mut bins = [0; SLOTS + 1];
        for c in candidates {
            bins[feedback_from_counts(&guess_counts, &c.counts()) as usize] += 1;
        }
        Partition { bins }
    }

    /// Same as [`new()`](Partition::new()) against histograms computed once
    /// per candidate set.
    pub(crate) fn from_counts(guess: &Code, candidate_counts: &[[u8; DIGITS]]) -> Self {
        let guess_counts = guess.counts();
        let mut bins = [0; SLOTS + 1];
        for c in candidate_counts {
            bins[feedback_from_counts(&guess_counts, c) as usize] += 1;
        }
        Partition { bins }
    }

    /// The number of candidates split up.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// The size of the largest group.
    pub fn worst_case(&self) -> usize {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// The size of the smallest non-empty group.
    pub fn best_case(&self) -> usize {
        self.bins
            .iter()
            .copied()
            .filter(|&n| n > 0)
            .min()
            .unwrap_or(0)
    }

    /// The number of non-empty groups.
    pub fn groups(&self) -> usize {
        self.bins.iter().filter(|&&n| n > 0).count()
    }

    /// Shannon entropy of the group sizes, in bits.
    pub fn entropy(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0. {
            return 0.;
        }

        self.bins
            .iter()
            .filter(|&&n| n > 0)
            .map(|&n| {
                let p = n as f64 / total;
                -p * p.log2()
            })
            .sum()
    }

    /// The mean number of candidates left after the guess, assuming every
    /// candidate is equally likely to be the target.
    pub fn expected_remaining(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0. {
            return 0.;
        }

        self.bins.iter().map(|&n| (n * n) as f64).sum::<f64>() / total
    }
}

impl Deref for Partition {
    type Target = [usize; SLOTS + 1];

    fn deref(&self) -> &Self::Target {
        &self.bins
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (feedback, &n) in self.bins.iter().enumerate().filter(|(_, n)| **n > 0) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", feedback, n)?;
            first = false;
        }
        Ok(())
    }
}
