//! Codes and the feedback they produce.

use std::{fmt::Display, ops::Deref, str::FromStr};

use lazy_static::lazy_static;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CodeError, Result};

/// The number of slots in a code.
pub const SLOTS: usize = 4;

/// The number of distinct digits a slot can hold.
pub const DIGITS: usize = 10;

/// The number of distinct codes.
pub const SPACE: usize = 10_000;

lazy_static! {
    static ref ALL_CODES: Vec<Code> = (0..SPACE).map(Code::from_index_unchecked).collect();
}

/// A four digit code.
///
/// Digits may repeat. Codes order lexicographically by their digits, which
/// is the same order as their numeric value (see [`index()`](Code::index())).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Code {
    digits: [u8; SLOTS],
}

impl Code {
    /// Creates a new [`Code`] from four digits.
    ///
    /// Returns an error if any digit is larger than nine.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mastermind_rs::Code;
    /// let code = Code::new([1, 3, 0, 2])?;
    /// assert_eq!(code.to_string(), "1302");
    ///
    /// assert!(Code::new([1, 3, 10, 2]).is_err());
    /// #
    /// # Ok::<_, mastermind_rs::MastermindError>(())
    /// ```
    pub fn new(digits: [u8; SLOTS]) -> Result<Self> {
        if digits.iter().all(|&d| (d as usize) < DIGITS) {
            Ok(Code { digits })
        } else {
            Err(CodeError::InvalidFormat(format!("{:?}", digits)).into())
        }
    }

    /// Creates a new [`Code`] from its position in [`generate_all_codes()`].
    pub fn from_index(index: usize) -> Result<Self> {
        if index < SPACE {
            Ok(Self::from_index_unchecked(index))
        } else {
            Err(CodeError::InvalidIndex(index).into())
        }
    }

    fn from_index_unchecked(index: usize) -> Self {
        Code {
            digits: [
                (index / 1000 % 10) as u8,
                (index / 100 % 10) as u8,
                (index / 10 % 10) as u8,
                (index % 10) as u8,
            ],
        }
    }

    /// The position of this code in [`generate_all_codes()`].
    pub fn index(&self) -> usize {
        self.digits
            .iter()
            .fold(0, |acc, &d| acc * DIGITS + d as usize)
    }

    /// Counts how many times each digit appears in this code.
    pub fn counts(&self) -> [u8; DIGITS] {
        let mut counts = [0; DIGITS];
        for &d in &self.digits {
            counts[d as usize] += 1;
        }
        counts
    }

    /// Returns the repeated digit if all four slots hold the same one.
    pub fn monochromatic(&self) -> Option<u8> {
        let first = self.digits[0];
        self.digits.iter().all(|&d| d == first).then(|| first)
    }
}

impl Deref for Code {
    type Target = [u8; SLOTS];

    fn deref(&self) -> &Self::Target {
        &self.digits
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CodeError::InvalidFormat(s.to_string());

        if s.chars().count() != SLOTS {
            return Err(invalid());
        }

        let mut digits = [0; SLOTS];
        for (slot, c) in digits.iter_mut().zip(s.chars()) {
            *slot = c.to_digit(10).ok_or_else(invalid)? as u8;
        }

        Ok(Code { digits })
    }
}

/// Returns every code, in ascending order.
///
/// The list is built once and shared by every caller.
pub fn generate_all_codes() -> &'static [Code] {
    ALL_CODES.as_slice()
}

/// Scores a guess against a target.
///
/// The feedback is the size of the multiset intersection of the two codes:
/// for each digit, the smaller of its counts in `guess` and `target`, summed.
/// It ignores position entirely, so a feedback of four does not mean the
/// guess is correct.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::{compute_feedback, is_exact_match, Code};
/// let target: Code = "1302".parse()?;
/// assert_eq!(compute_feedback(&"4527".parse()?, &target), 1);
///
/// let guess: Code = "1122".parse()?;
/// let target: Code = "2211".parse()?;
/// assert_eq!(compute_feedback(&guess, &target), 4);
/// assert!(!is_exact_match(&guess, &target));
/// #
/// # Ok::<_, mastermind_rs::CodeError>(())
/// ```
pub fn compute_feedback(guess: &Code, target: &Code) -> u8 {
    feedback_from_counts(&guess.counts(), &target.counts())
}

/// Scores two precomputed digit histograms against each other.
pub(crate) fn feedback_from_counts(a: &[u8; DIGITS], b: &[u8; DIGITS]) -> u8 {
    a.iter().zip(b.iter()).map(|(&x, &y)| x.min(y)).sum()
}

/// Returns true if every slot of `guess` matches `target`.
pub fn is_exact_match(guess: &Code, target: &Code) -> bool {
    guess == target
}
