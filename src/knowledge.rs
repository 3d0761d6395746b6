//! Deducing how often each digit occurs in the target.
//!
//! Only monochromatic guesses (one digit repeated in all four slots) are
//! used: their feedback is exactly the number of times that digit occurs in
//! the target. Mixed guesses carry frequency information too, but it is not
//! used here.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    code::{DIGITS, SLOTS},
    strategy::Round,
};

/// What is known about how many times one digit occurs in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct DigitKnowledge {
    /// The exact count, when it is known.
    pub confirmed: Option<u8>,
    pub min: u8,
    pub max: u8,
}

impl Default for DigitKnowledge {
    fn default() -> Self {
        DigitKnowledge {
            confirmed: None,
            min: 0,
            max: SLOTS as u8,
        }
    }
}

impl DigitKnowledge {
    fn confirm(&mut self, count: u8) {
        *self = DigitKnowledge {
            confirmed: Some(count),
            min: count,
            max: count,
        };
    }
}

/// Everything deduced about the target's digits from a game history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct KnowledgeState {
    pub digits: [DigitKnowledge; DIGITS],
    /// Digits known to occur at least once.
    pub confirmed: Vec<u8>,
    /// Digits known not to occur.
    pub eliminated: Vec<u8>,
    /// Digits whose count is still open.
    pub undetermined: Vec<u8>,
    /// How many slots hold a digit whose count is confirmed.
    pub confirmed_slots: u8,
    /// True when the multiset of target digits is known, though not their
    /// arrangement.
    pub composition_known: bool,
}

impl Default for KnowledgeState {
    fn default() -> Self {
        Self::from_history(&[])
    }
}

impl KnowledgeState {
    /// Rebuilds the knowledge from scratch.
    ///
    /// The result depends only on which monochromatic guesses were scored and
    /// how, not on the order of the rounds, so calling this repeatedly on the
    /// same history always gives the same state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use mastermind_rs::{KnowledgeState, Round};
    /// let history = [
    ///     Round::scored("1111".parse()?, 2),
    ///     Round::scored("5555".parse()?, 2),
    /// ];
    /// let knowledge = KnowledgeState::from_history(&history);
    ///
    /// assert!(knowledge.composition_known);
    /// assert_eq!(knowledge.confirmed, vec![1, 5]);
    /// assert_eq!(knowledge.eliminated.len(), 8);
    /// #
    /// # Ok::<_, mastermind_rs::CodeError>(())
    /// ```
    pub fn from_history(history: &[Round]) -> Self {
        let mut digits = [DigitKnowledge::default(); DIGITS];

        for round in history {
            if let (Some(d), Some(feedback)) = (round.guess.monochromatic(), round.feedback) {
                digits[d as usize].confirm(feedback);
            }
        }

        let known_sum: u8 = digits.iter().filter_map(|k| k.confirmed).sum();
        let remaining = (SLOTS as u8).saturating_sub(known_sum);

        for k in digits.iter_mut().filter(|k| k.confirmed.is_none()) {
            if remaining == 0 {
                k.confirm(0);
            } else {
                k.max = k.max.min(remaining);
            }
        }

        let mut confirmed = Vec::new();
        let mut eliminated = Vec::new();
        let mut undetermined = Vec::new();
        for (d, k) in digits.iter().enumerate() {
            match k.confirmed {
                Some(0) => eliminated.push(d as u8),
                Some(_) => confirmed.push(d as u8),
                None => undetermined.push(d as u8),
            }
        }

        let composition_known = undetermined.is_empty() && remaining == 0;

        KnowledgeState {
            digits,
            confirmed,
            eliminated,
            undetermined,
            confirmed_slots: known_sum.min(SLOTS as u8),
            composition_known,
        }
    }

    /// The number of target slots whose digit is not accounted for yet.
    pub fn remaining_slots(&self) -> u8 {
        SLOTS as u8 - self.confirmed_slots
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::code::{compute_feedback, Code};

    fn mono(d: u8, feedback: u8) -> Round {
        Round::scored(Code::new([d; 4]).unwrap(), feedback)
    }

    #[test]
    fn empty_history_knows_nothing() {
        let k = KnowledgeState::from_history(&[]);
        assert_eq!(k.undetermined, (0..10).collect::<Vec<_>>());
        assert!(k.confirmed.is_empty());
        assert!(k.eliminated.is_empty());
        assert_eq!(k.confirmed_slots, 0);
        assert!(!k.composition_known);
        assert!(k.digits.iter().all(|d| d.min == 0 && d.max == 4));
    }

    #[test]
    fn partial_knowledge_caps_the_rest() {
        let k = KnowledgeState::from_history(&[mono(3, 3), mono(4, 0)]);
        assert_eq!(k.digits[3].confirmed, Some(3));
        assert_eq!(k.digits[4].confirmed, Some(0));
        assert_eq!(k.confirmed, vec![3]);
        assert_eq!(k.eliminated, vec![4]);
        assert_eq!(k.confirmed_slots, 3);
        assert_eq!(k.remaining_slots(), 1);
        assert_eq!(k.digits[7].max, 1);
        assert_eq!(k.digits[7].confirmed, None);
        assert!(!k.composition_known);
    }

    #[test]
    fn mixed_guesses_are_ignored() {
        let target: Code = "1234".parse().unwrap();
        let guess: Code = "1123".parse().unwrap();
        let k = KnowledgeState::from_history(&[Round::scored(
            guess,
            compute_feedback(&guess, &target),
        )]);
        assert_eq!(k, KnowledgeState::default());
    }

    #[test]
    fn unscored_rounds_are_ignored() {
        let k = KnowledgeState::from_history(&[Round::pending(Code::new([2; 4]).unwrap())]);
        assert_eq!(k, KnowledgeState::default());
    }

    #[test]
    fn full_sum_eliminates_everything_else() {
        let k = KnowledgeState::from_history(&[mono(0, 1), mono(9, 3)]);
        assert!(k.composition_known);
        assert_eq!(k.confirmed, vec![0, 9]);
        assert_eq!(k.eliminated, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(k.undetermined.is_empty());
        assert_eq!(k.confirmed_slots, 4);
        assert_eq!(
            k.digits.iter().filter_map(|d| d.confirmed).sum::<u8>(),
            4
        );
    }

    proptest! {
        #[test]
        fn monochromatic_sums_to_four_compose(target in 0..10_000_usize, order in any::<u64>()) {
            let target = Code::from_index(target).unwrap();
            let mut history: Vec<Round> = target
                .counts()
                .iter()
                .enumerate()
                .filter(|(_, n)| **n > 0)
                .map(|(d, &n)| mono(d as u8, n))
                .collect();

            let first = KnowledgeState::from_history(&history);
            prop_assert!(first.composition_known);
            prop_assert_eq!(first.confirmed_slots, 4);
            prop_assert!(first.undetermined.is_empty());
            prop_assert_eq!(first.confirmed.len() + first.eliminated.len(), 10);

            let len = history.len();
            history.rotate_left(order as usize % len);
            prop_assert_eq!(&KnowledgeState::from_history(&history), &first);
            prop_assert_eq!(&KnowledgeState::from_history(&history), &KnowledgeState::from_history(&history));
        }
    }
}
