//! Playing games, either automatically against a known target or
//! interactively with feedback supplied from outside.

use log::{trace, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    candidates::{exclude_guess, filter_candidates},
    code::{compute_feedback, generate_all_codes, is_exact_match, Code, SLOTS},
    knowledge::KnowledgeState,
    strategy::{Choice, Round, Strategy},
    CodeError, Result,
};

/// The most guesses a simulated game may take.
pub const STEP_CAP: usize = 20;

/// How a simulated game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum Outcome {
    /// The last guess was the target.
    Solved,
    /// The game hit [`STEP_CAP`] without finding the target.
    Capped,
    /// The candidate set ran dry, which means the feedback contradicted
    /// itself.
    Contradiction,
}

/// One simulated game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct GameResult {
    pub target: Code,
    /// The number of guesses made.
    pub steps: usize,
    pub guesses: Vec<Code>,
    pub outcome: Outcome,
}

impl GameResult {
    /// Returns true if the strategy found the target.
    pub fn solved(&self) -> bool {
        self.outcome == Outcome::Solved
    }
}

/// Plays `strategy` against `target` until it guesses the target exactly.
///
/// Every miss narrows the candidates by the feedback it received and drops
/// the missed guess. The game stops early after [`STEP_CAP`] guesses, or if
/// no candidates are left.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::{simulate, Strategy};
/// let result = simulate(Strategy::Hybrid, &"0123".parse()?);
///
/// assert!(result.solved());
/// assert_eq!(result.steps, 1);
/// #
/// # Ok::<_, mastermind_rs::CodeError>(())
/// ```
pub fn simulate(strategy: Strategy, target: &Code) -> GameResult {
    let all = generate_all_codes();
    let mut candidates = all.to_vec();
    let mut history = Vec::new();
    let mut guesses = Vec::new();

    for round in 0..STEP_CAP {
        let guess = strategy.next_guess(&candidates, all, round, &history);
        guesses.push(guess);

        if is_exact_match(&guess, target) {
            trace!("{} found {} in {} steps", strategy, target, round + 1);
            return GameResult {
                target: *target,
                steps: round + 1,
                guesses,
                outcome: Outcome::Solved,
            };
        }

        let feedback = compute_feedback(&guess, target);
        candidates = exclude_guess(filter_candidates(&candidates, &guess, feedback), &guess);
        history.push(Round::scored(guess, feedback));

        if candidates.is_empty() {
            warn!(
                "{} ran out of candidates against {} after {} steps",
                strategy,
                target,
                round + 1
            );
            return GameResult {
                target: *target,
                steps: round + 1,
                guesses,
                outcome: Outcome::Contradiction,
            };
        }
    }

    warn!(
        "{} hit the step cap against {} with {} candidates left",
        strategy,
        target,
        candidates.len()
    );
    GameResult {
        target: *target,
        steps: STEP_CAP,
        guesses,
        outcome: Outcome::Capped,
    }
}

/// An interactive game where feedback comes from outside, such as a human
/// holding the secret code.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::{compute_feedback, Code, Game};
/// let secret: Code = "5512".parse()?;
/// let mut game = Game::new();
///
/// while !game.is_solved() {
///     let guess = game.next_guess()?.guess;
///     let exact = guess == secret;
///     game.record_feedback(compute_feedback(&guess, &secret), exact)?;
/// }
///
/// assert_eq!(game.history().last().unwrap().guess, secret);
/// #
/// # Ok::<_, mastermind_rs::MastermindError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    strategy: Strategy,
    candidates: Vec<Code>,
    history: Vec<Round>,
    pending: Option<Choice>,
    solved: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::with_strategy(Strategy::Hybrid)
    }
}

impl Game {
    /// Creates a new game played by the hybrid strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new game played by `strategy`.
    pub fn with_strategy(strategy: Strategy) -> Self {
        Game {
            strategy,
            candidates: generate_all_codes().to_vec(),
            history: Vec::new(),
            pending: None,
            solved: false,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The codes that are still consistent with every answer.
    pub fn candidates(&self) -> &[Code] {
        &self.candidates
    }

    /// Every scored round, oldest first.
    pub fn history(&self) -> &[Round] {
        &self.history
    }

    /// The guess waiting for feedback, if any.
    pub fn pending(&self) -> Option<&Choice> {
        self.pending.as_ref()
    }

    /// The number of rounds scored so far.
    pub fn round(&self) -> usize {
        self.history.len()
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// What is known about the secret's digits.
    pub fn knowledge(&self) -> KnowledgeState {
        KnowledgeState::from_history(&self.history)
    }

    /// Asks the strategy for the next guess.
    ///
    /// Returns an error if the previous guess still needs feedback.
    pub fn next_guess(&mut self) -> Result<&Choice> {
        if self.pending.is_some() {
            return Err(CodeError::RoundPending.into());
        }

        let choice = self.strategy.choose(
            &self.candidates,
            generate_all_codes(),
            self.round(),
            &self.history,
        );
        Ok(self.pending.insert(choice))
    }

    /// Scores the pending guess.
    ///
    /// `feedback` must be in `0..=4`, and an exact match must come with a
    /// feedback of four. If the feedback leaves no candidates, it is
    /// rejected and the guess stays pending so it can be corrected.
    pub fn record_feedback(&mut self, feedback: u8, exact_match: bool) -> Result<&Round> {
        if feedback as usize > SLOTS || (exact_match && feedback as usize != SLOTS) {
            return Err(CodeError::FeedbackOutOfRange(feedback).into());
        }

        let choice = self.pending.take().ok_or(CodeError::RoundNotPending)?;
        let guess = choice.guess;

        if exact_match {
            self.candidates = vec![guess];
            self.solved = true;
        } else {
            let narrowed = exclude_guess(filter_candidates(&self.candidates, &guess, feedback), &guess);
            if narrowed.is_empty() {
                self.pending = Some(choice);
                return Err(CodeError::Contradiction.into());
            }
            self.candidates = narrowed;
        }

        self.history.push(Round {
            guess,
            feedback: Some(feedback),
            analysis: Some(choice.analysis),
            exact_match,
        });

        Ok(&self.history[self.history.len() - 1])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{strategy::PROBES, MastermindError};

    fn code(s: &str) -> Code {
        s.parse().unwrap()
    }

    #[test]
    fn every_strategy_solves_a_few_targets() {
        for strategy in Strategy::ALL {
            for target in ["0000", "9876", "1312", "4455", "0909"] {
                let target = code(target);
                let result = simulate(strategy, &target);
                assert!(result.steps <= STEP_CAP);
                assert_eq!(result.guesses.len(), result.steps);
                assert_ne!(result.outcome, Outcome::Contradiction);
                if result.solved() {
                    assert_eq!(result.guesses.last(), Some(&target));
                }
            }
        }
    }

    #[test]
    fn guesses_never_repeat() {
        for target in ["1234", "2211", "7777"] {
            let result = simulate(Strategy::Hybrid, &code(target));
            let mut seen = result.guesses.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), result.guesses.len());
        }
    }

    #[test]
    fn only_the_opening_probe_wins_immediately() {
        let opening = Code::new(PROBES[0]).unwrap();
        assert_eq!(simulate(Strategy::Hybrid, &opening).steps, 1);

        for target in ["3210", "5555", "0124"] {
            assert!(simulate(Strategy::Hybrid, &code(target)).steps > 1);
        }
    }

    #[test]
    fn session_rejects_bad_feedback() {
        let mut game = Game::new();
        assert!(matches!(
            game.record_feedback(1, false),
            Err(MastermindError::Code {
                kind: CodeError::RoundNotPending
            })
        ));

        let guess = game.next_guess().unwrap().guess;
        assert_eq!(guess, Code::new(PROBES[0]).unwrap());
        assert!(matches!(
            game.next_guess(),
            Err(MastermindError::Code {
                kind: CodeError::RoundPending
            })
        ));
        assert!(matches!(
            game.record_feedback(5, false),
            Err(MastermindError::Code {
                kind: CodeError::FeedbackOutOfRange(5)
            })
        ));
        assert!(game.record_feedback(3, true).is_err());
        assert!(game.pending().is_some());

        let round = game.record_feedback(0, false).unwrap();
        assert_eq!(round.feedback, Some(0));
        assert!(round.analysis.is_some());
        assert_eq!(game.candidates().len(), 6 * 6 * 6 * 6);
        assert_eq!(game.round(), 1);
    }

    #[test]
    fn session_detects_contradictions() {
        let mut game = Game::new();
        game.next_guess().unwrap();
        game.record_feedback(4, false).unwrap();
        // every other arrangement of 0, 1, 2 and 3
        assert_eq!(game.candidates().len(), 23);

        game.next_guess().unwrap();
        assert!(matches!(
            game.record_feedback(0, false),
            Err(MastermindError::Code {
                kind: CodeError::Contradiction
            })
        ));
        assert_eq!(game.candidates().len(), 23);
        assert!(game.pending().is_some());

        let round = game.record_feedback(4, false).unwrap();
        assert!(!round.exact_match);
        assert_eq!(game.candidates().len(), 22);
    }

    #[test]
    fn session_tracks_knowledge() {
        let mut game = Game::with_strategy(Strategy::Minimax);
        game.next_guess().unwrap();
        game.record_feedback(1, false).unwrap();
        assert_eq!(game.knowledge(), KnowledgeState::default());
        assert_eq!(game.strategy(), Strategy::Minimax);
    }
}
