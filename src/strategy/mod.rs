//! Strategies for choosing the next guess.
//!
//! Every strategy maps the same inputs (the remaining candidates, the full
//! code space, the round number and the history so far) to a guess. The set
//! of strategies is closed, so they are variants of [`Strategy`] rather than
//! implementors of a trait.

use std::{fmt::Display, str::FromStr};

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    candidates::Partition,
    code::{generate_all_codes, Code},
    knowledge::KnowledgeState,
    HarnessError,
};

mod entropy;
mod hybrid;
mod minimax;
mod probe;
mod search;

pub use probe::PROBES;
pub use search::SearchSpace;

use search::Searcher;

/// One guess in a game and what came of it.
///
/// A history is the ordered list of rounds played so far. Rounds are only
/// ever appended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Round {
    pub guess: Code,
    /// The feedback, or `None` while the guess is still waiting to be scored.
    pub feedback: Option<u8>,
    pub analysis: Option<StrategyAnalysis>,
    pub exact_match: bool,
}

impl Round {
    /// A guess that has not been scored yet.
    pub fn pending(guess: Code) -> Self {
        Round {
            guess,
            feedback: None,
            analysis: None,
            exact_match: false,
        }
    }

    /// A guess that missed and received `feedback`.
    pub fn scored(guess: Code, feedback: u8) -> Self {
        Round {
            feedback: Some(feedback),
            ..Self::pending(guess)
        }
    }

    /// Attaches the analysis that produced this round's guess.
    pub fn with_analysis(self, analysis: impl Into<Option<StrategyAnalysis>>) -> Self {
        Round {
            analysis: analysis.into(),
            ..self
        }
    }
}

/// Which kind of decision produced a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum Phase {
    /// Only one candidate is left.
    Certain,
    /// Two candidates are left and the first is guessed.
    CoinFlip,
    /// No candidates are left; the feedback so far contradicts itself.
    Contradiction,
    /// A fixed opening probe.
    Probe,
    /// Maximum-entropy search.
    Entropy,
    /// Minimax search.
    Minimax,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Certain => "certain",
            Phase::CoinFlip => "coin flip",
            Phase::Contradiction => "contradiction",
            Phase::Probe => "probe",
            Phase::Entropy => "entropy",
            Phase::Minimax => "minimax",
        };
        write!(f, "{}", name)
    }
}

/// Supporting data for a chosen guess.
///
/// Only `rationale` is free text, and nothing depends on its wording.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct StrategyAnalysis {
    pub phase: Phase,
    pub search: SearchSpace,
    /// The number of candidates before the guess.
    pub pool_size: usize,
    /// The number of guesses scored to pick this one.
    pub evaluated: usize,
    /// The most candidates any feedback could leave.
    pub worst_case: usize,
    /// The fewest candidates any possible feedback could leave.
    pub best_case: usize,
    /// Feedback value to candidate count.
    pub partition: Partition,
    /// Entropy of `partition`, in bits.
    pub entropy: f64,
    /// Whether the guess could itself be the target.
    pub is_candidate: bool,
    pub knowledge: KnowledgeState,
    pub rationale: String,
}

/// A guess together with the analysis behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub guess: Code,
    pub analysis: StrategyAnalysis,
}

/// The result of running a strategy's selection logic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selection {
    pub(crate) guess: Code,
    pub(crate) phase: Phase,
    pub(crate) search: SearchSpace,
    pub(crate) evaluated: usize,
}

impl Selection {
    pub(crate) fn fixed(guess: Code, phase: Phase) -> Self {
        Selection {
            guess,
            phase,
            search: SearchSpace::None,
            evaluated: 0,
        }
    }
}

/// A guess-selection policy.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::{generate_all_codes, Strategy};
/// let all = generate_all_codes();
/// let choice = Strategy::Hybrid.choose(all, all, 0, &[]);
///
/// assert_eq!(choice.guess.to_string(), "0123");
/// assert_eq!(choice.analysis.pool_size, 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum Strategy {
    /// Fixed digit-covering probes, then a sampled minimax over candidates.
    Probe,
    /// Maximum expected information per guess.
    Entropy,
    /// Smallest worst-case remainder per guess.
    Minimax,
    /// Probes, then entropy, then minimax as the pool shrinks.
    Hybrid,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Probe,
        Strategy::Entropy,
        Strategy::Minimax,
        Strategy::Hybrid,
    ];

    /// Provides a version for this strategy.
    ///
    /// This changes whenever the strategy's logic does, so benchmark reports
    /// from different versions are not mistaken for each other.
    pub fn version(&self) -> &'static str {
        match self {
            Strategy::Probe => "0.2.0",
            Strategy::Entropy => "0.3.0",
            Strategy::Minimax => "0.3.0",
            Strategy::Hybrid => "0.4.1",
        }
    }

    /// Picks the next guess without building an analysis.
    pub fn next_guess(
        &self,
        candidates: &[Code],
        full_space: &[Code],
        round: usize,
        _history: &[Round],
    ) -> Code {
        self.select(candidates, full_space, round).guess
    }

    /// Picks the next guess and explains it.
    pub fn choose(
        &self,
        candidates: &[Code],
        full_space: &[Code],
        round: usize,
        history: &[Round],
    ) -> Choice {
        let selection = self.select(candidates, full_space, round);
        let partition = Partition::new(&selection.guess, candidates);
        let knowledge = KnowledgeState::from_history(history);

        let analysis = StrategyAnalysis {
            phase: selection.phase,
            search: selection.search,
            pool_size: candidates.len(),
            evaluated: selection.evaluated,
            worst_case: partition.worst_case(),
            best_case: partition.best_case(),
            entropy: partition.entropy(),
            is_candidate: candidates.contains(&selection.guess),
            rationale: rationale(&selection, &partition, candidates.len(), &knowledge),
            partition,
            knowledge,
        };

        Choice {
            guess: selection.guess,
            analysis,
        }
    }

    pub(crate) fn select(&self, candidates: &[Code], full_space: &[Code], round: usize) -> Selection {
        let selection = match candidates {
            [] => Selection::fixed(
                full_space
                    .first()
                    .copied()
                    .unwrap_or_else(|| generate_all_codes()[0]),
                Phase::Contradiction,
            ),
            [only] => Selection::fixed(*only, Phase::Certain),
            [first, _] => Selection::fixed(*first, Phase::CoinFlip),
            _ => {
                let searcher = Searcher::new(candidates);
                match self {
                    Strategy::Probe => probe::select(&searcher, round),
                    Strategy::Entropy => entropy::select(&searcher, full_space),
                    Strategy::Minimax => minimax::select(&searcher, full_space),
                    Strategy::Hybrid => hybrid::select(&searcher, full_space, round),
                }
            }
        };

        trace!(
            "{} chose {} ({}, {} scored) from {} candidates in round {}",
            self,
            selection.guess,
            selection.phase,
            selection.evaluated,
            candidates.len(),
            round
        );

        selection
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Probe => "Probe",
            Strategy::Entropy => "Entropy",
            Strategy::Minimax => "Minimax",
            Strategy::Hybrid => "Hybrid",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Strategy {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .find(|strat| strat.to_string().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| HarnessError::UnknownStrategy(s.to_string()))
    }
}

/// Picks the next guess for interactive play, with the hybrid strategy.
pub fn get_next_guess(
    candidates: &[Code],
    full_space: &[Code],
    round: usize,
    history: &[Round],
) -> Choice {
    Strategy::Hybrid.choose(candidates, full_space, round, history)
}

fn rationale(
    selection: &Selection,
    partition: &Partition,
    pool_size: usize,
    knowledge: &KnowledgeState,
) -> String {
    let mut text = match selection.phase {
        Phase::Certain => format!("{} is the only code left", selection.guess),
        Phase::CoinFlip => format!(
            "two codes left; guessing {} costs at most one extra round",
            selection.guess
        ),
        Phase::Contradiction => {
            "no code fits every answer so far; check the feedback given".to_string()
        }
        Phase::Probe => format!(
            "opening probe {} covers new digits while {} codes remain",
            selection.guess, pool_size
        ),
        Phase::Entropy => format!(
            "{} gives {:.2} bits on average over {} codes ({} guesses scored)",
            selection.guess,
            partition.entropy(),
            pool_size,
            selection.evaluated
        ),
        Phase::Minimax => format!(
            "{} leaves at most {} of {} codes ({} guesses scored)",
            selection.guess,
            partition.worst_case(),
            pool_size,
            selection.evaluated
        ),
    };

    if knowledge.composition_known {
        text.push_str("; the digits are known, only their order is open");
    }

    text
}
