#![doc = include_str!("../README.md")]

// Required to rename serde
#[cfg(feature = "serde")]
extern crate serde_crate as serde;

use thiserror::Error;

pub mod code;
pub use code::{compute_feedback, generate_all_codes, is_exact_match, Code};

pub mod candidates;
pub use candidates::{exclude_guess, filter_candidates, Partition};

pub mod knowledge;
pub use knowledge::{DigitKnowledge, KnowledgeState};

pub mod strategy;
pub use strategy::{get_next_guess, Choice, Round, Strategy, StrategyAnalysis};

pub mod game;
pub use game::{simulate, Game, GameResult};

pub mod harness;
pub use harness::{
    generate_random_targets, run_benchmark, sweep_all, Benchmark, BenchmarkConfig,
    BenchmarkHandle, CancelHandle, Progress,
};

pub mod perf;
pub use perf::{Record, StrategyResult};

mod stats;

/// The errors that `mastermind_rs` can produce.
#[derive(Debug, Error)]
pub enum MastermindError {
    #[error("code encountered error")]
    Code {
        #[from]
        kind: CodeError,
    },

    #[error("general IO error")]
    Printing(#[from] std::io::Error),

    #[error("cannot compare a strategy with itself")]
    SelfComparison,

    #[error("the benchmark harness encountered an error")]
    Harness {
        #[from]
        kind: HarnessError,
    },

    #[error("statistics could not be computed for a sample")]
    Stats,
}

#[derive(Debug, Error)]
pub enum CodeError {
    /// The string provided is not four decimal digits.
    #[error("\"{0}\" is not a four digit code")]
    InvalidFormat(String),

    /// The index provided when constructing a code is not below 10,000.
    #[error("the index {0} does not correspond to a possible code")]
    InvalidIndex(usize),

    /// Feedback supplied from outside the crate is larger than four.
    #[error("feedback {0} is outside of the range 0..=4")]
    FeedbackOutOfRange(u8),

    /// The session was asked for a new guess before the last one was scored.
    #[error("the previous guess has not received feedback yet")]
    RoundPending,

    /// Feedback was supplied when no guess was waiting for it.
    #[error("there is no guess waiting for feedback")]
    RoundNotPending,

    /// The supplied feedback rules out every remaining code.
    #[error("the feedback given so far is contradictory")]
    Contradiction,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("no strategies have been added to the harness")]
    NoStrategiesAdded,

    #[error("cannot run a benchmark with zero games")]
    NoGames,

    #[error("cannot draw {0} distinct targets from 10000 codes")]
    TooManyGames(usize),

    #[error("there is no strategy named \"{0}\"")]
    UnknownStrategy(String),

    #[error("the benchmark was cancelled before it finished")]
    Cancelled,

    #[error("could not read or write report file")]
    ReportIo(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("trouble serializing or deserializing report")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T, E = MastermindError> = std::result::Result<T, E>;
