//! Fixed opening probes.

use super::{
    search::{strided, SearchSpace, Searcher},
    Phase, Selection,
};
use crate::code::Code;

/// Opening guesses, in order. Each covers four digits, and later ones
/// overlap earlier ones so counts can be cross-checked.
pub const PROBES: [[u8; 4]; 4] = [[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 0, 1], [2, 3, 6, 7]];

/// Probing continues while more candidates than this remain.
const POOL_THRESHOLD: usize = 500;

/// Candidates scored by the minimax fallback.
const FALLBACK_LIMIT: usize = 300;

/// The probe for `round`, if there is one.
pub(crate) fn probe(round: usize) -> Option<Code> {
    PROBES
        .get(round)
        .and_then(|digits| Code::new(*digits).ok())
}

pub(crate) fn select(searcher: &Searcher, round: usize) -> Selection {
    if searcher.candidates().len() > POOL_THRESHOLD {
        if let Some(guess) = probe(round) {
            return Selection::fixed(guess, Phase::Probe);
        }
    }

    fallback(searcher)
}

/// A sampled minimax over the candidates only.
pub(crate) fn fallback(searcher: &Searcher) -> Selection {
    let candidates = searcher.candidates();
    match searcher.minimax(strided(candidates, FALLBACK_LIMIT)) {
        Some(best) => Selection {
            guess: best.guess,
            phase: Phase::Minimax,
            search: SearchSpace::Candidates,
            evaluated: best.evaluated,
        },
        None => Selection::fixed(candidates[0], Phase::Certain),
    }
}
