//! The three-phase strategy used for interactive play.
//!
//! Fixed probes open the game, entropy search narrows the middle game, and
//! minimax over the full space finishes once the pool is small. The
//! thresholds below were chosen by experiment, not derived.

use super::{entropy, minimax, probe, search::Searcher, Phase, Selection};
use crate::code::Code;

/// Opening probes are used for this many rounds at most.
pub(crate) const PROBE_ROUNDS: usize = 3;

/// Opening probes are used only while more candidates than this remain.
pub(crate) const PROBE_POOL: usize = 5_000;

/// Minimax takes over at or below this many candidates.
pub(crate) const MINIMAX_POOL: usize = 200;

pub(crate) fn select(searcher: &Searcher, full_space: &[Code], round: usize) -> Selection {
    let pool = searcher.candidates().len();

    if round < PROBE_ROUNDS && pool > PROBE_POOL {
        if let Some(guess) = probe::probe(round) {
            return Selection::fixed(guess, Phase::Probe);
        }
    }

    if pool <= MINIMAX_POOL {
        minimax::over_full_space(searcher, full_space)
    } else if pool <= entropy::FULL_SPACE_POOL {
        entropy::over_full_space(searcher, full_space)
    } else {
        entropy::over_candidates(searcher)
    }
}
