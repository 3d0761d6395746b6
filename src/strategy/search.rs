//! Scoring sampled guesses by how they split the candidate set.

use crate::{
    candidates::Partition,
    code::{Code, DIGITS, SPACE},
};

/// Where a strategy looked for its guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(crate = "serde_crate")
)]
pub enum SearchSpace {
    /// No search happened.
    None,
    /// Only codes that could still be the target were scored.
    Candidates,
    /// Codes from the whole space were scored as well.
    FullSpace,
}

/// The best guess found by a search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scored {
    pub(crate) guess: Code,
    pub(crate) partition: Partition,
    pub(crate) evaluated: usize,
}

/// Every `stride`-th element of `pool`, with the stride picked so that about
/// `limit` elements are yielded.
pub(crate) fn strided(pool: &[Code], limit: usize) -> impl Iterator<Item = &Code> + Clone {
    let stride = (pool.len() / limit.max(1)).max(1);
    pool.iter().step_by(stride)
}

/// Precomputed candidate histograms and membership, shared by every guess
/// scored in one search.
pub(crate) struct Searcher<'a> {
    candidates: &'a [Code],
    counts: Vec<[u8; DIGITS]>,
    member: Vec<bool>,
}

impl<'a> Searcher<'a> {
    pub(crate) fn new(candidates: &'a [Code]) -> Self {
        let mut member = vec![false; SPACE];
        for c in candidates {
            member[c.index()] = true;
        }

        Searcher {
            candidates,
            counts: candidates.iter().map(Code::counts).collect(),
            member,
        }
    }

    pub(crate) fn candidates(&self) -> &'a [Code] {
        self.candidates
    }

    pub(crate) fn is_candidate(&self, code: &Code) -> bool {
        self.member[code.index()]
    }

    pub(crate) fn partition(&self, guess: &Code) -> Partition {
        Partition::from_counts(guess, &self.counts)
    }

    /// Picks the guess with the highest partition entropy. The first of
    /// several equal maxima wins.
    pub(crate) fn max_entropy<'p>(&self, pool: impl Iterator<Item = &'p Code>) -> Option<Scored> {
        let mut best: Option<(Scored, f64)> = None;
        let mut evaluated = 0;

        for guess in pool {
            evaluated += 1;
            let partition = self.partition(guess);
            let entropy = partition.entropy();

            if best.as_ref().map_or(true, |(_, e)| entropy > *e) {
                best = Some((
                    Scored {
                        guess: *guess,
                        partition,
                        evaluated: 0,
                    },
                    entropy,
                ));
            }
        }

        best.map(|(scored, _)| Scored {
            evaluated,
            ..scored
        })
    }

    /// Picks the guess whose largest partition is smallest. Among equal
    /// guesses, the first one that could be the target wins, and otherwise
    /// the first one seen.
    pub(crate) fn minimax<'p>(&self, pool: impl Iterator<Item = &'p Code>) -> Option<Scored> {
        let mut best: Option<(Scored, bool)> = None;
        let mut evaluated = 0;

        for guess in pool {
            evaluated += 1;
            let partition = self.partition(guess);
            let worst = partition.worst_case();
            let candidate = self.is_candidate(guess);

            let better = match &best {
                None => true,
                Some((b, b_candidate)) => {
                    let b_worst = b.partition.worst_case();
                    worst < b_worst || (worst == b_worst && candidate && !b_candidate)
                }
            };

            if better {
                best = Some((
                    Scored {
                        guess: *guess,
                        partition,
                        evaluated: 0,
                    },
                    candidate,
                ));
            }
        }

        best.map(|(scored, _)| Scored {
            evaluated,
            ..scored
        })
    }
}
