//! Maximum-entropy search.

use super::{
    search::{strided, SearchSpace, Searcher},
    Phase, Selection,
};
use crate::code::Code;

/// Above this many candidates, only candidates are scored.
pub(crate) const FULL_SPACE_POOL: usize = 1_000;

/// Guesses scored when sampling the candidates.
const CANDIDATE_LIMIT: usize = 250;

/// Guesses scored when sampling the full space.
const FULL_SPACE_LIMIT: usize = 500;

pub(crate) fn select(searcher: &Searcher, full_space: &[Code]) -> Selection {
    if searcher.candidates().len() > FULL_SPACE_POOL {
        over_candidates(searcher)
    } else {
        over_full_space(searcher, full_space)
    }
}

pub(crate) fn over_candidates(searcher: &Searcher) -> Selection {
    let candidates = searcher.candidates();
    finish(
        searcher,
        searcher.max_entropy(strided(candidates, CANDIDATE_LIMIT)),
        SearchSpace::Candidates,
    )
}

/// Scores a sample of the candidates first, then a sample of the full space.
///
/// Candidates go first so that when nothing splits the pool (every remaining
/// code is a rearrangement of the others) a candidate still wins the tie.
pub(crate) fn over_full_space(searcher: &Searcher, full_space: &[Code]) -> Selection {
    let candidates = searcher.candidates();
    let pool = strided(candidates, CANDIDATE_LIMIT).chain(strided(full_space, FULL_SPACE_LIMIT));
    finish(searcher, searcher.max_entropy(pool), SearchSpace::FullSpace)
}

fn finish(
    searcher: &Searcher,
    best: Option<super::search::Scored>,
    search: SearchSpace,
) -> Selection {
    match best {
        Some(best) => Selection {
            guess: best.guess,
            phase: Phase::Entropy,
            search,
            evaluated: best.evaluated,
        },
        None => Selection::fixed(searcher.candidates()[0], Phase::Certain),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        candidates::{filter_candidates, Partition},
        code::{compute_feedback, generate_all_codes},
    };

    fn pool_for(target: &str, guesses: &[&str]) -> Vec<Code> {
        let target: Code = target.parse().unwrap();
        let mut candidates = generate_all_codes().to_vec();
        for guess in guesses {
            let guess: Code = guess.parse().unwrap();
            candidates = filter_candidates(&candidates, &guess, compute_feedback(&guess, &target));
        }
        candidates
    }

    #[test]
    fn large_pools_sample_candidates() {
        let all = generate_all_codes();
        let searcher = Searcher::new(all);
        let selection = select(&searcher, all);
        assert_eq!(selection.search, SearchSpace::Candidates);
        assert_eq!(selection.evaluated, CANDIDATE_LIMIT);

        // nothing in the sample beats the chosen guess
        let best = Partition::new(&selection.guess, all).entropy();
        for guess in strided(all, CANDIDATE_LIMIT) {
            assert!(Partition::new(guess, all).entropy() <= best + 1e-12);
        }
        assert!(best > 1.5);
    }

    #[test]
    fn small_pools_sample_the_full_space() {
        let all = generate_all_codes();
        let candidates = pool_for("3390", &["0123", "4567"]);
        assert!(candidates.len() <= FULL_SPACE_POOL);

        let searcher = Searcher::new(&candidates);
        let selection = select(&searcher, all);
        assert_eq!(selection.search, SearchSpace::FullSpace);
        assert_eq!(selection.phase, Phase::Entropy);
        assert!(Partition::new(&selection.guess, &candidates).worst_case() < candidates.len());
    }

    #[test]
    fn rearrangements_pick_a_candidate() {
        let all = generate_all_codes();
        let candidates = pool_for("1234", &["1111", "2222", "3333", "4444"]);
        assert_eq!(candidates.len(), 24);

        let searcher = Searcher::new(&candidates);
        let selection = over_full_space(&searcher, all);
        assert_eq!(selection.guess, candidates[0]);
    }
}
