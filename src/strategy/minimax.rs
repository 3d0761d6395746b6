//! Minimax search.

use super::{
    entropy::FULL_SPACE_POOL,
    search::{strided, SearchSpace, Searcher},
    Phase, Selection,
};
use crate::code::Code;

/// Guesses scored when sampling the candidates.
const CANDIDATE_LIMIT: usize = 250;

/// Guesses scored when sampling the full space.
const FULL_SPACE_LIMIT: usize = 2_000;

pub(crate) fn select(searcher: &Searcher, full_space: &[Code]) -> Selection {
    if searcher.candidates().len() > FULL_SPACE_POOL {
        let candidates = searcher.candidates();
        finish(
            searcher,
            searcher.minimax(strided(candidates, CANDIDATE_LIMIT)),
            SearchSpace::Candidates,
        )
    } else {
        over_full_space(searcher, full_space)
    }
}

/// Scores a sample of the full space followed by every candidate, as long as
/// there are few enough of them.
pub(crate) fn over_full_space(searcher: &Searcher, full_space: &[Code]) -> Selection {
    let candidates = searcher.candidates();
    let pool = strided(full_space, FULL_SPACE_LIMIT).chain(strided(candidates, FULL_SPACE_POOL));
    finish(searcher, searcher.minimax(pool), SearchSpace::FullSpace)
}

fn finish(
    searcher: &Searcher,
    best: Option<super::search::Scored>,
    search: SearchSpace,
) -> Selection {
    match best {
        Some(best) => Selection {
            guess: best.guess,
            phase: Phase::Minimax,
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

    #[test]
    fn worst_case_is_minimal_over_the_candidates() {
        let all = generate_all_codes();
        let target: Code = "8061".parse().unwrap();
        let mut candidates = all.to_vec();
        for guess in ["0123", "4567", "8901"] {
            let guess: Code = guess.parse().unwrap();
            candidates = filter_candidates(&candidates, &guess, compute_feedback(&guess, &target));
        }
        assert!(candidates.len() > 2);

        let searcher = Searcher::new(&candidates);
        let selection = select(&searcher, all);
        assert_eq!(selection.search, SearchSpace::FullSpace);

        let chosen = Partition::new(&selection.guess, &candidates).worst_case();
        for c in &candidates {
            assert!(Partition::new(c, &candidates).worst_case() >= chosen);
        }
    }

    #[test]
    fn large_pools_stay_within_candidates() {
        let all = generate_all_codes();
        let searcher = Searcher::new(all);
        let selection = select(&searcher, all);
        assert_eq!(selection.search, SearchSpace::Candidates);
        assert_eq!(selection.evaluated, CANDIDATE_LIMIT);
    }
}
