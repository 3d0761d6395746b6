//! Descriptive statistics over step counts, and significance tests between
//! strategies.

use itertools::{Itertools, MinMaxResult};
#[cfg(feature = "stats")]
use num_traits::Float;
#[cfg(feature = "stats")]
use statrs::distribution::{ContinuousCDF, StudentsT};

#[cfg(feature = "stats")]
use crate::{MastermindError, Result};

/// Summary statistics of a list of step counts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Description {
    pub(crate) mean: f64,
    /// Population standard deviation.
    pub(crate) std_dev: f64,
    pub(crate) min: usize,
    pub(crate) max: usize,
    /// The middle value, or the mean of the two middle values.
    pub(crate) median: f64,
}

impl Description {
    /// Describes `steps`. An empty list describes as all zeroes.
    pub(crate) fn new(steps: &[usize]) -> Self {
        if steps.is_empty() {
            return Self::default();
        }

        let len = steps.len() as f64;
        let mean = steps.iter().sum::<usize>() as f64 / len;
        let var = steps
            .iter()
            .map(|&n| (n as f64 - mean).powi(2))
            .sum::<f64>()
            / len;

        let (min, max) = match steps.iter().copied().minmax() {
            MinMaxResult::NoElements => (0, 0),
            MinMaxResult::OneElement(n) => (n, n),
            MinMaxResult::MinMax(min, max) => (min, max),
        };

        let sorted = steps.iter().copied().sorted_unstable().collect_vec();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.
        } else {
            sorted[mid] as f64
        };

        Description {
            mean,
            std_dev: var.sqrt(),
            min,
            max,
            median,
        }
    }
}

/// Mean, length and unbiased variance of a sample.
#[cfg(feature = "stats")]
struct Sample<N: Float> {
    mean: N,
    len: N,
    var: N,
}

#[cfg(feature = "stats")]
impl<N: Float + std::iter::Sum> Sample<N> {
    fn new(sample: &[N]) -> Option<Self> {
        if sample.len() < 2 {
            return None;
        }

        let len = N::from(sample.len())?;
        let mean = sample.iter().copied().sum::<N>() / len;
        let var = sample.iter().map(|&n| (n - mean).powi(2)).sum::<N>() / (len - N::one());

        Some(Sample { mean, len, var })
    }
}

/// Welch's two-sample, two-tailed t-test.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub(crate) struct WelchsT<N: Float> {
    /// The probability of a difference at least this large if both samples
    /// came from distributions with the same mean.
    pub(crate) p: N,

    /// The maximum allowed p-value.
    pub(crate) alpha: N,
}

#[cfg(feature = "stats")]
impl<N: Float + std::iter::Sum + Into<f64>> WelchsT<N> {
    /// Runs the test on two samples.
    ///
    /// Fails if either sample has fewer than two values, or if both have no
    /// variance at all.
    ///
    /// # Panics
    ///
    /// `alpha` must be in (0, 1).
    pub(crate) fn two_sample(a: &[N], b: &[N], alpha: N) -> Result<Self> {
        assert!(alpha > N::zero() && alpha < N::one());

        let a = Sample::new(a).ok_or(MastermindError::Stats)?;
        let b = Sample::new(b).ok_or(MastermindError::Stats)?;

        let se2 = (a.var / a.len) + (b.var / b.len);
        if se2.into() < f64::EPSILON {
            return Err(MastermindError::Stats);
        }

        let t = (a.mean - b.mean).abs() / se2.sqrt();

        // Welch-Satterthwaite degrees of freedom
        let deg = se2.powi(2)
            / ((a.var / a.len).powi(2) / (a.len - N::one())
                + (b.var / b.len).powi(2) / (b.len - N::one()));

        let dist = StudentsT::new(0.0, 1.0, deg.into()).map_err(|_| MastermindError::Stats)?;
        let p = N::from(dist.cdf((-t).into()) * 2.).ok_or(MastermindError::Stats)?;

        Ok(Self { p, alpha })
    }

    pub(crate) fn is_significant(&self) -> bool {
        self.p < self.alpha
    }
}
