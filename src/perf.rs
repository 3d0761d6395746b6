//! Evaluating and comparing strategies.

use std::{collections::BTreeMap, fmt::Display, io::Write, ops::Deref, time::Duration};

#[cfg(feature = "fancy")]
use comfy_table::{Cell, Color, Table};
#[cfg(feature = "fancy")]
use owo_colors::{AnsiColors, OwoColorize, Stream};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    game::GameResult,
    stats::Description,
    strategy::Strategy,
    MastermindError,
};

/// Games kept as samples regardless of how they went.
pub const SAMPLE_HEAD: usize = 10;

/// Games kept as samples in total.
pub const SAMPLE_CAP: usize = 30;

/// Games taking at least this many steps are kept as samples.
pub const LONG_GAME: usize = 10;

/// Games taking at most this many steps are kept as samples.
pub const SHORT_GAME: usize = 2;

/// Running totals for the strategy currently being benchmarked.
///
/// Owned by the harness and replaced for each strategy.
#[derive(Debug, Clone, Default)]
pub(crate) struct Accumulator {
    steps: Vec<usize>,
    histogram: Histogram,
    samples: Vec<GameResult>,
    num_solved: u32,
}

impl Accumulator {
    pub(crate) fn push(&mut self, game: GameResult) {
        self.steps.push(game.steps);
        *self.histogram.bins.entry(game.steps).or_insert(0) += 1;
        if game.solved() {
            self.num_solved += 1;
        }

        let index = self.steps.len() - 1;
        let notable = index < SAMPLE_HEAD || game.steps >= LONG_GAME || game.steps <= SHORT_GAME;
        if notable && self.samples.len() < SAMPLE_CAP {
            self.samples.push(game);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn finish(self, strategy: Strategy, elapsed: Duration) -> StrategyResult {
        let description = Description::new(&self.steps);

        StrategyResult {
            strategy,
            strategy_name: format!("{} v{}", strategy, strategy.version()),
            num_tried: self.steps.len() as u32,
            num_solved: self.num_solved,
            mean: description.mean,
            std_dev: description.std_dev,
            min: description.min,
            max: description.max,
            median: description.median,
            histogram: self.histogram,
            samples: self.samples,
            elapsed,
        }
    }
}

/// A summary of one strategy's performance generated by the
/// [benchmark harness](crate::harness).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct StrategyResult {
    strategy: Strategy,
    strategy_name: String,
    num_tried: u32,
    num_solved: u32,
    mean: f64,
    std_dev: f64,
    min: usize,
    max: usize,
    median: f64,
    histogram: Histogram,
    samples: Vec<GameResult>,
    elapsed: Duration,
}

impl StrategyResult {
    /// Builds a result from a list of finished games.
    pub fn from_games(
        strategy: Strategy,
        games: impl IntoIterator<Item = GameResult>,
        elapsed: Duration,
    ) -> Self {
        let mut acc = Accumulator::default();
        games.into_iter().for_each(|game| acc.push(game));
        acc.finish(strategy, elapsed)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Gets the name and version of the strategy.
    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    /// Gets the number of games played.
    pub fn num_tried(&self) -> u32 {
        self.num_tried
    }

    /// Gets the number of games that ended with the target guessed.
    ///
    /// This is always less than or equal to [`num_tried()`](Self::num_tried()).
    pub fn num_solved(&self) -> u32 {
        self.num_solved
    }

    /// Gets the number of games that hit the step cap or ran dry.
    pub fn num_missed(&self) -> u32 {
        self.num_tried - self.num_solved
    }

    /// Gets the fraction of games solved.
    pub fn frac_solved(&self) -> f32 {
        (self.num_solved as f32) / (self.num_tried as f32)
    }

    /// The mean number of steps per game.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The population standard deviation of the steps per game.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    /// Step count to number of games.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// The first few games plus unusually short or long ones.
    pub fn samples(&self) -> &[GameResult] {
        &self.samples
    }

    /// Wall time spent playing this strategy's games.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Rebuilds the list of step counts from the histogram.
    pub(crate) fn steps(&self) -> Vec<f64> {
        self.histogram
            .iter()
            .flat_map(|(&steps, &count)| std::iter::repeat(steps as f64).take(count))
            .collect()
    }

    /// Prints this result, optionally compared against a baseline.
    pub fn print(&self, options: PrintOptions) -> Result<(), MastermindError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", self)?;

        if let Some(baseline) = options.compare {
            self.print_comparison(&mut stdout, baseline)?;
        }

        if options.histogram {
            write!(stdout, "{}", self.histogram)?;
        }

        Ok(())
    }

    #[cfg(feature = "stats")]
    fn print_comparison(
        &self,
        out: &mut impl Write,
        baseline: &StrategyResult,
    ) -> Result<(), MastermindError> {
        use crate::stats::WelchsT;

        if self == baseline {
            return Err(MastermindError::SelfComparison);
        }

        let diff = self.mean - baseline.mean;
        let test = WelchsT::two_sample(&self.steps(), &baseline.steps(), 0.05);

        match test {
            Ok(test) if test.is_significant() => {
                let diff_text = format!("{:+.2}", diff);
                #[cfg(feature = "fancy")]
                let diff_text = diff_text
                    .if_supports_color(Stream::Stdout, |text| {
                        if diff.is_sign_negative() {
                            text.color(AnsiColors::Green)
                        } else {
                            text.color(AnsiColors::Red)
                        }
                    })
                    .to_string();
                writeln!(
                    out,
                    "Mean differs from {} by {} steps (p = {:.3}), {}",
                    baseline.strategy_name, diff_text, test.p, "a sig. diff."
                )?;
            }
            Ok(test) => writeln!(
                out,
                "Mean differs from {} by {:+.2} steps (p = {:.3}), not a sig. diff.",
                baseline.strategy_name, diff, test.p
            )?,
            Err(_) => writeln!(
                out,
                "Mean differs from {} by {:+.2} steps, too few games to test",
                baseline.strategy_name, diff
            )?,
        }

        Ok(())
    }

    #[cfg(not(feature = "stats"))]
    fn print_comparison(
        &self,
        out: &mut impl Write,
        baseline: &StrategyResult,
    ) -> Result<(), MastermindError> {
        if self == baseline {
            return Err(MastermindError::SelfComparison);
        }

        writeln!(
            out,
            "Mean differs from {} by {:+.2} steps",
            baseline.strategy_name,
            self.mean - baseline.mean
        )?;
        Ok(())
    }

    pub fn print_options<'a>() -> PrintOptions<'a> {
        PrintOptions::default()
    }
}

impl Display for StrategyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:-^80}", self.strategy_name)?;
        writeln!(
            f,
            "Ran {} games in {:.2?}, solved {} ({:.1}%)",
            self.num_tried,
            self.elapsed,
            self.num_solved,
            self.frac_solved() * 100.
        )?;
        writeln!(
            f,
            "Steps: mean {:.2} (sd {:.2}), median {:.1}, min {}, max {}",
            self.mean, self.std_dev, self.median, self.min, self.max
        )?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOptions<'a> {
    compare: Option<&'a StrategyResult>,
    histogram: bool,
}

impl<'a> PrintOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compare(self, baseline: &'a StrategyResult) -> Self {
        Self {
            compare: Some(baseline),
            ..self
        }
    }

    pub fn histogram(self, histogram: bool) -> Self {
        Self { histogram, ..self }
    }
}

/// Step count to number of games with that many steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Histogram {
    bins: BTreeMap<usize, usize>,
}

impl From<BTreeMap<usize, usize>> for Histogram {
    fn from(other: BTreeMap<usize, usize>) -> Self {
        Self { bins: other }
    }
}

impl Deref for Histogram {
    type Target = BTreeMap<usize, usize>;

    fn deref(&self) -> &Self::Target {
        &self.bins
    }
}

impl Display for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let max = match self.bins.values().max() {
            Some(&max) => max,
            None => return Ok(()),
        };
        let digits =
            std::iter::successors(Some(max), |&n| (n >= 10).then(|| n / 10)).count() as u32;
        let count_per_mark = (max as f32 / (80. - digits as f32 - 8.)).max(1.0);

        for (steps, &count) in self.bins.iter() {
            write!(f, "{:>2} |", steps)?;
            let marks = (count as f32 / count_per_mark).floor() as usize;
            writeln!(f, "{:■>marks$} ({})", "", count, marks = marks)?;
        }

        Ok(())
    }
}

/// The results of a benchmark run, in the order the strategies were added.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Record {
    results: Vec<StrategyResult>,
    baseline: Option<usize>,
    seed: u64,
}

impl Deref for Record {
    type Target = [StrategyResult];

    fn deref(&self) -> &Self::Target {
        &self.results
    }
}

impl Record {
    pub(crate) fn new(results: Vec<StrategyResult>, baseline: Option<usize>, seed: u64) -> Self {
        Self {
            results,
            baseline,
            seed,
        }
    }

    /// The seed the targets were drawn with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn baseline(&self) -> Option<&StrategyResult> {
        self.baseline.and_then(|n| self.results.get(n))
    }

    pub fn into_results(self) -> Vec<StrategyResult> {
        self.results
    }

    /// Prints every result with its histogram, compared against the baseline
    /// if there is one.
    pub fn print_report(&self) -> Result<(), MastermindError> {
        #[cfg(feature = "fancy")]
        println!("{}", self.table());

        for result in self.results.iter() {
            let options = StrategyResult::print_options().histogram(true);
            match self.baseline() {
                Some(baseline) => match result.print(options.compare(baseline)) {
                    Ok(()) => {}
                    Err(MastermindError::SelfComparison) => result.print(options)?,
                    Err(e) => return Err(e),
                },
                None => result.print(options)?,
            }
        }

        Ok(())
    }

    /// A table with one row per strategy.
    #[cfg(feature = "fancy")]
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        if table.is_tty() {
            table.load_preset(comfy_table::presets::UTF8_FULL);
        }
        table.set_header(vec![
            "strategy", "games", "solved", "mean", "sd", "median", "min", "max", "time",
        ]);

        for (i, result) in self.results.iter().enumerate() {
            let mut name = Cell::new(result.strategy_name());
            if Some(i) == self.baseline {
                name = name.fg(Color::Cyan);
            }
            let mut solved = Cell::new(result.num_solved());
            if result.num_missed() > 0 {
                solved = solved.fg(Color::Red);
            }

            table.add_row(vec![
                name,
                Cell::new(result.num_tried()),
                solved,
                Cell::new(format!("{:.2}", result.mean())),
                Cell::new(format!("{:.2}", result.std_dev())),
                Cell::new(format!("{:.1}", result.median())),
                Cell::new(result.min()),
                Cell::new(result.max()),
                Cell::new(format!("{:.2?}", result.elapsed())),
            ]);
        }

        table
    }

    /// Writes the record to a JSON file.
    #[cfg(feature = "serde")]
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> Result<(), MastermindError> {
        let file = std::fs::File::create(path).map_err(crate::HarnessError::ReportIo)?;
        serde_json::to_writer_pretty(file, self).map_err(crate::HarnessError::Serde)?;
        Ok(())
    }

    /// Reads a record written by [`save_json()`](Record::save_json()).
    #[cfg(feature = "serde")]
    pub fn load_json(path: impl AsRef<std::path::Path>) -> Result<Self, MastermindError> {
        let file = std::fs::File::open(path).map_err(crate::HarnessError::ReportIo)?;
        let record = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(crate::HarnessError::Serde)?;
        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{code::Code, game::Outcome};

    fn game(steps: usize, solved: bool) -> GameResult {
        GameResult {
            target: Code::from_index(steps).unwrap(),
            steps,
            guesses: vec![Code::from_index(0).unwrap(); steps],
            outcome: if solved {
                Outcome::Solved
            } else {
                Outcome::Capped
            },
        }
    }

    #[test]
    fn statistics_of_a_small_run() {
        let result = StrategyResult::from_games(
            Strategy::Hybrid,
            [3, 5, 5, 7].iter().map(|&n| game(n, true)),
            Duration::from_millis(12),
        );

        assert_eq!(result.num_tried(), 4);
        assert_eq!(result.num_solved(), 4);
        assert_eq!(result.mean(), 5.0);
        assert_eq!(result.median(), 5.0);
        assert_eq!(result.min(), 3);
        assert_eq!(result.max(), 7);
        assert!((result.std_dev() - 1.414).abs() < 1e-3);
        assert_eq!(result.histogram().get(&5), Some(&2));
        assert_eq!(result.steps(), vec![3., 5., 5., 7.]);
        assert_eq!(result.strategy_name(), "Hybrid v0.4.1");
    }

    #[test]
    fn samples_keep_the_head_and_outliers() {
        let mut games = vec![];
        games.extend((0..15).map(|_| game(5, true)));
        games.push(game(1, true));
        games.push(game(20, false));
        games.extend((0..40).map(|_| game(12, true)));

        let result = StrategyResult::from_games(Strategy::Entropy, games, Duration::ZERO);
        let samples = result.samples();

        assert_eq!(samples.len(), SAMPLE_CAP);
        assert!(samples[..SAMPLE_HEAD].iter().all(|g| g.steps == 5));
        assert_eq!(samples[SAMPLE_HEAD].steps, 1);
        assert_eq!(samples[SAMPLE_HEAD + 1].steps, 20);
        assert!(samples[SAMPLE_HEAD + 2..].iter().all(|g| g.steps == 12));
        assert_eq!(result.num_missed(), 1);
    }

    #[test]
    fn histogram_fits_in_eighty_columns() {
        let bins: BTreeMap<_, _> = [(3, 1), (4, 4000), (5, 2999), (20, 7)].into_iter().collect();
        let histogram = Histogram::from(bins);
        let text = histogram.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().all(|l| l.chars().count() <= 80));
        assert!(text.lines().next().unwrap().starts_with(" 3 |"));
        assert_eq!(Histogram::default().to_string(), "");
    }

    #[test]
    fn self_comparison_is_an_error() {
        let result = StrategyResult::from_games(
            Strategy::Probe,
            [4, 6].iter().map(|&n| game(n, true)),
            Duration::ZERO,
        );
        let mut sink = Vec::new();
        assert!(matches!(
            result.print_comparison(&mut sink, &result),
            Err(MastermindError::SelfComparison)
        ));
    }

    #[test]
    fn report_knows_its_baseline() {
        let a = StrategyResult::from_games(Strategy::Probe, vec![game(4, true)], Duration::ZERO);
        let b = StrategyResult::from_games(Strategy::Hybrid, vec![game(3, true)], Duration::ZERO);
        let record = Record::new(vec![a, b.clone()], Some(1), 42);
        assert_eq!(record.baseline(), Some(&b));
        assert_eq!(record.len(), 2);
        assert_eq!(record.seed(), 42);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn record_survives_json() {
        let a = StrategyResult::from_games(
            Strategy::Minimax,
            [2, 12].iter().map(|&n| game(n, true)),
            Duration::from_millis(3),
        );
        let record = Record::new(vec![a], None, 7);

        let path = std::env::temp_dir().join(format!("mastermind_rs_{}.json", std::process::id()));
        record.save_json(&path).unwrap();
        let loaded = Record::load_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, record);
    }
}
