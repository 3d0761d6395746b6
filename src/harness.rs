//! The benchmark harness for comparing strategies.
//!
//! A [`Benchmark`] plays every configured strategy against the same set of
//! pseudorandom targets. It works in small chunks of games so that whoever
//! drives it stays responsive: each call to [`step()`](Benchmark::step())
//! plays one chunk and returns. [`run_benchmark()`] drives a benchmark on a
//! background thread and reports through callbacks.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::debug;
use rand::{rngs::StdRng, seq::index::sample, Rng, SeedableRng};

use crate::{
    code::{generate_all_codes, Code, SPACE},
    game::simulate,
    perf::{Accumulator, Record, StrategyResult},
    strategy::Strategy,
    HarnessError, MastermindError,
};

/// Games played per call to [`Benchmark::step()`] unless configured
/// otherwise.
pub const CHUNK_SIZE: usize = 5;

/// Draws `count` distinct targets.
///
/// The same seed always gives the same targets in the same order. `count`
/// is clamped to the number of codes.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::harness::generate_random_targets;
/// let a = generate_random_targets(50, 42);
/// let b = generate_random_targets(50, 42);
/// assert_eq!(a, b);
/// assert_ne!(a, generate_random_targets(50, 43));
/// ```
pub fn generate_random_targets(count: usize, seed: u64) -> Vec<Code> {
    let all = generate_all_codes();
    let mut rng = StdRng::seed_from_u64(seed);
    sample(&mut rng, SPACE, count.min(SPACE))
        .iter()
        .map(|i| all[i])
        .collect()
}

/// Configuration for a benchmark run.
///
/// Configuration methods consume the existing [`BenchmarkConfig`] and return
/// a new one.
///
/// # Examples
///
/// ```rust
/// # use mastermind_rs::{BenchmarkConfig, Benchmark, Strategy};
/// let config = BenchmarkConfig::new()
///     .add_strategy(Strategy::Probe)
///     .add_baseline(Strategy::Hybrid)
///     .test_num(10)
///     .seed(42);
///
/// let record = Benchmark::new(config)?.run()?;
/// assert_eq!(record.len(), 2);
/// assert_eq!(record.baseline().unwrap().strategy(), Strategy::Hybrid);
/// #
/// # Ok::<_, mastermind_rs::MastermindError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    strategies: Vec<Strategy>,
    num_games: usize,
    seed: Option<u64>,
    baseline: Option<usize>,
    chunk_size: usize,
    verbose: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            strategies: Vec::new(),
            num_games: 100,
            seed: None,
            baseline: None,
            chunk_size: CHUNK_SIZE,
            verbose: false,
        }
    }
}

impl BenchmarkConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults:
    /// 1. tests no strategies
    /// 2. quiet mode
    /// 3. plays 100 games per strategy
    /// 4. draws a fresh seed for every run
    /// 5. does not compare against a baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a progress bar while running with [`Benchmark::run()`].
    pub fn verbose(self) -> Self {
        BenchmarkConfig {
            verbose: true,
            ..self
        }
    }

    /// Runs silently.
    pub fn quiet(self) -> Self {
        BenchmarkConfig {
            verbose: false,
            ..self
        }
    }

    /// Adds a strategy to compare.
    pub fn add_strategy(self, strategy: Strategy) -> Self {
        let mut strategies = self.strategies;
        strategies.push(strategy);
        BenchmarkConfig { strategies, ..self }
    }

    /// Adds several strategies to compare.
    pub fn add_strategies(self, strats: impl IntoIterator<Item = Strategy>) -> Self {
        let mut strategies = self.strategies;
        strategies.extend(strats);
        BenchmarkConfig { strategies, ..self }
    }

    /// Adds a strategy and sets it as the baseline for comparisons.
    pub fn add_baseline(self, strategy: Strategy) -> Self {
        self.add_strategy(strategy).and_baseline()
    }

    /// Sets the most recently added strategy as the baseline.
    pub fn and_baseline(self) -> Self {
        Self {
            baseline: self.strategies.len().checked_sub(1),
            ..self
        }
    }

    /// Plays `n` games per strategy.
    pub fn test_num(self, n: usize) -> Self {
        BenchmarkConfig {
            num_games: n,
            ..self
        }
    }

    /// Plays every code once per strategy.
    pub fn test_all(self) -> Self {
        self.test_num(SPACE)
    }

    /// Draws targets from a fixed seed, so runs can be reproduced.
    pub fn seed(self, seed: u64) -> Self {
        BenchmarkConfig {
            seed: Some(seed),
            ..self
        }
    }

    /// Draws a fresh seed for each run.
    pub fn random_seed(self) -> Self {
        BenchmarkConfig { seed: None, ..self }
    }

    /// Plays `n` games per step instead of [`CHUNK_SIZE`].
    pub fn chunk_size(self, n: usize) -> Self {
        BenchmarkConfig {
            chunk_size: n.max(1),
            ..self
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn num_games(&self) -> usize {
        self.num_games
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    fn validate(&self) -> Result<(), HarnessError> {
        if self.strategies.is_empty() {
            Err(HarnessError::NoStrategiesAdded)
        } else if self.num_games == 0 {
            Err(HarnessError::NoGames)
        } else if self.num_games > SPACE {
            Err(HarnessError::TooManyGames(self.num_games))
        } else {
            Ok(())
        }
    }
}

/// Where a benchmark is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not started, or stopped by cancellation.
    Idle,
    Running,
    /// Every strategy has played every game.
    Done,
}

/// A progress report, sent once per chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// The position of the active strategy in the configuration.
    pub strategy_index: usize,
    pub strategy: Strategy,
    /// Games finished for the active strategy.
    pub games_completed: usize,
    /// Games each strategy plays.
    pub total_games: usize,
    /// Time since the benchmark started.
    pub elapsed: Duration,
}

impl Progress {
    /// Games finished across all strategies so far.
    pub fn overall_completed(&self) -> usize {
        self.strategy_index * self.total_games + self.games_completed
    }
}

/// What one call to [`Benchmark::step()`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A chunk of games was played.
    Progress(Progress),
    /// Every game has been played. This is returned exactly once.
    Complete(Record),
    /// The benchmark was cancelled and will do nothing more.
    Cancelled,
    /// The results were already delivered.
    Finished,
}

/// A handle for stopping a benchmark from anywhere.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Asks the benchmark to stop before its next chunk.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A benchmark run, advanced one chunk at a time.
#[derive(Debug)]
pub struct Benchmark {
    config: BenchmarkConfig,
    state: State,
    seed: u64,
    targets: Vec<Code>,
    strategy_index: usize,
    acc: Accumulator,
    results: Vec<StrategyResult>,
    started: Option<Instant>,
    strategy_started: Option<Instant>,
    cancel: CancelHandle,
}

impl Benchmark {
    /// Creates an idle benchmark.
    ///
    /// Returns an error if no strategies were configured or the number of
    /// games cannot be drawn as distinct codes.
    pub fn new(config: BenchmarkConfig) -> Result<Self, MastermindError> {
        config.validate()?;

        Ok(Benchmark {
            seed: config
                .seed
                .unwrap_or_else(|| rand::thread_rng().gen::<u64>()),
            config,
            state: State::Idle,
            targets: Vec::new(),
            strategy_index: 0,
            acc: Accumulator::default(),
            results: Vec::new(),
            started: None,
            strategy_started: None,
            cancel: CancelHandle::default(),
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// The seed the targets are drawn with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The targets every strategy plays. Empty until the benchmark starts.
    pub fn targets(&self) -> &[Code] {
        &self.targets
    }

    /// A handle that cancels this benchmark.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Stops the benchmark. No further chunks are played.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Draws the targets and moves from idle to running.
    ///
    /// Does nothing unless the benchmark is idle and not cancelled.
    pub fn start(&mut self) {
        if self.state != State::Idle || self.cancel.is_cancelled() {
            return;
        }

        self.targets = generate_random_targets(self.config.num_games, self.seed);
        self.strategy_index = 0;
        self.acc = Accumulator::default();
        self.results.clear();
        self.started = Some(Instant::now());
        self.strategy_started = self.started;
        self.state = State::Running;

        debug!(
            "benchmark started: {} strategies, {} games, seed {}",
            self.config.strategies.len(),
            self.targets.len(),
            self.seed
        );
    }

    /// Plays the next chunk of games, starting the benchmark if needed.
    ///
    /// A chunk never spans two strategies. Cancellation is checked before
    /// anything else, so once [`cancel()`](CancelHandle::cancel()) has been
    /// called no more games are played and no results are produced.
    pub fn step(&mut self) -> Step {
        if self.cancel.is_cancelled() {
            if self.state == State::Running {
                debug!("benchmark cancelled");
                self.state = State::Idle;
            }
            return Step::Cancelled;
        }

        match self.state {
            State::Done => return Step::Finished,
            State::Idle => self.start(),
            State::Running => {}
        }

        if self.strategy_index >= self.config.strategies.len() {
            self.state = State::Done;
            debug!("benchmark finished");
            return Step::Complete(Record::new(
                std::mem::take(&mut self.results),
                self.config.baseline,
                self.seed,
            ));
        }

        let strategy = self.config.strategies[self.strategy_index];
        let start = self.acc.len();
        let end = (start + self.config.chunk_size).min(self.targets.len());

        for target in &self.targets[start..end] {
            self.acc.push(simulate(strategy, target));
        }

        let progress = Progress {
            strategy_index: self.strategy_index,
            strategy,
            games_completed: end,
            total_games: self.targets.len(),
            elapsed: self.started.map(|s| s.elapsed()).unwrap_or_default(),
        };

        if end == self.targets.len() {
            self.finish_strategy(strategy);
        }

        Step::Progress(progress)
    }

    fn finish_strategy(&mut self, strategy: Strategy) {
        let elapsed = self
            .strategy_started
            .map(|s| s.elapsed())
            .unwrap_or_default();
        let result = std::mem::take(&mut self.acc).finish(strategy, elapsed);

        debug!(
            "{} finished {} games: mean {:.3}, max {}",
            result.strategy_name(),
            result.num_tried(),
            result.mean(),
            result.max()
        );

        self.results.push(result);
        self.strategy_index += 1;
        self.strategy_started = Some(Instant::now());
    }

    /// Runs every chunk on the current thread and returns the results.
    ///
    /// Shows a progress bar when the configuration is verbose.
    pub fn run(mut self) -> Result<Record, MastermindError> {
        #[cfg(feature = "fancy")]
        let bar = self.config.verbose.then(|| {
            indicatif::ProgressBar::new(
                (self.config.num_games * self.config.strategies.len()) as u64,
            )
        });

        loop {
            match self.step() {
                Step::Progress(_progress) => {
                    #[cfg(feature = "fancy")]
                    if let Some(bar) = &bar {
                        bar.set_message(_progress.strategy.to_string());
                        bar.set_position(_progress.overall_completed() as u64);
                    }
                }
                Step::Complete(record) => {
                    #[cfg(feature = "fancy")]
                    if let Some(bar) = &bar {
                        bar.finish_and_clear();
                    }
                    return Ok(record);
                }
                Step::Cancelled | Step::Finished => {
                    return Err(HarnessError::Cancelled.into());
                }
            }
        }
    }
}

/// A benchmark running on a background thread.
#[derive(Debug)]
pub struct BenchmarkHandle {
    cancel: CancelHandle,
    thread: JoinHandle<()>,
}

impl BenchmarkHandle {
    /// Stops the benchmark before its next chunk. Neither callback is called
    /// for chunks that start after this.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Waits for the background thread to stop.
    pub fn join(self) -> thread::Result<()> {
        self.thread.join()
    }
}

/// Starts a benchmark without blocking.
///
/// `on_progress` is called after every chunk and `on_complete` once with the
/// final results, unless the benchmark is cancelled first. After
/// cancellation, neither is called again. Chunks are separated by a yield so
/// the benchmark shares its thread's time slice politely.
///
/// # Examples
///
/// ```rust
/// # use std::sync::mpsc;
/// # use mastermind_rs::{run_benchmark, BenchmarkConfig, Strategy};
/// let (tx, rx) = mpsc::channel();
/// let config = BenchmarkConfig::new()
///     .add_strategy(Strategy::Hybrid)
///     .test_num(8)
///     .seed(1);
///
/// let handle = run_benchmark(config, |_progress| {}, move |record| {
///     tx.send(record).unwrap();
/// })?;
///
/// let record = rx.recv().unwrap();
/// assert_eq!(record[0].num_tried(), 8);
/// handle.join().unwrap();
/// #
/// # Ok::<_, mastermind_rs::MastermindError>(())
/// ```
pub fn run_benchmark<P, C>(
    config: BenchmarkConfig,
    mut on_progress: P,
    on_complete: C,
) -> Result<BenchmarkHandle, MastermindError>
where
    P: FnMut(Progress) + Send + 'static,
    C: FnOnce(Record) + Send + 'static,
{
    let mut benchmark = Benchmark::new(config)?;
    let cancel = benchmark.cancel_handle();
    let worker_cancel = cancel.clone();

    let thread = thread::spawn(move || {
        let mut on_complete = Some(on_complete);
        loop {
            let step = benchmark.step();
            if worker_cancel.is_cancelled() {
                break;
            }

            match step {
                Step::Progress(progress) => on_progress(progress),
                Step::Complete(record) => {
                    if let Some(on_complete) = on_complete.take() {
                        on_complete(record);
                    }
                    break;
                }
                Step::Cancelled | Step::Finished => break,
            }

            thread::yield_now();
        }
    });

    Ok(BenchmarkHandle { cancel, thread })
}

/// Plays `strategy` against every possible code.
///
/// Uses every core when the `parallel` feature is enabled.
pub fn sweep_all(strategy: Strategy) -> StrategyResult {
    let start = Instant::now();

    #[cfg(feature = "parallel")]
    let games: Vec<_> = {
        use rayon::prelude::*;
        generate_all_codes()
            .par_iter()
            .map(|target| simulate(strategy, target))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let games: Vec<_> = generate_all_codes()
        .iter()
        .map(|target| simulate(strategy, target))
        .collect();

    let result = StrategyResult::from_games(strategy, games, start.elapsed());
    debug!(
        "{} swept every code: mean {:.3}, max {}, {} missed",
        result.strategy_name(),
        result.mean(),
        result.max(),
        result.num_missed()
    );
    result
}

#[cfg(test)]
mod test {
    use std::sync::{mpsc, Mutex};

    use super::*;

    fn config() -> BenchmarkConfig {
        BenchmarkConfig::new()
            .add_strategy(Strategy::Probe)
            .add_strategy(Strategy::Hybrid)
            .test_num(12)
            .seed(42)
    }

    #[test]
    fn targets_are_distinct_and_reproducible() {
        let a = generate_random_targets(500, 42);
        assert_eq!(a.len(), 500);
        assert_eq!(a, generate_random_targets(500, 42));
        assert_ne!(a, generate_random_targets(500, 7));

        let mut unique = a.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 500);

        assert_eq!(generate_random_targets(20_000, 1).len(), SPACE);
    }

    #[test]
    fn bad_configurations_are_rejected() {
        assert!(matches!(
            Benchmark::new(BenchmarkConfig::new()),
            Err(MastermindError::Harness {
                kind: HarnessError::NoStrategiesAdded
            })
        ));
        assert!(matches!(
            Benchmark::new(config().test_num(0)),
            Err(MastermindError::Harness {
                kind: HarnessError::NoGames
            })
        ));
        assert!(matches!(
            Benchmark::new(config().test_num(SPACE + 1)),
            Err(MastermindError::Harness {
                kind: HarnessError::TooManyGames(_)
            })
        ));
        assert_eq!(BenchmarkConfig::new().and_baseline().baseline, None);
    }

    #[test]
    fn steps_through_chunks_and_strategies() {
        let mut bench = Benchmark::new(config()).unwrap();
        assert_eq!(bench.state(), State::Idle);
        assert!(bench.targets().is_empty());

        let mut seen = Vec::new();
        let record = loop {
            match bench.step() {
                Step::Progress(p) => {
                    assert_eq!(bench.state(), State::Running);
                    seen.push((p.strategy_index, p.games_completed));
                }
                Step::Complete(record) => break record,
                other => panic!("unexpected step {:?}", other),
            }
        };

        assert_eq!(
            seen,
            vec![(0, 5), (0, 10), (0, 12), (1, 5), (1, 10), (1, 12)]
        );
        assert_eq!(bench.state(), State::Done);
        assert_eq!(bench.step(), Step::Finished);

        assert_eq!(record.len(), 2);
        assert_eq!(record.seed(), 42);
        assert_eq!(record[0].strategy(), Strategy::Probe);
        assert_eq!(record[1].strategy(), Strategy::Hybrid);
        for result in record.iter() {
            assert_eq!(result.num_tried(), 12);
            assert_eq!(result.histogram().values().sum::<usize>(), 12);
            assert!(result.samples().len() >= crate::perf::SAMPLE_HEAD);
            assert!(result.min() as f64 <= result.mean());
            assert!(result.mean() <= result.max() as f64);
        }

        // every strategy saw the same targets
        let targets = generate_random_targets(12, 42);
        assert_eq!(bench.targets(), targets.as_slice());
        assert_eq!(record[0].samples()[0].target, targets[0]);
        assert_eq!(record[1].samples()[0].target, targets[0]);
    }

    #[test]
    fn same_seed_same_results() {
        let a = Benchmark::new(config()).unwrap().run().unwrap();
        let b = Benchmark::new(config()).unwrap().run().unwrap();
        for (a, b) in a.iter().zip(b.iter()) {
            assert_eq!(a.histogram(), b.histogram());
            assert_eq!(a.samples(), b.samples());
        }
    }

    #[test]
    fn cancelling_stops_everything() {
        let mut bench = Benchmark::new(config()).unwrap();
        assert!(matches!(bench.step(), Step::Progress(_)));

        bench.cancel();
        assert_eq!(bench.step(), Step::Cancelled);
        assert_eq!(bench.state(), State::Idle);
        assert_eq!(bench.step(), Step::Cancelled);
    }

    #[test]
    fn cancelled_before_start_never_runs() {
        let bench = Benchmark::new(config()).unwrap();
        bench.cancel_handle().cancel();
        assert!(matches!(
            bench.run(),
            Err(MastermindError::Harness {
                kind: HarnessError::Cancelled
            })
        ));
    }

    #[test]
    fn background_run_reports_progress_then_completes() {
        let progress = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel();

        let sink = progress.clone();
        let handle = run_benchmark(
            config(),
            move |p| sink.lock().unwrap().push(p),
            move |record| tx.send(record).unwrap(),
        )
        .unwrap();

        let record = rx.recv().unwrap();
        handle.join().unwrap();

        assert_eq!(record.len(), 2);
        let progress = progress.lock().unwrap();
        assert_eq!(progress.len(), 6);
        assert_eq!(progress.last().unwrap().overall_completed(), 24);
        assert!(progress.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    }

    #[test]
    fn background_run_can_be_cancelled() {
        let (tx, rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();

        let handle = run_benchmark(
            config().test_num(100),
            move |_| {
                // hold the worker until the test has cancelled
                let _ = gate_rx.recv();
            },
            move |record| tx.send(record).unwrap(),
        )
        .unwrap();

        handle.cancel();
        drop(gate_tx);
        handle.join().unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sampled_targets_terminate() {
        let all = generate_all_codes();
        for target in all.iter().step_by(97) {
            let result = simulate(Strategy::Hybrid, target);
            assert!(result.steps <= crate::game::STEP_CAP);
            assert_ne!(result.outcome, crate::game::Outcome::Contradiction);
            if result.solved() {
                assert_eq!(result.guesses.last(), Some(target));
            }
        }
    }

    #[test]
    #[ignore = "plays all 10000 codes for every strategy"]
    fn every_target_terminates() {
        for strategy in Strategy::ALL {
            let result = sweep_all(strategy);
            assert_eq!(result.num_tried() as usize, SPACE);
            assert!(result.max() <= crate::game::STEP_CAP);
        }
    }
}
