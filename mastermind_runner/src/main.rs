use log::info;
use mastermind_rs::{Benchmark, BenchmarkConfig, MastermindError, Strategy};

fn main() -> Result<(), MastermindError> {
    env_logger::init();

    // usage: mastermind_runner [games] [seed]
    let mut args = std::env::args().skip(1);
    let games = args.next().and_then(|s| s.parse().ok()).unwrap_or(200);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let config = BenchmarkConfig::new()
        .verbose()
        .add_strategy(Strategy::Probe)
        .add_strategy(Strategy::Entropy)
        .add_strategy(Strategy::Minimax)
        .add_baseline(Strategy::Hybrid)
        .test_num(games)
        .seed(seed);
    // .test_all();

    info!("running {} games per strategy with seed {}", games, seed);
    let record = Benchmark::new(config)?.run()?;

    record.print_report()
}
