//! Simulate one matchup sequentially and sharded, then print timings and speedup.
//!
//! Usage: cargo run --release --bin benchmark_parallel_speedup [sims] [shards]

use std::time::Instant;

use ballgame::game::Lineup;
use ballgame::parallel::{run_simulation_batches, WorkerPool};
use ballgame::simulation::{simulate_matchup, Matchup, SimulationSummary};

const AWAY: &str = include_str!("../../tests/fixtures/harbor_cats.txt");
const HOME: &str = include_str!("../../tests/fixtures/river_hawks.txt");

fn main() {
    ballgame::logging::init_logging("warn");

    let args: Vec<String> = std::env::args().collect();
    let sims: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(200_000);
    let shards: usize = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rayon::current_num_threads);
    let seed = 12345u64;
    let max_score = ballgame::config::max_score();

    let matchup = match Lineup::parse(AWAY, "harbor_cats")
        .and_then(|away| Ok((away, Lineup::parse(HOME, "river_hawks")?)))
        .and_then(|(away, home)| Matchup::new(away, home))
    {
        Ok(matchup) => matchup,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    println!("Games: {sims} (shards={shards}, max_score={max_score})");
    println!();

    let t0 = Instant::now();
    let sequential = simulate_matchup(&mut matchup.clone(), sims, seed, max_score);
    let elapsed_seq = t0.elapsed();
    let seq_ms = elapsed_seq.as_secs_f64() * 1000.0;
    println!("Sequential:  {:.2} ms  ({:.1} games/s)", seq_ms, sims as f64 / elapsed_seq.as_secs_f64());

    let t0 = Instant::now();
    let sharded = match run_simulation_batches(&matchup, sims, seed, shards, max_score, &WorkerPool::default()) {
        Ok(hist) => hist,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let elapsed_par = t0.elapsed();
    let par_ms = elapsed_par.as_secs_f64() * 1000.0;
    println!("Sharded:     {:.2} ms  ({:.1} games/s)", par_ms, sims as f64 / elapsed_par.as_secs_f64());

    println!();
    println!("Speedup:     {:.2}x (sharded vs sequential)", seq_ms / par_ms);

    assert_eq!(sequential.total(), sharded.total());
    let a = SimulationSummary::from_histogram(&sequential, 0);
    let b = SimulationSummary::from_histogram(&sharded, 0);
    println!(
        "Home win:    {:.4} sequential, {:.4} sharded",
        a.home_win_probability, b.home_win_probability
    );
}
