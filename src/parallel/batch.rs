//! Batch distribution for sharded simulation.
//!
//! A run of `sims_n` games is split into shards. Each shard plays its share of games on its own
//! random stream with its own copy of the lineups, and the shard histograms are merged only
//! after every shard has finished, so no cell is shared between threads.

use rayon::prelude::*;

use crate::error::Result;
use crate::game::Rng;
use crate::histogram::JointHistogram;
use crate::parallel::pool::WorkerPool;
use crate::simulation::{compute_joint_runs_pdf, simulate_matchup, Matchup};

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use ballgame::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// One shard's share of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPlan {
    pub index: u64,
    pub games: u64,
}

impl ShardPlan {
    pub fn split(sims_n: u64, shards: usize) -> Vec<ShardPlan> {
        batch_ranges(sims_n as usize, shards.max(1))
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| ShardPlan {
                index: index as u64,
                games: (end - start) as u64,
            })
            .collect()
    }
}

/// Play one shard from fresh rotations on stream `plan.index` of `seed`.
pub fn simulate_shard(matchup: &Matchup, plan: ShardPlan, seed: u64, max_score: usize) -> JointHistogram<'static> {
    let mut matchup = matchup.clone();
    matchup.reset_rotations();
    let mut rng = Rng::for_stream(seed, plan.index);
    let mut hist = JointHistogram::with_max_score(max_score);
    compute_joint_runs_pdf(&mut hist, &mut matchup, plan.games, &mut rng);
    tracing::debug!(shard = plan.index, games = plan.games, "shard complete");
    hist
}

/// Simulate `sims_n` games across `shards` independent streams on `pool` and merge the results.
/// The merged histogram depends only on `(seed, shards)`, not on the worker count.
///
/// A single shard runs the sequential path on `Rng::new(seed)` with the matchup's rotations as
/// given, so `shards == 1` reproduces [simulate_matchup].
pub fn run_simulation_batches(
    matchup: &Matchup,
    sims_n: u64,
    seed: u64,
    shards: usize,
    max_score: usize,
    pool: &WorkerPool,
) -> Result<JointHistogram<'static>> {
    if shards <= 1 {
        return Ok(simulate_matchup(&mut matchup.clone(), sims_n, seed, max_score));
    }

    let plans = ShardPlan::split(sims_n, shards);
    tracing::info!(sims_n, shards = plans.len(), workers = pool.workers, "running sharded simulation");

    let partials: Vec<JointHistogram<'static>> = pool.install(|| {
        plans
            .par_iter()
            .map(|plan| simulate_shard(matchup, *plan, seed, max_score))
            .collect()
    })?;

    let mut merged = JointHistogram::with_max_score(max_score);
    for partial in &partials {
        merged.merge(partial)?;
    }
    Ok(merged)
}
