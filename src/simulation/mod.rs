//! Many-game simulation between two lineups, accumulated into a [JointHistogram].

pub mod summary;

use std::path::Path;

use crate::error::Result;
use crate::game::{play_game, Lineup, OutcomeProbs, RandomSource, Rng, Score};
use crate::histogram::JointHistogram;

pub use summary::{
    bold, colored_win_bar, colormap, paint, win_bar, ScoreFrequency, SimulationSummary, TtyColor,
};

/// Two validated lineups. Every pitcher/batter pairing has a well-formed outcome distribution.
#[derive(Debug, Clone)]
pub struct Matchup {
    away: Lineup,
    home: Lineup,
}

impl Matchup {
    pub fn new(away: Lineup, home: Lineup) -> Result<Self> {
        validate_pairings(&away, &home, "home pitcher vs away batter")?;
        validate_pairings(&home, &away, "away pitcher vs home batter")?;
        Ok(Self { away, home })
    }

    pub fn from_paths(away: impl AsRef<Path>, home: impl AsRef<Path>) -> Result<Self> {
        Self::new(Lineup::from_path(away)?, Lineup::from_path(home)?)
    }

    pub fn away(&self) -> &Lineup {
        &self.away
    }

    pub fn home(&self) -> &Lineup {
        &self.home
    }

    /// Play one game; lineup rotations persist into the next call.
    pub fn play<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Score {
        play_game(&mut self.away, &mut self.home, rng)
    }

    /// Both rotations back to the leadoff batter.
    pub fn reset_rotations(&mut self) {
        self.away.reset_rotation();
        self.home.reset_rotation();
    }
}

fn validate_pairings(batting: &Lineup, pitching: &Lineup, label: &str) -> Result<()> {
    let pitcher = pitching.current_pitcher();
    for (i, batter) in batting.batters().iter().enumerate() {
        OutcomeProbs::compute(pitcher, batter).validate(&format!("{label} {}", i + 1))?;
    }
    Ok(())
}

/// Play `sims_n` games and add each final score to `result`.
pub fn compute_joint_runs_pdf<R: RandomSource + ?Sized>(
    result: &mut JointHistogram<'_>,
    matchup: &mut Matchup,
    sims_n: u64,
    rng: &mut R,
) {
    for game in 0..sims_n {
        let score = matchup.play(rng);
        tracing::trace!(game, away = score.away, home = score.home, "game final");
        result.add_score(&score);
    }
}

/// Load both teams, zero `buffer`, and fill it with the joint score histogram of `sims_n`
/// games played on one random stream. `seed` of `None` draws a seed from OS entropy.
pub fn run_simulations(
    buffer: &mut [u32],
    max_score: usize,
    away_path: impl AsRef<Path>,
    home_path: impl AsRef<Path>,
    sims_n: u64,
    seed: Option<u64>,
) -> Result<()> {
    let mut result = JointHistogram::from_buffer(buffer, max_score)?;
    let mut matchup = Matchup::from_paths(away_path, home_path)?;
    let mut rng = seed.map(Rng::new).unwrap_or_else(Rng::from_entropy);

    tracing::info!(sims_n, ?seed, max_score, "running simulations");
    compute_joint_runs_pdf(&mut result, &mut matchup, sims_n, &mut rng);
    tracing::info!(games = result.total(), "simulations complete");
    Ok(())
}

/// Owned-histogram variant of [run_simulations] for callers that already hold a matchup.
pub fn simulate_matchup(matchup: &mut Matchup, sims_n: u64, seed: u64, max_score: usize) -> JointHistogram<'static> {
    let mut result = JointHistogram::with_max_score(max_score);
    let mut rng = Rng::new(seed);
    compute_joint_runs_pdf(&mut result, matchup, sims_n, &mut rng);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::game::{BatterStats, PitcherStats, LINEUP_SIZE};

    fn lineup(pitcher: PitcherStats) -> Lineup {
        let batter = BatterStats::from_fields([520.0, 140.0, 28.0, 2.0, 18.0, 115.0, 0.269]);
        Lineup::new(pitcher, [batter; LINEUP_SIZE], "test").expect("valid lineup")
    }

    fn average_pitcher() -> PitcherStats {
        PitcherStats::from_fields([175.0, 60.0, 170.0, 810.0])
    }

    #[test]
    fn matchup_rejects_inconsistent_pitcher() {
        let wild = PitcherStats::from_fields([420.0, 500.0, 10.0, 800.0]);
        let err = Matchup::new(lineup(average_pitcher()), lineup(wild)).expect_err("wild pitcher");
        match err {
            SimError::InvalidProbabilities { context, .. } => {
                assert!(context.starts_with("home pitcher vs away batter"), "{context}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn one_increment_per_game() {
        let mut matchup = Matchup::new(lineup(average_pitcher()), lineup(average_pitcher()))
            .expect("valid matchup");
        let hist = simulate_matchup(&mut matchup, 250, 1, 64);
        assert_eq!(hist.total(), 250);
        assert!(hist.iter_nonzero().all(|(away, home, _)| away != home));
    }

    #[test]
    fn rotations_carry_across_games() {
        let mut matchup = Matchup::new(lineup(average_pitcher()), lineup(average_pitcher()))
            .expect("valid matchup");
        let mut rng = Rng::new(4);
        let mut cursors = std::collections::HashSet::new();
        for _ in 0..40 {
            matchup.play(&mut rng);
            cursors.insert(matchup.away().cursor());
        }
        assert!(cursors.len() > 1, "rotation reset between games");

        matchup.reset_rotations();
        assert_eq!(matchup.away().cursor(), 0);
        assert_eq!(matchup.home().cursor(), 0);
    }
}
