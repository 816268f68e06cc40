//! Half-inning and full-game control loop.

use serde::{Deserialize, Serialize};

use crate::game::field::BaseState;
use crate::game::lineup::Lineup;
use crate::game::outcome::simulate_at_bat;
use crate::game::rng::RandomSource;

pub const OUTS_PER_HALF_INNING: u32 = 3;

/// Inning index (0-based) below which the home half is always played.
pub const REGULATION_INNINGS: u32 = 9;

/// Innings are played while the index is below this, or while the score is tied.
pub const MIN_INNING_ITERATIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Score {
    pub away: u32,
    pub home: u32,
}

impl Score {
    pub fn new(away: u32, home: u32) -> Self {
        Self { away, home }
    }

    pub fn home_won(&self) -> bool {
        self.home > self.away
    }

    pub fn is_tied(&self) -> bool {
        self.away == self.home
    }
}

/// Tiebreak base state (runner on second) applies from this inning index onward.
pub fn is_overtime(inning: u32) -> bool {
    inning > REGULATION_INNINGS
}

/// Play at-bats until three outs; `defense` pitches, `offense` bats in rotation.
pub fn play_half_inning<R: RandomSource + ?Sized>(
    offense: &mut Lineup,
    defense: &Lineup,
    overtime: bool,
    rng: &mut R,
) -> u32 {
    let mut field = BaseState::new(overtime);
    let pitcher = defense.current_pitcher();
    let mut outs = 0;
    while outs < OUTS_PER_HALF_INNING {
        let batter = offense.next_batter();
        if simulate_at_bat(&mut field, pitcher, batter, rng) {
            outs += 1;
        }
    }
    field.runs()
}

/// Play one game. Lineup rotations carry over from whatever state the lineups are in.
///
/// Innings are indexed from 0 and played while the index is below
/// [MIN_INNING_ITERATIONS] or the score is tied. The home half is skipped from index
/// [REGULATION_INNINGS] on whenever home already leads after the away half.
pub fn play_game<R: RandomSource + ?Sized>(away: &mut Lineup, home: &mut Lineup, rng: &mut R) -> Score {
    let mut score = Score::default();
    let mut inning = 0;
    while inning < MIN_INNING_ITERATIONS || score.is_tied() {
        let overtime = is_overtime(inning);
        score.away += play_half_inning(away, home, overtime, rng);
        if inning < REGULATION_INNINGS || score.away >= score.home {
            score.home += play_half_inning(home, away, overtime, rng);
        }
        inning += 1;
    }
    score
}
