pub mod engine;
pub mod field;
pub mod lineup;
pub mod outcome;
pub mod rng;
pub mod stats;

pub use engine::{is_overtime, play_game, play_half_inning, Score, OUTS_PER_HALF_INNING};
pub use field::BaseState;
pub use lineup::{Lineup, TeamSheet, LINEUP_SIZE};
pub use outcome::{apply_outcome, simulate_at_bat, Outcome, OutcomeProbs};
pub use rng::{entropy_seed, weighted_index, RandomSource, Rng};
pub use stats::{BatterStats, PitcherStats};
