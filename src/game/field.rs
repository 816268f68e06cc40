//! Base occupancy and run counting for a single half-inning.

use crate::game::rng::{weighted_index, RandomSource};

pub const FIRST: usize = 0;
pub const SECOND: usize = 1;
pub const THIRD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseState {
    bases: [bool; 3],
    runs: u32,
}

impl BaseState {
    /// Empty bases, no runs. With `overtime`, a runner starts on second (extra-inning tiebreak).
    pub fn new(overtime: bool) -> Self {
        let mut state = Self::default();
        if overtime {
            state.bases[SECOND] = true;
        }
        state
    }

    /// Test and replay constructor with explicit occupancy.
    pub fn with_bases(bases: [bool; 3], runs: u32) -> Self {
        Self { bases, runs }
    }

    /// The batter and every runner gain `n` bases. The batter stops on first after the first
    /// step and keeps going from there; a runner pushed off third scores.
    pub fn advance(&mut self, n: u32) {
        for step in 0..n {
            self.runs += u32::from(self.bases[THIRD]);
            self.bases[THIRD] = self.bases[SECOND];
            self.bases[SECOND] = self.bases[FIRST];
            self.bases[FIRST] = step == 0;
        }
    }

    /// A fielding out that also erases one runner, chosen with weight proportional to
    /// occupancy. Empty bases are left alone and no draw is taken.
    pub fn out<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let occupied = self.occupied();
        if occupied == 0 {
            return;
        }
        let total = occupied as f64;
        let weights = self.bases.map(|on| f64::from(u8::from(on)) / total);
        if let Some(base) = weighted_index(rng, &weights) {
            self.bases[base] = false;
        }
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn bases(&self) -> [bool; 3] {
        self.bases
    }

    pub fn occupied(&self) -> usize {
        self.bases.iter().filter(|on| **on).count()
    }
}
