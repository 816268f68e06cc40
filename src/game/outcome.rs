//! Per-at-bat outcome model.
//!
//! Each pitcher/batter pairing yields a distribution over eight outcomes built from
//! complementary probabilities:
//!
//! - hit = sqrt(pitcher H/BF * batter BA), walk = pitcher BB/BF, out = 1 - hit - walk
//! - a hit splits into singles, doubles, triples and home runs by the batter's own shares
//! - an out is a strikeout with probability sqrt(pitcher SO/BF * batter SO/AB); the rest of
//!   the out mass splits evenly between tag-outs and fly-outs

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::game::field::BaseState;
use crate::game::rng::{weighted_index, RandomSource};
use crate::game::stats::{BatterStats, PitcherStats};

/// Rounding slack tolerated below zero before a probability counts as negative.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Single,
    Double,
    Triple,
    HomeRun,
    TagOut,
    FlyOut,
    StrikeOut,
    Walk,
}

impl Outcome {
    /// Sampling order; [OutcomeProbs] is indexed the same way.
    pub const ALL: [Outcome; 8] = [
        Outcome::Single,
        Outcome::Double,
        Outcome::Triple,
        Outcome::HomeRun,
        Outcome::TagOut,
        Outcome::FlyOut,
        Outcome::StrikeOut,
        Outcome::Walk,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::HomeRun => "home_run",
            Self::TagOut => "tag_out",
            Self::FlyOut => "fly_out",
            Self::StrikeOut => "strikeout",
            Self::Walk => "walk",
        }
    }

    pub const fn is_out(self) -> bool {
        matches!(self, Self::TagOut | Self::FlyOut | Self::StrikeOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbs {
    probs: [f64; 8],
}

impl OutcomeProbs {
    pub fn compute(pitcher: &PitcherStats, batter: &BatterStats) -> Self {
        let hit = (pitcher.hit_rate() * batter.batting_average).sqrt();
        let walk = pitcher.walk_rate();
        let out = 1.0 - hit - walk;

        let (double_share, triple_share, hr_share) = batter.extra_base_shares();
        let single_share = 1.0 - double_share - triple_share - hr_share;

        let strikeout_share = (pitcher.strikeout_rate() * batter.strikeout_rate()).sqrt();
        let in_play_share = 0.5 * (1.0 - strikeout_share);

        Self {
            probs: [
                hit * single_share,
                hit * double_share,
                hit * triple_share,
                hit * hr_share,
                out * in_play_share,
                out * in_play_share,
                out * strikeout_share,
                walk,
            ],
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        self.probs[outcome.index()]
    }

    pub fn as_array(&self) -> &[f64; 8] {
        &self.probs
    }

    /// Reject distributions with a non-finite or negative entry, as produced by stat lines
    /// where BB/BF plus the hit probability exceeds one or extra-base hits exceed hits.
    pub fn validate(&self, context: &str) -> Result<()> {
        for outcome in Outcome::ALL {
            let value = self.get(outcome);
            if !value.is_finite() || value < -PROBABILITY_EPSILON {
                return Err(SimError::InvalidProbabilities {
                    context: context.to_string(),
                    outcome: outcome.name(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// One weighted draw over the eight outcomes.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Outcome {
        match weighted_index(rng, &self.probs) {
            Some(i) => Outcome::ALL[i],
            // Only reachable with an all-zero distribution; end the at-bat as an out so the
            // half-inning still terminates.
            None => Outcome::StrikeOut,
        }
    }
}

/// Move runners for `outcome`. Returns whether the at-bat recorded an out.
pub fn apply_outcome<R: RandomSource + ?Sized>(
    field: &mut BaseState,
    outcome: Outcome,
    rng: &mut R,
) -> bool {
    match outcome {
        Outcome::Walk | Outcome::Single => field.advance(1),
        Outcome::Double => field.advance(2),
        Outcome::Triple => field.advance(3),
        Outcome::HomeRun => field.advance(4),
        Outcome::TagOut => {
            field.advance(1);
            field.out(rng);
        }
        Outcome::FlyOut | Outcome::StrikeOut => {}
    }
    outcome.is_out()
}

/// Draw and apply one at-bat. Returns whether it recorded an out.
pub fn simulate_at_bat<R: RandomSource + ?Sized>(
    field: &mut BaseState,
    pitcher: &PitcherStats,
    batter: &BatterStats,
    rng: &mut R,
) -> bool {
    let outcome = OutcomeProbs::compute(pitcher, batter).sample(rng);
    apply_outcome(field, outcome, rng)
}
