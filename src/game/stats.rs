//! Season aggregate statistics for pitchers and batters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Pitcher season totals: hits allowed, walks allowed, strikeouts, batters faced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitcherStats {
    #[serde(rename = "H")]
    pub hits: f64,
    #[serde(rename = "BB")]
    pub walks: f64,
    #[serde(rename = "SO")]
    pub strikeouts: f64,
    #[serde(rename = "BF")]
    pub batters_faced: f64,
}

/// Batter season totals plus batting average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterStats {
    #[serde(rename = "AB")]
    pub at_bats: f64,
    #[serde(rename = "H")]
    pub hits: f64,
    #[serde(rename = "2B")]
    pub doubles: f64,
    #[serde(rename = "3B")]
    pub triples: f64,
    #[serde(rename = "HR")]
    pub home_runs: f64,
    #[serde(rename = "SO")]
    pub strikeouts: f64,
    #[serde(rename = "BA")]
    pub batting_average: f64,
}

impl PitcherStats {
    pub const FIELDS: usize = 4;

    pub fn from_fields(f: [f64; Self::FIELDS]) -> Self {
        Self {
            hits: f[0],
            walks: f[1],
            strikeouts: f[2],
            batters_faced: f[3],
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.hits / self.batters_faced
    }

    pub fn walk_rate(&self) -> f64 {
        self.walks / self.batters_faced
    }

    pub fn strikeout_rate(&self) -> f64 {
        self.strikeouts / self.batters_faced
    }

    pub fn validate(&self, context: &str) -> Result<()> {
        check_counts(
            context,
            &[
                ("H", self.hits),
                ("BB", self.walks),
                ("SO", self.strikeouts),
                ("BF", self.batters_faced),
            ],
        )?;
        if self.batters_faced <= 0.0 {
            return Err(invalid(context, "pitcher BF must be positive"));
        }
        Ok(())
    }
}

impl BatterStats {
    pub const FIELDS: usize = 7;

    pub fn from_fields(f: [f64; Self::FIELDS]) -> Self {
        Self {
            at_bats: f[0],
            hits: f[1],
            doubles: f[2],
            triples: f[3],
            home_runs: f[4],
            strikeouts: f[5],
            batting_average: f[6],
        }
    }

    pub fn strikeout_rate(&self) -> f64 {
        self.strikeouts / self.at_bats
    }

    /// Shares of doubles, triples and home runs among the batter's hits; zero without hits.
    pub fn extra_base_shares(&self) -> (f64, f64, f64) {
        if self.hits > 0.0 {
            (
                self.doubles / self.hits,
                self.triples / self.hits,
                self.home_runs / self.hits,
            )
        } else {
            (0.0, 0.0, 0.0)
        }
    }

    pub fn validate(&self, context: &str) -> Result<()> {
        check_counts(
            context,
            &[
                ("AB", self.at_bats),
                ("H", self.hits),
                ("2B", self.doubles),
                ("3B", self.triples),
                ("HR", self.home_runs),
                ("SO", self.strikeouts),
                ("BA", self.batting_average),
            ],
        )?;
        if self.at_bats <= 0.0 {
            return Err(invalid(context, "batter AB must be positive"));
        }
        if self.batting_average > 1.0 {
            return Err(invalid(
                context,
                &format!("batter BA {} exceeds 1", self.batting_average),
            ));
        }
        Ok(())
    }
}

fn check_counts(context: &str, fields: &[(&str, f64)]) -> Result<()> {
    for (name, value) in fields {
        if !value.is_finite() || *value < 0.0 {
            return Err(invalid(context, &format!("{name} must be a non-negative number, got {value}")));
        }
    }
    Ok(())
}

fn invalid(context: &str, reason: &str) -> SimError {
    SimError::InvalidStats {
        context: context.to_string(),
        reason: reason.to_string(),
    }
}
