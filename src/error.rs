//! Error type shared by the simulator, the C ABI and the command-line surfaces.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading teams, validating statistics or running simulations.
#[derive(Debug, Error)]
pub enum SimError {
    /// A team file could not be read.
    #[error("unable to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A token in a team file was not a number.
    #[error("{context}: invalid number '{token}'")]
    Parse { context: String, token: String },

    /// The team data ended before the pitcher line and nine batter lines were read.
    #[error("{context}: expected a pitcher and 9 batters, found {batters} complete batter record(s)")]
    ShortLineup { context: String, batters: usize },

    /// A stat line is outside its domain (negative counts, zero denominators, ...).
    #[error("{context}: {reason}")]
    InvalidStats { context: String, reason: String },

    /// A pitcher/batter pairing yields a malformed outcome distribution.
    #[error("{context}: outcome probability '{outcome}' is {value}, statistics are inconsistent")]
    InvalidProbabilities {
        context: String,
        outcome: &'static str,
        value: f64,
    },

    /// A caller-supplied histogram buffer cannot hold MAXSCORE x MAXSCORE cells.
    #[error("histogram buffer holds {len} cells, {required} required")]
    BufferTooSmall { len: usize, required: usize },

    /// Two histograms with different bounds were merged.
    #[error("cannot merge histograms with max score {left} and {right}")]
    ShapeMismatch { left: usize, right: usize },

    /// The rayon pool could not be built.
    #[error("worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A caller passed a null pointer or a non-UTF-8 path across the C ABI.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing the CSV export failed.
    #[error("csv export: {0}")]
    Csv(#[from] csv::Error),

    /// A stats API request failed or returned data that cannot be turned into a lineup.
    #[error("stats api {request}: {reason}")]
    StatsApi { request: String, reason: String },
}

impl SimError {
    /// Negative status code reported across the C ABI.
    pub fn status_code(&self) -> f64 {
        match self {
            Self::Io { .. } => -1.0,
            Self::Parse { .. } => -2.0,
            Self::ShortLineup { .. } => -3.0,
            Self::InvalidStats { .. } => -4.0,
            Self::InvalidProbabilities { .. } => -5.0,
            Self::BufferTooSmall { .. } => -6.0,
            Self::ShapeMismatch { .. } => -7.0,
            Self::WorkerPool(_) => -8.0,
            Self::Csv(_) => -9.0,
            Self::InvalidArgument(_) => -10.0,
            Self::StatsApi { .. } => -11.0,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_negative_and_distinct() {
        let errors = [
            SimError::Parse {
                context: "x".to_string(),
                token: "y".to_string(),
            },
            SimError::ShortLineup {
                context: "x".to_string(),
                batters: 3,
            },
            SimError::BufferTooSmall {
                len: 1,
                required: 4,
            },
            SimError::ShapeMismatch { left: 2, right: 3 },
            SimError::StatsApi {
                request: "v1/schedule".to_string(),
                reason: "timed out".to_string(),
            },
        ];
        let codes: Vec<f64> = errors.iter().map(SimError::status_code).collect();
        assert!(codes.iter().all(|code| *code < 0.0));
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn short_lineup_message_names_batter_count() {
        let err = SimError::ShortLineup {
            context: "away.txt".to_string(),
            batters: 7,
        };
        assert!(err.to_string().contains("found 7 complete batter record(s)"));
    }
}
