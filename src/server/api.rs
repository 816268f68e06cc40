use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{self, Config};
use crate::error::SimError;
use crate::game::{entropy_seed, Lineup, TeamSheet};
use crate::parallel::{run_simulation_batches, WorkerPool};
use crate::simulation::{Matchup, SimulationSummary};

pub const MAX_SIMS: u32 = 1_000_000;
pub const MAX_SHARDS: usize = 256;
const TOP_SCORES: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub away: TeamSheet,
    pub home: TeamSheet,
    pub sims: Option<u32>,
    pub seed: Option<u64>,
    pub shards: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    pub status: &'static str,
    pub sims: u32,
    pub seed: u64,
    pub shards: usize,
    pub max_score: usize,
    pub summary: SimulationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum SimulateError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    Simulation(SimError),
}

impl fmt::Display for SimulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid simulate request"),
            Self::Simulation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SimulateError {}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "ballgame-api",
        "version": env!("CARGO_PKG_VERSION"),
        "max_score": config::max_score()
    }))
}

pub fn simulate_payload(body: &str) -> Result<String, SimulateError> {
    simulate_payload_with(body, &Config::from_env())
}

/// Like [simulate_payload], with `sims` and `workers` defaults taken from `config`.
pub fn simulate_payload_with(body: &str, config: &Config) -> Result<String, SimulateError> {
    let request: SimulateRequest = serde_json::from_str(body).map_err(SimulateError::Parse)?;
    let sims = request.sims.unwrap_or(config.sims);
    let shards = request.shards.unwrap_or(1);
    let matchup = validate_request(&request, sims, shards)?;
    let seed = request.seed.unwrap_or_else(entropy_seed);
    let max_score = config::max_score();

    let pool = WorkerPool::with_workers(config.workers);
    let hist = run_simulation_batches(&matchup, u64::from(sims), seed, shards, max_score, &pool)
        .map_err(SimulateError::Simulation)?;

    let response = SimulateResponse {
        status: "ok",
        sims,
        seed,
        shards,
        max_score,
        summary: SimulationSummary::from_histogram(&hist, TOP_SCORES),
    };
    serde_json::to_string_pretty(&response).map_err(SimulateError::Parse)
}

fn validate_request(
    request: &SimulateRequest,
    sims: u32,
    shards: usize,
) -> Result<Matchup, SimulateError> {
    let mut errors: Vec<ValidationIssue> = Vec::new();

    if !(1..=MAX_SIMS).contains(&sims) {
        errors.push(ValidationIssue {
            field: "sims",
            messages: vec![format!("must be between 1 and {MAX_SIMS}")],
        });
    }

    if !(1..=MAX_SHARDS).contains(&shards) {
        errors.push(ValidationIssue {
            field: "shards",
            messages: vec![format!("must be between 1 and {MAX_SHARDS}")],
        });
    }

    let away = Lineup::from_sheet(&request.away, "away");
    let home = Lineup::from_sheet(&request.home, "home");
    if let Err(err) = &away {
        errors.push(ValidationIssue {
            field: "away",
            messages: vec![err.to_string()],
        });
    }
    if let Err(err) = &home {
        errors.push(ValidationIssue {
            field: "home",
            messages: vec![err.to_string()],
        });
    }

    let matchup = match (away, home) {
        (Ok(away), Ok(home)) => match Matchup::new(away, home) {
            Ok(matchup) => Some(matchup),
            Err(err) => {
                errors.push(ValidationIssue {
                    field: "matchup",
                    messages: vec![err.to_string()],
                });
                None
            }
        },
        _ => None,
    };

    match matchup {
        Some(matchup) if errors.is_empty() => Ok(matchup),
        _ => Err(SimulateError::Validation(ValidationErrorResponse {
            status: "error",
            message: "Validation failed",
            errors,
        })),
    }
}
