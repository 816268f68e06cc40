//! Predictions for a whole day of games: fetch the schedule, then each game's posted lineups,
//! then simulate. Every game ends in one [GameStatus], rendered as one terminal line.

use chrono::NaiveDate;

use crate::error::{Result, SimError};
use crate::game::{Lineup, TeamSheet};
use crate::histogram::JointHistogram;
use crate::parallel::{run_simulation_batches, WorkerPool};
use crate::simulation::{bold, colored_win_bar, paint, win_bar, Matchup, SimulationSummary, TtyColor};
use crate::statsapi::{fetch_lineups, fetch_schedule, ScheduledGame, StatsSource};

/// Width of the status cell between the two team names; a win bar fills it exactly.
pub const STATUS_WIDTH: usize = 21;
/// Width the away team name is right-aligned to.
pub const AWAY_NAME_WIDTH: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub enum GameStatus {
    Fetching,
    Postponed,
    /// The schedule, boxscore or a player record could not be read.
    FrontendError(String),
    MissingLineups,
    MissingLineupAway,
    MissingLineupHome,
    Predicting,
    /// The posted lineups could not be simulated.
    BackendError(String),
    Prediction { home_win_probability: f64 },
}

impl GameStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetching => "FETCHING DATA...",
            Self::Postponed => "POSTPONED",
            Self::FrontendError(_) => "FRONTEND ERROR",
            Self::MissingLineups => "MISSING LINEUPS",
            Self::MissingLineupAway => "MISSING LINEUP A",
            Self::MissingLineupHome => "MISSING LINEUP H",
            Self::Predicting => "PREDICTING...",
            Self::BackendError(_) => "BACKEND ERROR",
            Self::Prediction { .. } => "PREDICTION",
        }
    }

    /// Colour of the label; a prediction colours its bar instead.
    pub fn color(&self) -> Option<TtyColor> {
        match self {
            Self::Fetching | Self::Predicting => Some(TtyColor::Black),
            Self::Postponed => Some(TtyColor::Blue),
            Self::FrontendError(_) | Self::BackendError(_) => Some(TtyColor::Red),
            Self::MissingLineups | Self::MissingLineupAway | Self::MissingLineupHome => {
                Some(TtyColor::Yellow)
            }
            Self::Prediction { .. } => None,
        }
    }

    /// False for the transient fetching and predicting states.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Fetching | Self::Predicting)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::FrontendError(_) | Self::BackendError(_))
    }

    /// The status cell: a win bar for predictions, otherwise the centred label.
    pub fn render(&self, color: bool) -> String {
        if let Self::Prediction {
            home_win_probability,
        } = self
        {
            return if color {
                colored_win_bar(*home_win_probability)
            } else {
                win_bar(*home_win_probability)
            };
        }
        let cell = format!("{:^width$}", self.label(), width = STATUS_WIDTH);
        match self.color() {
            Some(tint) if color => paint(tint, &bold(&cell)),
            _ => cell,
        }
    }
}

/// `away status home`, with the away name right-aligned.
pub fn render_line(game: &ScheduledGame, status: &GameStatus, color: bool) -> String {
    format!(
        "{:>width$} {} {}",
        game.away_name,
        status.render(color),
        game.home_name,
        width = AWAY_NAME_WIDTH
    )
}

/// Strict `YYYY-MM-DD`; trailing text is rejected.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| SimError::InvalidArgument(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlateSettings {
    pub sims: u64,
    pub seed: u64,
    pub shards: usize,
    pub max_score: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GamePrediction {
    pub game: ScheduledGame,
    pub status: GameStatus,
}

/// Predict every game scheduled on `date`. `on_status` sees each game's transient states and
/// then its final one. Only a schedule failure is an `Err`; per-game failures become statuses.
pub fn predict_slate<S: StatsSource + ?Sized>(
    source: &S,
    date: NaiveDate,
    settings: &SlateSettings,
    pool: &WorkerPool,
    mut on_status: impl FnMut(&ScheduledGame, &GameStatus),
) -> Result<Vec<GamePrediction>> {
    let games = fetch_schedule(source, date)?;
    tracing::info!(%date, games = games.len(), "schedule fetched");

    let mut predictions = Vec::with_capacity(games.len());
    for game in games {
        let status = predict_game(source, &game, settings, pool, |status| on_status(&game, status));
        on_status(&game, &status);
        predictions.push(GamePrediction { game, status });
    }
    Ok(predictions)
}

/// Final status of one game. `progress` sees the transient states.
pub fn predict_game<S: StatsSource + ?Sized>(
    source: &S,
    game: &ScheduledGame,
    settings: &SlateSettings,
    pool: &WorkerPool,
    mut progress: impl FnMut(&GameStatus),
) -> GameStatus {
    if game.is_postponed() {
        return GameStatus::Postponed;
    }

    progress(&GameStatus::Fetching);
    let lineups = match fetch_lineups(source, game.game_pk) {
        Ok(lineups) => lineups,
        Err(err) => {
            tracing::error!(game_pk = game.game_pk, "lineup fetch failed: {err}");
            return GameStatus::FrontendError(err.to_string());
        }
    };
    let (away, home) = match (lineups.away, lineups.home) {
        (None, None) => return GameStatus::MissingLineups,
        (None, Some(_)) => return GameStatus::MissingLineupAway,
        (Some(_), None) => return GameStatus::MissingLineupHome,
        (Some(away), Some(home)) => (away, home),
    };

    progress(&GameStatus::Predicting);
    match simulate_sheets(game, &away, &home, settings, pool) {
        Ok(hist) => GameStatus::Prediction {
            home_win_probability: SimulationSummary::from_histogram(&hist, 0).home_win_probability,
        },
        Err(err) => {
            tracing::error!(game_pk = game.game_pk, "prediction failed: {err}");
            GameStatus::BackendError(err.to_string())
        }
    }
}

fn simulate_sheets(
    game: &ScheduledGame,
    away: &TeamSheet,
    home: &TeamSheet,
    settings: &SlateSettings,
    pool: &WorkerPool,
) -> Result<JointHistogram<'static>> {
    let away = Lineup::from_sheet(away, &game.away_name)?;
    let home = Lineup::from_sheet(home, &game.home_name)?;
    let matchup = Matchup::new(away, home)?;
    run_simulation_batches(
        &matchup,
        settings.sims,
        settings.seed,
        settings.shards,
        settings.max_score,
        pool,
    )
}
