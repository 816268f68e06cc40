use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::{json_id, ApiRequest, StatsSource};
use crate::error::Result;

/// One game on the day's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledGame {
    pub game_pk: u64,
    pub away_name: String,
    pub home_name: String,
    /// API status text, e.g. "Scheduled", "In Progress", "Postponed".
    pub detailed_state: String,
}

impl ScheduledGame {
    pub fn is_postponed(&self) -> bool {
        self.detailed_state == "Postponed"
    }
}

pub fn fetch_schedule<S: StatsSource + ?Sized>(source: &S, date: NaiveDate) -> Result<Vec<ScheduledGame>> {
    let request = ApiRequest::schedule(date);
    let data = source.get_json(&request)?;
    parse_schedule(&data, &request)
}

/// Games listed for the single date in a schedule response. No dates means no games; more than
/// one date is ambiguous and rejected.
pub fn parse_schedule(data: &Value, request: &ApiRequest) -> Result<Vec<ScheduledGame>> {
    let dates = data["dates"]
        .as_array()
        .ok_or_else(|| request.error("response has no 'dates' list"))?;
    match dates.len() {
        0 => {
            tracing::warn!("no games found for {request}");
            return Ok(Vec::new());
        }
        1 => {}
        n => return Err(request.error(format!("ambiguous schedule: {n} dates returned"))),
    }

    let Some(games) = dates[0]["games"].as_array() else {
        return Ok(Vec::new());
    };
    games
        .iter()
        .enumerate()
        .map(|(i, game)| {
            let name = |side: &str| {
                game["teams"][side]["team"]["name"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| request.error(format!("game {i} has no {side} team name")))
            };
            Ok(ScheduledGame {
                game_pk: json_id(&game["gamePk"])
                    .ok_or_else(|| request.error(format!("game {i} has no gamePk")))?,
                away_name: name("away")?,
                home_name: name("home")?,
                detailed_state: game["status"]["detailedState"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}
