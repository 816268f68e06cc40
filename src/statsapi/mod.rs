//! Read-only client for the MLB stats API: schedules by date and starting lineups with career
//! statistics, turned into [TeamSheet](crate::game::TeamSheet)s.

pub mod lineups;
pub mod schedule;

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Result, SimError};

pub use lineups::{batter_from_person, fetch_lineups, pitcher_from_person, GameLineups};
pub use schedule::{fetch_schedule, parse_schedule, ScheduledGame};

/// Fields requested from the live game feed; enough for the boxscore lineups.
const FEED_FIELDS: &str = "gameData,liveData,boxscore,teams,players,id,abbreviation";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatGroup {
    Hitting,
    Pitching,
}

impl StatGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hitting => "hitting",
            Self::Pitching => "pitching",
        }
    }
}

/// One GET against the API: a path relative to the base URL plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn schedule(date: NaiveDate) -> Self {
        Self {
            path: "v1/schedule".to_string(),
            params: vec![
                ("sportId", "1".to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
            ],
        }
    }

    pub fn game_feed(game_pk: u64) -> Self {
        Self {
            path: format!("v1.1/game/{game_pk}/feed/live"),
            params: vec![("fields", FEED_FIELDS.to_string())],
        }
    }

    /// Career statistics of one player in `group`.
    pub fn player(player_id: u64, group: StatGroup) -> Self {
        Self {
            path: format!("v1/people/{player_id}"),
            params: vec![(
                "hydrate",
                format!("stats(group={},type=career,sportId=1),currentTeam", group.as_str()),
            )],
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    fn error(&self, reason: impl Into<String>) -> SimError {
        SimError::StatsApi {
            request: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Anything that answers API requests with JSON documents.
pub trait StatsSource {
    fn get_json(&self, request: &ApiRequest) -> Result<Value>;
}

/// Blocking HTTP client against a live API.
pub struct HttpStatsSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpStatsSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ballgame/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SimError::StatsApi {
                request: base_url.clone(),
                reason: format!("unable to build HTTP client: {err}"),
            })?;
        Ok(Self { client, base_url })
    }
}

impl StatsSource for HttpStatsSource {
    fn get_json(&self, request: &ApiRequest) -> Result<Value> {
        let url = request.url(&self.base_url);
        tracing::debug!(%url, "stats api request");

        let response = self.client.get(&url).send().map_err(|err| {
            let reason = if err.is_timeout() {
                format!("request timed out: {url}")
            } else if err.is_connect() {
                format!("failed to connect: {url}")
            } else {
                format!("HTTP request failed: {err}")
            };
            request.error(reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(request.error(format!("HTTP {status}")));
        }
        response
            .json::<Value>()
            .map_err(|err| request.error(format!("invalid JSON: {err}")))
    }
}

/// Integer id from a JSON number or numeric string.
pub(crate) fn json_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Counting stat from a JSON number or numeric string.
pub(crate) fn json_count(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn schedule_url_carries_sport_and_date() {
        let request = ApiRequest::schedule(date("2024-04-02"));
        assert_eq!(
            request.url("https://statsapi.mlb.com/api/"),
            "https://statsapi.mlb.com/api/v1/schedule?sportId=1&date=2024-04-02"
        );
    }

    #[test]
    fn player_url_hydrates_career_stats_for_the_group() {
        let request = ApiRequest::player(592450, StatGroup::Pitching);
        assert_eq!(request.path(), "v1/people/592450");
        assert_eq!(
            request.to_string(),
            "v1/people/592450?hydrate=stats(group=pitching,type=career,sportId=1),currentTeam"
        );
    }

    #[test]
    fn game_feed_path_names_the_game() {
        let request = ApiRequest::game_feed(745001);
        assert_eq!(request.path(), "v1.1/game/745001/feed/live");
        assert!(request.url("http://localhost:8080/api").starts_with("http://localhost:8080/api/v1.1/"));
    }

    #[test]
    fn ids_and_counts_accept_numbers_and_strings() {
        assert_eq!(json_id(&serde_json::json!(660271)), Some(660271));
        assert_eq!(json_id(&serde_json::json!("660271")), Some(660271));
        assert_eq!(json_id(&Value::Null), None);
        assert_eq!(json_count(&serde_json::json!("42")), Some(42.0));
        assert_eq!(json_count(&serde_json::json!(7)), Some(7.0));
        assert_eq!(json_count(&serde_json::json!(".281")), Some(0.281));
    }
}
