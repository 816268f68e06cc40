use serde_json::Value;

use super::{json_count, json_id, ApiRequest, StatGroup, StatsSource};
use crate::error::Result;
use crate::game::{BatterStats, PitcherStats, TeamSheet};

/// Posted lineups of one game. A side is `None` until its starting pitcher is announced.
#[derive(Debug, Clone, PartialEq)]
pub struct GameLineups {
    pub away: Option<TeamSheet>,
    pub home: Option<TeamSheet>,
}

/// Read the boxscore of `game_pk`, then the career line of each starting pitcher and of every
/// batter in the batting order.
pub fn fetch_lineups<S: StatsSource + ?Sized>(source: &S, game_pk: u64) -> Result<GameLineups> {
    let request = ApiRequest::game_feed(game_pk);
    let feed = source.get_json(&request)?;
    Ok(GameLineups {
        away: side_lineup(source, &feed, &request, "away")?,
        home: side_lineup(source, &feed, &request, "home")?,
    })
}

fn side_lineup<S: StatsSource + ?Sized>(
    source: &S,
    feed: &Value,
    request: &ApiRequest,
    side: &str,
) -> Result<Option<TeamSheet>> {
    let team = &feed["liveData"]["boxscore"]["teams"][side];
    let Some(pitcher_id) = json_id(&team["pitchers"][0]) else {
        return Ok(None);
    };
    let order = team["battingOrder"]
        .as_array()
        .ok_or_else(|| request.error(format!("{side} boxscore has no batting order")))?;

    let pitcher = {
        let player = ApiRequest::player(pitcher_id, StatGroup::Pitching);
        pitcher_from_person(&source.get_json(&player)?, &player)?
    };
    let batters = order
        .iter()
        .map(|id| {
            let id = json_id(id)
                .ok_or_else(|| request.error(format!("{side} batting order holds a non-id: {id}")))?;
            let player = ApiRequest::player(id, StatGroup::Hitting);
            batter_from_person(&source.get_json(&player)?, &player)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(side, pitcher_id, batters = batters.len(), "lineup fetched");
    Ok(Some(TeamSheet { pitcher, batters }))
}

fn career_line<'v>(data: &'v Value, request: &ApiRequest) -> Result<&'v Value> {
    let stat = &data["people"][0]["stats"][0]["splits"][0]["stat"];
    if stat.is_object() {
        Ok(stat)
    } else {
        Err(request.error("no career statistics"))
    }
}

fn field(stat: &Value, name: &str, request: &ApiRequest) -> Result<f64> {
    json_count(&stat[name]).ok_or_else(|| request.error(format!("missing or non-numeric '{name}'")))
}

/// Pitcher totals map directly: hits, walks, strikeouts, batters faced.
pub fn pitcher_from_person(data: &Value, request: &ApiRequest) -> Result<PitcherStats> {
    let stat = career_line(data, request)?;
    Ok(PitcherStats::from_fields([
        field(stat, "hits", request)?,
        field(stat, "baseOnBalls", request)?,
        field(stat, "strikeOuts", request)?,
        field(stat, "battersFaced", request)?,
    ]))
}

/// At-bats are plate appearances less walks; the average is hits over those at-bats.
pub fn batter_from_person(data: &Value, request: &ApiRequest) -> Result<BatterStats> {
    let stat = career_line(data, request)?;
    let plate_appearances = field(stat, "plateAppearances", request)?;
    let walks = field(stat, "baseOnBalls", request)?;
    let hits = field(stat, "hits", request)?;
    let at_bats = plate_appearances - walks;
    let average = if at_bats > 0.0 { hits / at_bats } else { 0.0 };
    Ok(BatterStats::from_fields([
        at_bats,
        hits,
        field(stat, "doubles", request)?,
        field(stat, "triples", request)?,
        field(stat, "homeRuns", request)?,
        field(stat, "strikeOuts", request)?,
        average,
    ]))
}
