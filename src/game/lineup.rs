//! Team lineups: one pitcher and nine batters served in fixed cyclic order.
//!
//! Team files hold a pitcher line `H BB SO BF` followed by nine batter lines
//! `AB H 2B 3B HR SO BA`. Fields are whitespace-delimited; line breaks are not significant
//! and `#` starts a comment.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::game::stats::{BatterStats, PitcherStats};

pub const LINEUP_SIZE: usize = 9;

/// Serializable team description, as accepted by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub pitcher: PitcherStats,
    pub batters: Vec<BatterStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lineup {
    pitcher: PitcherStats,
    batters: [BatterStats; LINEUP_SIZE],
    cursor: usize,
}

impl Lineup {
    /// Build a lineup from validated stat lines. The rotation starts at the leadoff batter.
    pub fn new(pitcher: PitcherStats, batters: [BatterStats; LINEUP_SIZE], context: &str) -> Result<Self> {
        pitcher.validate(&format!("{context}: pitcher"))?;
        for (i, batter) in batters.iter().enumerate() {
            batter.validate(&format!("{context}: batter {}", i + 1))?;
        }
        Ok(Self {
            pitcher,
            batters,
            cursor: 0,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// Parse team-file text. `context` names the source in error messages.
    pub fn parse(input: &str, context: &str) -> Result<Self> {
        let mut values = Vec::with_capacity(PitcherStats::FIELDS + LINEUP_SIZE * BatterStats::FIELDS);
        for (line_no, line) in input.lines().enumerate() {
            let content = line.split('#').next().unwrap_or("");
            for token in content.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| SimError::Parse {
                    context: format!("{context}:{}", line_no + 1),
                    token: token.to_string(),
                })?;
                values.push(value);
            }
        }

        let needed = PitcherStats::FIELDS + LINEUP_SIZE * BatterStats::FIELDS;
        if values.len() < needed {
            let batters = values.len().saturating_sub(PitcherStats::FIELDS) / BatterStats::FIELDS;
            return Err(SimError::ShortLineup {
                context: context.to_string(),
                batters: batters.min(LINEUP_SIZE - 1),
            });
        }
        if values.len() > needed {
            tracing::warn!(
                "{context}: ignoring {} trailing value(s) after the ninth batter",
                values.len() - needed
            );
        }

        let mut fields = values.iter().copied();
        let pitcher = PitcherStats::from_fields(take_fields(&mut fields));
        let batters: [BatterStats; LINEUP_SIZE] =
            std::array::from_fn(|_| BatterStats::from_fields(take_fields(&mut fields)));
        Self::new(pitcher, batters, context)
    }

    pub fn from_sheet(sheet: &TeamSheet, context: &str) -> Result<Self> {
        if sheet.batters.len() < LINEUP_SIZE {
            return Err(SimError::ShortLineup {
                context: context.to_string(),
                batters: sheet.batters.len(),
            });
        }
        if sheet.batters.len() > LINEUP_SIZE {
            return Err(SimError::InvalidStats {
                context: context.to_string(),
                reason: format!("lineup lists {} batters, expected {LINEUP_SIZE}", sheet.batters.len()),
            });
        }
        let batters: [BatterStats; LINEUP_SIZE] = std::array::from_fn(|i| sheet.batters[i]);
        Self::new(sheet.pitcher, batters, context)
    }

    pub fn to_sheet(&self) -> TeamSheet {
        TeamSheet {
            pitcher: self.pitcher,
            batters: self.batters.to_vec(),
        }
    }

    /// The team's only pitcher; no bullpen is modeled.
    pub fn current_pitcher(&self) -> &PitcherStats {
        &self.pitcher
    }

    /// Batter due up; advances the rotation. Call exactly once per at-bat.
    pub fn next_batter(&mut self) -> &BatterStats {
        let idx = self.cursor;
        self.cursor = (self.cursor + 1) % LINEUP_SIZE;
        &self.batters[idx]
    }

    /// Index of the batter due up next.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reset_rotation(&mut self) {
        self.cursor = 0;
    }

    pub fn batters(&self) -> &[BatterStats; LINEUP_SIZE] {
        &self.batters
    }
}

fn take_fields<const N: usize>(fields: &mut impl Iterator<Item = f64>) -> [f64; N] {
    std::array::from_fn(|_| fields.next().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM: &str = "\
# pitcher: H BB SO BF
180 55 190 820
# batters: AB H 2B 3B HR SO BA
550 150 30 2 25 120 0.273
560 160 35 3 20 100 0.286
520 140 28 1 30 140 0.269
540 150 32 4 18 110 0.278
500 130 25 2 15 120 0.260
480 120 22 1 12 100 0.250
470 115 20 3 10 95 0.245
450 105 18 1 8 90 0.233
430 100 15 2 5 85 0.233
";

    #[test]
    fn parses_pitcher_and_nine_batters() {
        let lineup = Lineup::parse(TEAM, "team").expect("valid team");
        assert_eq!(lineup.current_pitcher().batters_faced, 820.0);
        assert_eq!(lineup.batters()[0].home_runs, 25.0);
        assert_eq!(lineup.batters()[8].batting_average, 0.233);
    }

    #[test]
    fn rotation_wraps_after_nine_batters() {
        let mut lineup = Lineup::parse(TEAM, "team").expect("valid team");
        let first = *lineup.next_batter();
        for _ in 1..LINEUP_SIZE {
            lineup.next_batter();
        }
        assert_eq!(lineup.cursor(), 0);
        assert_eq!(*lineup.next_batter(), first);
        assert_eq!(lineup.cursor(), 1);
    }

    #[test]
    fn reset_rotation_returns_to_leadoff() {
        let mut lineup = Lineup::parse(TEAM, "team").expect("valid team");
        lineup.next_batter();
        lineup.next_batter();
        lineup.reset_rotation();
        assert_eq!(lineup.cursor(), 0);
    }

    #[test]
    fn short_file_is_rejected() {
        let truncated: String = TEAM.lines().take(8).collect::<Vec<_>>().join("\n");
        let err = Lineup::parse(&truncated, "short").expect_err("short team");
        assert!(matches!(err, SimError::ShortLineup { batters: 5, .. }), "{err}");
    }

    #[test]
    fn bad_token_reports_line() {
        let broken = TEAM.replace("0.286", "abc");
        let err = Lineup::parse(&broken, "team").expect_err("bad token");
        match err {
            SimError::Parse { context, token } => {
                assert_eq!(context, "team:5");
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn line_breaks_are_not_significant() {
        let flat = TEAM
            .lines()
            .filter(|l| !l.starts_with('#'))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(
            Lineup::parse(&flat, "flat").expect("flat team"),
            Lineup::parse(TEAM, "team").expect("team")
        );
    }

    #[test]
    fn sheet_round_trip_and_size_check() {
        let lineup = Lineup::parse(TEAM, "team").expect("valid team");
        let sheet = lineup.to_sheet();
        assert_eq!(Lineup::from_sheet(&sheet, "sheet").expect("sheet"), lineup);

        let mut short = sheet.clone();
        short.batters.truncate(8);
        assert!(matches!(
            Lineup::from_sheet(&short, "sheet"),
            Err(SimError::ShortLineup { batters: 8, .. })
        ));

        let mut long = sheet;
        long.batters.push(long.batters[0]);
        assert!(matches!(
            Lineup::from_sheet(&long, "sheet"),
            Err(SimError::InvalidStats { .. })
        ));
    }
}
