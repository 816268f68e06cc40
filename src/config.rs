//! Runtime configuration: defaults, then an optional JSON file, then `BALLGAME_*` variables.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "ballgame.json";
pub const DEFAULT_MAX_SCORE: usize = 256;
/// Largest accepted histogram bound; the square is 16M cells, 64 MiB of `u32`.
pub const MAX_MAX_SCORE: usize = 4096;
pub const DEFAULT_SIMS: u32 = 10_000;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_STATS_API_URL: &str = "https://statsapi.mlb.com/api/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Games simulated when a command does not say otherwise.
    pub sims: u32,
    /// Fixed seed; `None` seeds each run from OS entropy.
    pub seed: Option<u64>,
    /// Independent random streams per run. 1 keeps the single-stream sequential path.
    pub shards: usize,
    /// Rayon worker threads; 0 uses the global pool.
    pub workers: usize,
    pub bind_addr: String,
    /// Histogram bound per axis; scores at or beyond it land in the last row/column.
    pub max_score: usize,
    /// Base URL of the stats API that `predict --date` reads schedules and lineups from.
    pub stats_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sims: DEFAULT_SIMS,
            seed: None,
            shards: 1,
            workers: 0,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_score: DEFAULT_MAX_SCORE,
            stats_api_url: DEFAULT_STATS_API_URL.to_string(),
        }
    }
}

impl Config {
    /// File named by `BALLGAME_CONFIG` (or [DEFAULT_CONFIG_PATH]) with environment overrides.
    pub fn from_env() -> Self {
        let path = env::var("BALLGAME_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        load_config(&path).with_overrides(|key| env::var(key).ok())
    }

    /// Apply `BALLGAME_SIMS`, `_SEED`, `_SHARDS`, `_WORKERS`, `_BIND`, `_MAX_SCORE` and
    /// `_STATS_API` from `lookup`.
    /// Unparseable values are logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(sims) = parse_var(&lookup, "BALLGAME_SIMS") {
            self.sims = sims;
        }
        if let Some(seed) = parse_var(&lookup, "BALLGAME_SEED") {
            self.seed = Some(seed);
        }
        if let Some(shards) = parse_var(&lookup, "BALLGAME_SHARDS") {
            self.shards = shards;
        }
        if let Some(workers) = parse_var(&lookup, "BALLGAME_WORKERS") {
            self.workers = workers;
        }
        if let Some(bind) = lookup("BALLGAME_BIND") {
            self.bind_addr = bind;
        }
        if let Some(url) = lookup("BALLGAME_STATS_API") {
            self.stats_api_url = url;
        }
        if let Some(max_score) = parse_var::<usize>(&lookup, "BALLGAME_MAX_SCORE") {
            if max_score == 0 || max_score > MAX_MAX_SCORE {
                tracing::warn!(
                    "BALLGAME_MAX_SCORE must be between 1 and {MAX_MAX_SCORE}, keeping {}",
                    self.max_score
                );
            } else {
                self.max_score = max_score;
            }
        }
        self.max_score = checked_max_score(self.max_score);
        self
    }
}

/// A bound from the config file is checked the same way as the variable.
fn checked_max_score(max_score: usize) -> usize {
    if (1..=MAX_MAX_SCORE).contains(&max_score) {
        max_score
    } else {
        tracing::warn!(
            "max_score {max_score} is outside 1..={MAX_MAX_SCORE}, using {DEFAULT_MAX_SCORE}"
        );
        DEFAULT_MAX_SCORE
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring {key}='{raw}': not a valid value");
            None
        }
    }
}

/// Load a JSON config. Missing file gives defaults; an unreadable or invalid one is logged and
/// also gives defaults.
pub fn load_config(path: &str) -> Config {
    let path = Path::new(path);
    if !path.exists() {
        return Config::default();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!("unable to read config '{}': {err}", path.display());
            return Config::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("invalid config '{}': {err}", path.display());
            Config::default()
        }
    }
}

static MAX_SCORE: OnceLock<usize> = OnceLock::new();

/// Process-wide histogram bound, read once from the configuration.
pub fn max_score() -> usize {
    *MAX_SCORE.get_or_init(|| Config::from_env().max_score)
}

/// Cells in a full histogram buffer: `max_score()` squared.
pub fn buffer_size() -> usize {
    let n = max_score();
    n * n
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = Config::default().with_overrides(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.max_score, 256);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn env_overrides_apply() {
        let config = Config::default().with_overrides(lookup(&[
            ("BALLGAME_SIMS", "500"),
            ("BALLGAME_SEED", "42"),
            ("BALLGAME_SHARDS", "4"),
            ("BALLGAME_BIND", "0.0.0.0:8080"),
            ("BALLGAME_MAX_SCORE", "64"),
            ("BALLGAME_STATS_API", "http://127.0.0.1:9000/api/"),
        ]));
        assert_eq!(config.sims, 500);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.shards, 4);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.max_score, 64);
        assert_eq!(config.stats_api_url, "http://127.0.0.1:9000/api/");
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let config = Config::default().with_overrides(lookup(&[
            ("BALLGAME_SIMS", "lots"),
            ("BALLGAME_MAX_SCORE", "0"),
        ]));
        assert_eq!(config.sims, DEFAULT_SIMS);
        assert_eq!(config.max_score, DEFAULT_MAX_SCORE);
    }

    #[test]
    fn oversized_max_score_is_ignored() {
        let config =
            Config::default().with_overrides(lookup(&[("BALLGAME_MAX_SCORE", "100000000")]));
        assert_eq!(config.max_score, DEFAULT_MAX_SCORE);

        let largest = MAX_MAX_SCORE.to_string();
        let config =
            Config::default().with_overrides(lookup(&[("BALLGAME_MAX_SCORE", largest.as_str())]));
        assert_eq!(config.max_score, MAX_MAX_SCORE);
    }

    #[test]
    fn oversized_max_score_from_file_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ballgame.json");
        fs::write(&path, r#"{"max_score": 1000000}"#).expect("write config");

        let config = load_config(path.to_str().expect("utf-8 path")).with_overrides(lookup(&[]));
        assert_eq!(config.max_score, DEFAULT_MAX_SCORE);
    }

    #[test]
    fn config_file_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ballgame.json");
        fs::write(&path, r#"{"sims": 123, "seed": 9}"#).expect("write config");

        let config = load_config(path.to_str().expect("utf-8 path"));
        assert_eq!(config.sims, 123);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_score, DEFAULT_MAX_SCORE);
    }

    #[test]
    fn missing_or_broken_config_gives_defaults() {
        assert_eq!(load_config("does/not/exist.json"), Config::default());

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").expect("write config");
        assert_eq!(load_config(path.to_str().expect("utf-8 path")), Config::default());
    }
}
