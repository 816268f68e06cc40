use std::io::{self, IsTerminal, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::{self, Config};
use crate::error::Result;
use crate::export_csv::export_histogram_csv;
use crate::game::{entropy_seed, Lineup};
use crate::histogram::JointHistogram;
use crate::parallel::{run_simulation_batches, WorkerPool};
use crate::server;
use crate::simulation::{colored_win_bar, win_bar, Matchup, SimulationSummary};
use crate::slate::{parse_date, predict_slate, render_line, today, SlateSettings};
use crate::statsapi::{HttpStatsSource, DEFAULT_TIMEOUT};

const USAGE: &str = "usage: ballgame <simulate|predict|validate|serve>";
const SIMULATE_USAGE: &str = "usage: ballgame simulate <away> <home> [sims] [seed] [--table] [--csv <path>] [--workers <n>]";
const PREDICT_USAGE: &str =
    "usage: ballgame predict <away> <home> [sims]\n       ballgame predict --date [YYYY-MM-DD] [sims]";
const VALIDATE_USAGE: &str = "usage: ballgame validate <team-file>...";
const TOP_SCORES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Predict,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("predict") => Some(Command::Predict),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = Config::from_env();
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(&config),
        Some(Command::Simulate) => handle_simulate(args, &config),
        Some(Command::Predict) => handle_predict(args, &config),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_serve(config: &Config) -> i32 {
    match server::run_server(&config.bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// Options after the subcommand: positionals in order, plus the flags `simulate` accepts.
#[derive(Debug, Default, PartialEq, Eq)]
struct SimulateOptions {
    positional: Vec<String>,
    table: bool,
    csv: Option<String>,
    workers: Option<String>,
}

fn parse_options(args: &[String]) -> std::result::Result<SimulateOptions, String> {
    let mut options = SimulateOptions::default();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--table" => options.table = true,
            "--csv" => {
                options.csv = Some(rest.next().ok_or("--csv needs a path")?.clone());
            }
            "--workers" => {
                options.workers = Some(rest.next().ok_or("--workers needs a count")?.clone());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

#[derive(Debug, Serialize)]
struct SimulateReport<'a> {
    away: &'a str,
    home: &'a str,
    sims: u32,
    seed: u64,
    shards: usize,
    max_score: usize,
    summary: SimulationSummary,
}

fn handle_simulate(args: &[String], config: &Config) -> i32 {
    let options = match parse_options(args) {
        Ok(options) if options.positional.len() >= 2 => options,
        Ok(_) => {
            eprintln!("{SIMULATE_USAGE}");
            return 2;
        }
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("{SIMULATE_USAGE}");
            return 2;
        }
    };
    let away = options.positional[0].as_str();
    let home = options.positional[1].as_str();
    let sims = parse_u32_arg(options.positional.get(2), "sims", config.sims);
    if sims == 0 {
        eprintln!("sims must be at least 1");
        return 2;
    }
    let seed = parse_u64_arg(
        options.positional.get(3),
        "seed",
        config.seed.unwrap_or_else(entropy_seed),
    );
    let workers = options
        .workers
        .as_ref()
        .map(|raw| parse_u32_arg(Some(raw), "workers", config.workers as u32) as usize)
        .unwrap_or(config.workers);

    let hist = match simulate_files(away, home, sims, seed, config.shards, workers) {
        Ok(hist) => hist,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    if let Some(path) = &options.csv {
        if let Err(err) = export_histogram_csv(&hist, path) {
            eprintln!("error: {err}");
            return 1;
        }
    }

    let summary = SimulationSummary::from_histogram(&hist, TOP_SCORES);
    if options.table {
        println!("games\tseed\thome_win\taway_win\tmean_away\tmean_home\tmost_probable");
        println!(
            "{}\t{}\t{:.6}\t{:.6}\t{:.3}\t{:.3}\t{}-{}",
            summary.games,
            seed,
            summary.home_win_probability,
            summary.away_win_probability,
            summary.mean_away_runs,
            summary.mean_home_runs,
            summary.most_probable_score.away,
            summary.most_probable_score.home
        );
        return 0;
    }

    let report = SimulateReport {
        away,
        home,
        sims,
        seed,
        shards: config.shards.max(1),
        max_score: hist.max_score(),
        summary,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize simulation result: {err}");
            1
        }
    }
}

fn handle_predict(args: &[String], config: &Config) -> i32 {
    if args.get(2).map(String::as_str) == Some("--date") {
        return handle_predict_date(args, config);
    }
    let (Some(away), Some(home)) = (args.get(2), args.get(3)) else {
        eprintln!("{PREDICT_USAGE}");
        return 2;
    };
    let sims = parse_u32_arg(args.get(4), "sims", config.sims);
    if sims == 0 {
        eprintln!("sims must be at least 1");
        return 2;
    }
    let seed = config.seed.unwrap_or_else(entropy_seed);

    match simulate_files(away, home, sims, seed, config.shards, config.workers) {
        Ok(hist) => {
            let summary = SimulationSummary::from_histogram(&hist, 0);
            let bar = if use_color() {
                colored_win_bar(summary.home_win_probability)
            } else {
                win_bar(summary.home_win_probability)
            };
            println!("{:.3} {bar}", summary.home_win_probability);
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

/// `predict --date [YYYY-MM-DD] [sims]`: one status line per scheduled game.
fn handle_predict_date(args: &[String], config: &Config) -> i32 {
    let mut rest = args.iter().skip(3).peekable();
    let date = match rest.peek().filter(|raw| raw.contains('-')).map(|raw| parse_date(raw)) {
        Some(Ok(date)) => {
            rest.next();
            date
        }
        Some(Err(err)) => {
            eprintln!("{err}");
            eprintln!("{PREDICT_USAGE}");
            return 2;
        }
        None => today(),
    };
    let sims = parse_u32_arg(rest.next(), "sims", config.sims);
    if sims == 0 {
        eprintln!("sims must be at least 1");
        return 2;
    }

    let source = match HttpStatsSource::new(config.stats_api_url.as_str(), DEFAULT_TIMEOUT) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };
    let settings = SlateSettings {
        sims: u64::from(sims),
        seed: config.seed.unwrap_or_else(entropy_seed),
        shards: config.shards,
        max_score: config::max_score(),
    };
    let pool = WorkerPool::with_workers(config.workers);
    let color = use_color();

    let result = predict_slate(&source, date, &settings, &pool, |game, status| {
        let line = render_line(game, status, color);
        let mut stdout = io::stdout().lock();
        // Transient states are redrawn in place on a terminal and skipped otherwise.
        let written = match (status.is_final(), color) {
            (true, true) => writeln!(stdout, "\x1B[2K\r{line}"),
            (true, false) => writeln!(stdout, "{line}"),
            (false, true) => write!(stdout, "\x1B[2K\r{line}").and_then(|()| stdout.flush()),
            (false, false) => Ok(()),
        };
        if let Err(err) = written {
            tracing::warn!("unable to write status line: {err}");
        }
    });

    match result {
        Ok(predictions) if predictions.is_empty() => {
            eprintln!("no games scheduled on {date}");
            0
        }
        Ok(predictions) => {
            let failures = predictions.iter().filter(|p| p.status.is_error()).count();
            if failures > 0 {
                eprintln!("{failures} game(s) could not be predicted");
                1
            } else {
                0
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn use_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn handle_validate(args: &[String]) -> i32 {
    let paths = &args[args.len().min(2)..];
    if paths.is_empty() {
        eprintln!("{VALIDATE_USAGE}");
        return 2;
    }

    let mut failures = 0;
    for path in paths {
        match Lineup::from_path(path) {
            Ok(_) => println!("validation passed: {path}"),
            Err(err) => {
                failures += 1;
                eprintln!("- {err}");
            }
        }
    }
    if failures > 0 {
        eprintln!("validation failed: {failures} file(s)");
        1
    } else {
        0
    }
}

fn simulate_files(
    away: impl AsRef<Path>,
    home: impl AsRef<Path>,
    sims: u32,
    seed: u64,
    shards: usize,
    workers: usize,
) -> Result<JointHistogram<'static>> {
    let matchup = Matchup::from_paths(away, home)?;
    let pool = WorkerPool::with_workers(workers);
    run_simulation_batches(&matchup, u64::from(sims), seed, shards, config::max_score(), &pool)
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
