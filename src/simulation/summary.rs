//! Statistics derived from a joint score histogram.

use serde::Serialize;

use crate::game::Score;
use crate::histogram::JointHistogram;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFrequency {
    pub away: usize,
    pub home: usize,
    pub games: u32,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub games: u64,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub mean_away_runs: f64,
    pub mean_home_runs: f64,
    /// Mode of each marginal taken separately, as reported by the command line.
    pub most_probable_score: Score,
    /// Most frequent joint scores, most frequent first.
    pub top_scores: Vec<ScoreFrequency>,
}

impl SimulationSummary {
    pub fn from_histogram(hist: &JointHistogram<'_>, top_n: usize) -> Self {
        let games = hist.total();
        let denom = games.max(1) as f64;

        let mut home_wins = 0u64;
        let mut away_wins = 0u64;
        for (away, home, count) in hist.iter_nonzero() {
            if home > away {
                home_wins += u64::from(count);
            } else if away > home {
                away_wins += u64::from(count);
            }
        }

        let away_marginal = hist.away_marginal();
        let home_marginal = hist.home_marginal();

        let mut top: Vec<(usize, usize, u32)> = hist.iter_nonzero().collect();
        top.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));
        top.truncate(top_n);

        Self {
            games,
            home_win_probability: home_wins as f64 / denom,
            away_win_probability: away_wins as f64 / denom,
            mean_away_runs: weighted_mean(&away_marginal) / denom,
            mean_home_runs: weighted_mean(&home_marginal) / denom,
            most_probable_score: Score::new(mode(&away_marginal), mode(&home_marginal)),
            top_scores: top
                .into_iter()
                .map(|(away, home, games)| ScoreFrequency {
                    away,
                    home,
                    games,
                    probability: f64::from(games) / denom,
                })
                .collect(),
        }
    }
}

/// Boxes per side in [win_bar].
pub const WIN_BAR_BOXES: usize = 10;

/// ANSI foreground colours used by terminal output. The discriminant is the SGR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtyColor {
    Black = 30,
    Red = 31,
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Cyan = 36,
    White = 37,
}

impl TtyColor {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Colour for a side's win probability: strong favourite cyan, favourite green, toss-up yellow,
/// underdog red, long shot white.
pub fn colormap(win_probability: f64) -> TtyColor {
    if win_probability >= 0.75 {
        TtyColor::Cyan
    } else if win_probability >= 0.55 {
        TtyColor::Green
    } else if win_probability >= 0.45 {
        TtyColor::Yellow
    } else if win_probability >= 0.25 {
        TtyColor::Red
    } else {
        TtyColor::White
    }
}

pub fn paint(color: TtyColor, text: &str) -> String {
    format!("\x1B[{}m{text}\x1B[0m", color.code())
}

pub fn bold(text: &str) -> String {
    format!("\x1B[1m{text}\x1B[0m")
}

/// Two-sided bar: away filled boxes growing leftward to the centre, a space, home filled boxes
/// growing rightward from it. Each side shows its win probability rounded to tenths.
pub fn win_bar(home_win_probability: f64) -> String {
    render_win_bar(home_win_probability, false)
}

/// [win_bar] with each side's filled boxes tinted by [colormap] of that side's probability.
pub fn colored_win_bar(home_win_probability: f64) -> String {
    render_win_bar(home_win_probability, true)
}

fn render_win_bar(home_win_probability: f64, color: bool) -> String {
    let hwp = home_win_probability.clamp(0.0, 1.0);
    let awp = 1.0 - hwp;
    let filled = |p: f64| ((p * WIN_BAR_BOXES as f64).round() as usize).min(WIN_BAR_BOXES);
    let tint = |p: f64, boxes: String| if color { paint(colormap(p), &boxes) } else { boxes };
    let away = filled(awp);
    let home = filled(hwp);

    let mut bar = String::with_capacity(4 * (2 * WIN_BAR_BOXES + 1));
    bar.push_str(&"□".repeat(WIN_BAR_BOXES - away));
    bar.push_str(&tint(awp, "■".repeat(away)));
    bar.push(' ');
    bar.push_str(&tint(hwp, "■".repeat(home)));
    bar.push_str(&"□".repeat(WIN_BAR_BOXES - home));
    bar
}

fn weighted_mean(marginal: &[u64]) -> f64 {
    marginal
        .iter()
        .enumerate()
        .map(|(runs, &n)| runs as f64 * n as f64)
        .sum()
}

/// Lowest score with the highest count.
fn mode(marginal: &[u64]) -> u32 {
    let mut best = 0usize;
    for (runs, &n) in marginal.iter().enumerate() {
        if n > marginal[best] {
            best = runs;
        }
    }
    best as u32
}
