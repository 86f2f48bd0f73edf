//! Ranking of curves by a scalar score

use std::cmp::Ordering;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};
use tracing::debug;

use tsc_core::{Direction, Result, TscError};

use crate::stats::{describe, Curve};

/// How a curve is reduced to a single score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Mean over every point
    #[default]
    Mean,
    /// Mean over the last fraction of points
    Tail,
    /// Best point in the metric's direction
    Best,
    /// Last point
    Final,
    /// Trapezoidal area under the curve
    Auc,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Mean => "mean",
            Criterion::Tail => "tail",
            Criterion::Best => "best",
            Criterion::Final => "final",
            Criterion::Auc => "auc",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = TscError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Criterion::Mean),
            "tail" => Ok(Criterion::Tail),
            "best" => Ok(Criterion::Best),
            "final" | "last" => Ok(Criterion::Final),
            "auc" => Ok(Criterion::Auc),
            other => Err(TscError::Config(format!("unknown ranking criterion: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    pub criterion: Criterion,
    /// Overrides the direction recorded with the metric
    pub direction: Option<Direction>,
    /// Share of trailing points used by [`Criterion::Tail`]
    pub tail_fraction: f64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            criterion: Criterion::Mean,
            direction: None,
            tail_fraction: 0.1,
        }
    }
}

/// One ranked curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub rank: usize,
    pub label: String,
    pub score: f64,
    pub mean: f64,
    pub tail: f64,
    pub best: f64,
    pub last: f64,
    pub points: usize,
}

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Series")]
    label: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Tail")]
    tail: String,
    #[tabled(rename = "Best")]
    best: String,
    #[tabled(rename = "Final")]
    last: String,
    #[tabled(rename = "Points")]
    points: usize,
}

impl From<&RankEntry> for RankRow {
    fn from(entry: &RankEntry) -> Self {
        Self {
            rank: entry.rank,
            label: entry.label.clone(),
            score: format_value(entry.score),
            mean: format_value(entry.mean),
            tail: format_value(entry.tail),
            best: format_value(entry.best),
            last: format_value(entry.last),
            points: entry.points,
        }
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{value:.3}")
    }
}

/// Ranked curves plus the settings that produced them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingTable {
    pub metric: String,
    pub criterion: Criterion,
    pub direction: Direction,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<RankEntry>,
}

impl RankingTable {
    /// ASCII table for terminal output
    pub fn render(&self) -> String {
        let title = format!(
            "{} by {} ({})",
            self.metric, self.criterion, self.direction
        );
        let rows: Vec<RankRow> = self.entries.iter().map(RankRow::from).collect();
        format!(
            "{}\n{}\n{}",
            title,
            "=".repeat(title.len()),
            Table::new(rows)
        )
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Label of the top-ranked curve
    pub fn winner(&self) -> Option<&str> {
        self.entries.first().map(|e| e.label.as_str())
    }
}

/// Score every curve and order best-first.
///
/// Equal scores share a rank and the next rank skips ("1224"). Curves whose
/// score is NaN sort last.
pub fn rank(curves: &[Curve], options: &RankOptions) -> Result<RankingTable> {
    let first = curves
        .first()
        .ok_or_else(|| TscError::EmptySeries("nothing to rank".to_string()))?;
    let direction = options.direction.unwrap_or(first.metric.direction);

    let mut entries: Vec<RankEntry> = curves
        .iter()
        .map(|curve| score_curve(curve, options, direction))
        .collect();

    entries.sort_by(|a, b| compare_scores(a.score, b.score, direction));

    let mut previous: Option<f64> = None;
    let mut current_rank = 0;
    for (idx, entry) in entries.iter_mut().enumerate() {
        let tied = previous.is_some_and(|p| p == entry.score || (p.is_nan() && entry.score.is_nan()));
        if !tied {
            current_rank = idx + 1;
        }
        entry.rank = current_rank;
        previous = Some(entry.score);
    }

    debug!(
        "Ranked {} curves by {} ({})",
        entries.len(),
        options.criterion,
        direction
    );

    Ok(RankingTable {
        metric: first.metric.column.clone(),
        criterion: options.criterion,
        direction,
        generated_at: Utc::now(),
        entries,
    })
}

fn compare_scores(a: f64, b: f64, direction: Direction) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            Direction::LowerIsBetter => a.total_cmp(&b),
            Direction::HigherIsBetter => b.total_cmp(&a),
        },
    }
}

fn score_curve(curve: &Curve, options: &RankOptions, direction: Direction) -> RankEntry {
    let means = curve.means();
    let mean = describe(&means).mean;
    let tail = tail_mean(&means, options.tail_fraction);
    let best = means
        .iter()
        .copied()
        .reduce(|a, b| if direction.is_better(b, a) { b } else { a })
        .unwrap_or(f64::NAN);
    let last = means.last().copied().unwrap_or(f64::NAN);

    let score = match options.criterion {
        Criterion::Mean => mean,
        Criterion::Tail => tail,
        Criterion::Best => best,
        Criterion::Final => last,
        Criterion::Auc => area_under(curve),
    };

    RankEntry {
        rank: 0,
        label: curve.label.clone(),
        score,
        mean,
        tail,
        best,
        last,
        points: means.len(),
    }
}

fn tail_mean(values: &[f64], fraction: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let fraction = fraction.clamp(0.0, 1.0);
    let count = ((values.len() as f64 * fraction).ceil() as usize).clamp(1, values.len());
    describe(&values[values.len() - count..]).mean
}

fn area_under(curve: &Curve) -> f64 {
    match curve.points.len() {
        0 => f64::NAN,
        1 => 0.0,
        _ => curve
            .points
            .windows(2)
            .map(|w| (w[1].x - w[0].x) * (w[0].mean + w[1].mean) / 2.0)
            .sum(),
    }
}
