//! Metric columns written by the simulator

use serde::{Deserialize, Serialize};

/// Which way a metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl Direction {
    /// True when `a` is strictly better than `b`
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        match self {
            Direction::LowerIsBetter => a < b,
            Direction::HigherIsBetter => a > b,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::LowerIsBetter => write!(f, "lower is better"),
            Direction::HigherIsBetter => write!(f, "higher is better"),
        }
    }
}

/// A y-axis column of a result CSV
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metric {
    pub column: String,
    pub direction: Direction,
}

impl Metric {
    pub const DEFAULT_COLUMN: &'static str = "system_total_waiting_time";

    /// Columns the simulator writes for every step
    pub const KNOWN: [(&'static str, Direction); 6] = [
        ("system_total_stopped", Direction::LowerIsBetter),
        ("system_total_waiting_time", Direction::LowerIsBetter),
        ("system_mean_waiting_time", Direction::LowerIsBetter),
        ("system_mean_speed", Direction::HigherIsBetter),
        ("agents_total_stopped", Direction::LowerIsBetter),
        ("agents_total_accumulated_waiting_time", Direction::LowerIsBetter),
    ];

    pub fn from_column(column: &str) -> Self {
        let direction = Self::KNOWN
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, direction)| *direction)
            .unwrap_or_else(|| {
                let lowered = column.to_lowercase();
                if lowered.contains("speed") || lowered.contains("reward") {
                    Direction::HigherIsBetter
                } else {
                    Direction::LowerIsBetter
                }
            });

        Self {
            column: column.to_string(),
            direction,
        }
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.iter().any(|(name, _)| *name == self.column)
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::from_column(Self::DEFAULT_COLUMN)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_directions() {
        assert_eq!(
            Metric::from_column("system_mean_speed").direction,
            Direction::HigherIsBetter
        );
        assert_eq!(Metric::default().direction, Direction::LowerIsBetter);
        assert!(Metric::default().is_known());
    }

    #[test]
    fn test_unknown_column_heuristic() {
        assert_eq!(
            Metric::from_column("episode_reward").direction,
            Direction::HigherIsBetter
        );
        assert_eq!(
            Metric::from_column("queue_length").direction,
            Direction::LowerIsBetter
        );
        assert!(!Metric::from_column("queue_length").is_known());
    }

    #[test]
    fn test_is_better() {
        assert!(Direction::LowerIsBetter.is_better(1.0, 2.0));
        assert!(Direction::HigherIsBetter.is_better(2.0, 1.0));
        assert!(!Direction::LowerIsBetter.is_better(2.0, 2.0));
    }
}
