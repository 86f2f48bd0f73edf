//! Result-series keys
//!
//! Training writes its trajectories under a prefix of the form
//! `<env>-<algorithm>-<mode>-<reward>[-<tag>]*`, to which the simulator appends
//! `_conn<N>` and, per episode, `_ep<E>`. A [`ResultKey`] is the parsed form of
//! such a file name.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TscError};
use crate::reward::RewardFunction;

/// Simulated road network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(pub String);

impl Environment {
    /// Networks shipped with the training scripts
    pub const KNOWN: [&'static str; 6] = [
        "cologne1",
        "cologne3",
        "cologne8",
        "ingolstadt1",
        "ingolstadt7",
        "ingolstadt21",
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Training algorithm
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Ppo,
    Dqn,
    Other(String),
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Ppo => write!(f, "PPO"),
            Algorithm::Dqn => write!(f, "DQN"),
            Algorithm::Other(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for Algorithm {
    fn from(s: &str) -> Self {
        match s {
            "PPO" => Algorithm::Ppo,
            "DQN" => Algorithm::Dqn,
            other => Algorithm::Other(other.to_string()),
        }
    }
}

/// Observation mode the agent was trained with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Full simulator state
    Ideal,
    /// Lane-area detectors standing in for cameras
    Camera,
    /// Connected-vehicle positions only
    Gps,
    Custom,
    Other(String),
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Ideal => write!(f, "ideal"),
            Mode::Camera => write!(f, "camera"),
            Mode::Gps => write!(f, "gps"),
            Mode::Custom => write!(f, "custom"),
            Mode::Other(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for Mode {
    fn from(s: &str) -> Self {
        match s {
            "ideal" => Mode::Ideal,
            "camera" => Mode::Camera,
            "gps" => Mode::Gps,
            "custom" => Mode::Custom,
            other => Mode::Other(other.to_string()),
        }
    }
}

/// Non-learning baseline controller used by fixed-control simulations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Greedy,
    MaxPressure,
    Fixed,
    Rand,
}

impl Controller {
    pub fn as_str(&self) -> &'static str {
        match self {
            Controller::Greedy => "greedy",
            Controller::MaxPressure => "max_pressure",
            Controller::Fixed => "fixed",
            Controller::Rand => "rand",
        }
    }

    /// Controller named by the directory a baseline result lives in
    pub fn from_path(path: &Path) -> Option<Self> {
        path.parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse().ok())
    }
}

impl std::fmt::Display for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Controller {
    type Err = TscError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "greedy" => Ok(Controller::Greedy),
            "max_pressure" => Ok(Controller::MaxPressure),
            "fixed" => Ok(Controller::Fixed),
            "rand" => Ok(Controller::Rand),
            other => Err(TscError::UnknownController(other.to_string())),
        }
    }
}

/// Composite identity of one training run's result series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultKey {
    pub environment: Environment,
    pub algorithm: Algorithm,
    pub mode: Mode,
    pub reward: RewardFunction,
    /// Extra prefix tokens after the reward, e.g. `5s`
    pub tags: Vec<String>,
    pub conn: u32,
    pub ep: Option<u32>,
}

impl ResultKey {
    /// Parse a result file name (directory and `.csv` extension are ignored)
    pub fn parse(name: &str) -> Result<Self> {
        let file = Path::new(name)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(name);
        let stem = file.strip_suffix(".csv").unwrap_or(file);

        let (rest, ep) = split_numbered_suffix(name, stem, "_ep")?;
        let (rest, conn) = split_numbered_suffix(name, rest, "_conn")?;
        let conn = conn.ok_or_else(|| TscError::invalid_key(name, "missing _conn<N> suffix"))?;

        let parts: Vec<&str> = rest.split('-').collect();
        if parts.len() < 4 {
            return Err(TscError::invalid_key(
                name,
                "expected <env>-<algorithm>-<mode>-<reward>",
            ));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(TscError::invalid_key(name, "empty name component"));
        }

        let reward = parts[3].parse::<RewardFunction>().map_err(|_| {
            TscError::invalid_key(name, format!("unknown reward function '{}'", parts[3]))
        })?;

        Ok(Self {
            environment: Environment::new(parts[0]),
            algorithm: Algorithm::from(parts[1]),
            mode: Mode::from(parts[2]),
            reward,
            tags: parts[4..].iter().map(|t| (*t).to_string()).collect(),
            conn,
            ep,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&path.to_string_lossy())
    }

    /// Name without the episode suffix; groups every episode of one run
    pub fn series_prefix(&self) -> String {
        let mut prefix = format!(
            "{}-{}-{}-{}",
            self.environment, self.algorithm, self.mode, self.reward
        );
        for tag in &self.tags {
            prefix.push('-');
            prefix.push_str(tag);
        }
        prefix.push_str(&format!("_conn{}", self.conn));
        prefix
    }

    /// Reward name with the run identifiers, used when reward names collide
    pub fn qualified_label(&self) -> String {
        match self.ep {
            Some(ep) => format!("{}_conn{}_ep{}", self.reward, self.conn, ep),
            None => format!("{}_conn{}", self.reward, self.conn),
        }
    }
}

impl std::fmt::Display for ResultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.series_prefix())?;
        if let Some(ep) = self.ep {
            write!(f, "_ep{ep}")?;
        }
        Ok(())
    }
}

impl FromStr for ResultKey {
    type Err = TscError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split a trailing `<marker><digits>` off `stem`.
///
/// Returns the stem unchanged with `None` when the marker is absent or not
/// followed by digits only.
fn split_numbered_suffix<'a>(
    name: &str,
    stem: &'a str,
    marker: &str,
) -> Result<(&'a str, Option<u32>)> {
    let Some(idx) = stem.rfind(marker) else {
        return Ok((stem, None));
    };
    let digits = &stem[idx + marker.len()..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok((stem, None));
    }

    let value: u32 = digits
        .parse()
        .map_err(|_| TscError::invalid_key(name, format!("{marker} number out of range")))?;
    if value == 0 {
        return Err(TscError::invalid_key(
            name,
            format!("{marker} number must be positive"),
        ));
    }

    Ok((&stem[..idx], Some(value)))
}
