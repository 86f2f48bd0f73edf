//! Reward-function catalogue
//!
//! The training runs are parameterised by a named reward option. The set is
//! closed: result files and documentation may only reference these names.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TscError;

/// Base signals a reward function is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardComponent {
    /// Change in cumulative vehicle waiting time between steps
    DiffWaitingTime,
    /// Mean speed of approaching vehicles
    AverageSpeed,
    /// Outgoing minus incoming vehicle count
    Pressure,
    /// Penalty for holding a phase beyond max green
    MaxGreenPenalty,
    /// Speed accumulated over the action interval
    AccumulatedSpeed,
    /// Mean waiting time per vehicle
    AverageWaitingTime,
}

impl std::fmt::Display for RewardComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RewardComponent::DiffWaitingTime => "diff-waiting-time",
            RewardComponent::AverageSpeed => "average-speed",
            RewardComponent::Pressure => "pressure",
            RewardComponent::MaxGreenPenalty => "max-green-penalty",
            RewardComponent::AccumulatedSpeed => "accumulated-speed",
            RewardComponent::AverageWaitingTime => "average-waiting-time",
        };
        write!(f, "{name}")
    }
}

/// Named reward option used by a training run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardFunction {
    All3,
    Default,
    DefAndMaxGreen,
    Speed,
    DefAndSpeed,
    DefAndPress,
    AvgWait,
    AvgWaitAvgSpeed,
    DefAndAccumlatedSpeed,
}

impl RewardFunction {
    /// Every declared reward function, in catalogue order
    pub const ALL: [RewardFunction; 9] = [
        RewardFunction::All3,
        RewardFunction::Default,
        RewardFunction::DefAndMaxGreen,
        RewardFunction::Speed,
        RewardFunction::DefAndSpeed,
        RewardFunction::DefAndPress,
        RewardFunction::AvgWait,
        RewardFunction::AvgWaitAvgSpeed,
        RewardFunction::DefAndAccumlatedSpeed,
    ];

    /// Canonical name as it appears in result file names
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardFunction::All3 => "all3",
            RewardFunction::Default => "default",
            RewardFunction::DefAndMaxGreen => "defandmaxgreen",
            RewardFunction::Speed => "speed",
            RewardFunction::DefAndSpeed => "defandspeed",
            RewardFunction::DefAndPress => "defandpress",
            RewardFunction::AvgWait => "avgwait",
            RewardFunction::AvgWaitAvgSpeed => "avgwaitavgspeed",
            // Name is spelled this way in every existing result file
            RewardFunction::DefAndAccumlatedSpeed => "defandaccumlatedspeed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RewardFunction::All3 => "Waiting-time difference combined with average speed and pressure",
            RewardFunction::Default => "Change in cumulative waiting time (sumo-rl default)",
            RewardFunction::DefAndMaxGreen => "Default reward with a penalty for exceeding max green",
            RewardFunction::Speed => "Average speed of approaching vehicles",
            RewardFunction::DefAndSpeed => "Default reward plus average speed",
            RewardFunction::DefAndPress => "Default reward plus intersection pressure",
            RewardFunction::AvgWait => "Negative average waiting time per vehicle",
            RewardFunction::AvgWaitAvgSpeed => "Average waiting time combined with average speed",
            RewardFunction::DefAndAccumlatedSpeed => "Default reward plus speed accumulated over the step",
        }
    }

    /// Base signals this reward combines
    pub fn components(&self) -> &'static [RewardComponent] {
        use RewardComponent::{
            AccumulatedSpeed, AverageSpeed, AverageWaitingTime, DiffWaitingTime, MaxGreenPenalty,
            Pressure,
        };

        match self {
            RewardFunction::All3 => &[DiffWaitingTime, AverageSpeed, Pressure],
            RewardFunction::Default => &[DiffWaitingTime],
            RewardFunction::DefAndMaxGreen => &[DiffWaitingTime, MaxGreenPenalty],
            RewardFunction::Speed => &[AverageSpeed],
            RewardFunction::DefAndSpeed => &[DiffWaitingTime, AverageSpeed],
            RewardFunction::DefAndPress => &[DiffWaitingTime, Pressure],
            RewardFunction::AvgWait => &[AverageWaitingTime],
            RewardFunction::AvgWaitAvgSpeed => &[AverageWaitingTime, AverageSpeed],
            RewardFunction::DefAndAccumlatedSpeed => &[DiffWaitingTime, AccumulatedSpeed],
        }
    }

    /// Whether `name` is in the declared set
    pub fn is_declared(name: &str) -> bool {
        name.parse::<RewardFunction>().is_ok()
    }
}

impl std::fmt::Display for RewardFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RewardFunction {
    type Err = TscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        RewardFunction::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == lowered)
            .ok_or_else(|| TscError::UnknownRewardFunction(s.to_string()))
    }
}
