//! TSC Core - Reward catalogue, result-series naming, and shared types
//!
//! This crate provides the vocabulary used by the plotting and ranking tools:
//! which reward functions exist, how a training run's result file is named,
//! and which metric columns a sumo-rl CSV carries.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod key;
pub mod metric;
pub mod reward;
pub mod util;

pub use error::{Result, TscError};
pub use key::{Algorithm, Controller, Environment, Mode, ResultKey};
pub use metric::{Direction, Metric};
pub use reward::{RewardComponent, RewardFunction};
