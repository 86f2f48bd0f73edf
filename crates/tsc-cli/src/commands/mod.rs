//! CLI command modules

pub mod check;
pub mod config;
pub mod plot;
pub mod rank;
pub mod rewards;
