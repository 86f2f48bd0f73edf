//! TSC CLI - Plot and rank reward curves from traffic-signal RL runs
//!
//! `tsc plot` draws one mean ± std curve per run and writes a summary CSV,
//! `tsc rank` orders the curves of such a summary, and `tsc check` verifies
//! that documented plot/rank invocations agree on their reward lists.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]
#![allow(clippy::cast_possible_truncation)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{check, plot, rank, rewards};

#[derive(Parser)]
#[command(name = "tsc")]
#[command(author, version, about = "TSC - reward-curve tools for traffic-signal RL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot mean ± std curves and write a summary CSV
    Plot(plot::PlotArgs),

    /// Rank the curves of a summary CSV
    Rank(rank::RankArgs),

    /// Check plot/rank invocations in markdown files
    Check {
        /// Markdown files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the declared reward functions
    Rewards,

    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from tsc.env file (before parsing args)
    tsc_core::util::load_env_file();

    let cli = Cli::parse();
    let (config, config_path) = config::Config::load()?;

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("tsc_cli={log_level},tsc_analysis={log_level},tsc_core={log_level}").into()
    });

    // stdout carries charts, tables and JSON; logs go to stderr
    let (json_layer, text_layer) = if config.logging.json {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    match &config_path {
        Some(path) => debug!("Loaded configuration from {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }

    match cli.command {
        Commands::Plot(args) => plot::run(args, &config.plot).await,
        Commands::Rank(args) => rank::run(args, &config.rank).await,
        Commands::Check { files } => check::run(files).await,
        Commands::Rewards => rewards::run().await,
        Commands::Config(cmd) => commands::config::run(cmd, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plot_accepts_multiple_files_and_labels() {
        let cli = Cli::try_parse_from([
            "tsc",
            "plot",
            "-f",
            "results/train/cologne8-PPO-ideal-avgwait_conn1",
            "results/train/cologne8-PPO-ideal-default_conn1",
            "-l",
            "wait",
            "default",
            "--ma",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Plot(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.labels, vec!["wait", "default"]);
                assert_eq!(args.moving_average, Some(5));
            }
            _ => panic!("Expected plot command"),
        }
    }

    #[test]
    fn test_rank_direction_flags_conflict() {
        let result = Cli::try_parse_from([
            "tsc",
            "rank",
            "-f",
            "summary.csv",
            "--higher-is-better",
            "--lower-is-better",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rank_parses_criterion() {
        let cli =
            Cli::try_parse_from(["tsc", "rank", "-f", "summary.csv", "--criterion", "last"]).unwrap();
        match cli.command {
            Commands::Rank(args) => {
                assert_eq!(args.criterion, Some(tsc_analysis::Criterion::Final));
            }
            _ => panic!("Expected rank command"),
        }
    }
}
