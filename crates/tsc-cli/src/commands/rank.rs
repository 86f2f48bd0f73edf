//! Rank the curves of a plot summary

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use tsc_analysis::{rank, read_summary, Criterion, RankOptions};
use tsc_core::Direction;

use crate::config::RankConfig;

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Summary CSV written by `tsc plot`
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Score used for ordering: mean, tail, best, final or auc
    #[arg(short, long)]
    pub criterion: Option<Criterion>,

    /// Share of trailing points scored by the tail criterion
    #[arg(long)]
    pub tail_fraction: Option<f64>,

    /// Rank larger values first regardless of the metric
    #[arg(long, conflicts_with = "lower_is_better")]
    pub higher_is_better: bool,

    /// Rank smaller values first regardless of the metric
    #[arg(long)]
    pub lower_is_better: bool,

    /// Write the ranking as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RankArgs, config: &RankConfig) -> Result<()> {
    let tail_fraction = args.tail_fraction.unwrap_or(config.tail_fraction);
    if !(tail_fraction > 0.0 && tail_fraction <= 1.0) {
        bail!("Tail fraction must be in (0, 1], got {tail_fraction}");
    }

    let direction = if args.higher_is_better {
        Some(Direction::HigherIsBetter)
    } else if args.lower_is_better {
        Some(Direction::LowerIsBetter)
    } else {
        None
    };

    let options = RankOptions {
        criterion: args.criterion.unwrap_or(config.criterion),
        direction,
        tail_fraction,
    };

    let curves = read_summary(&args.file)
        .with_context(|| format!("Failed to read summary {}", args.file.display()))?;
    info!("Ranking {} curves from {}", curves.len(), args.file.display());

    let table = rank(&curves, &options)?;
    if let Some(winner) = table.winner() {
        info!("Best series by {}: {}", table.criterion, winner);
    }

    if args.json {
        println!("{}", table.to_json()?);
    } else {
        println!("{}", table.render());
    }

    if let Some(output) = &args.output {
        table
            .write_csv(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Ranking written to {}", output.display());
    }

    Ok(())
}
