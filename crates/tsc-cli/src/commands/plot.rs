//! Plot reward curves from result series

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};

use tsc_analysis::series::assign_labels;
use tsc_analysis::{
    aggregate, artifact_stem, load_all, render_chart, write_summary, ChartStyle, ColumnSpec,
    ImageFormat, SeriesSource,
};
use tsc_core::{Metric, ResultKey};

use crate::config::PlotConfig;

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Result files or name prefixes, one per series
    #[arg(short = 'f', long = "files", num_args = 1.., required = true)]
    pub files: Vec<PathBuf>,

    /// Legend labels, in the order of the series
    #[arg(short = 'l', long = "labels", num_args = 1..)]
    pub labels: Vec<String>,

    /// Column used for the x axis
    #[arg(long)]
    pub xaxis: Option<String>,

    /// Column used for the y axis
    #[arg(long)]
    pub yaxis: Option<String>,

    /// Moving-average window applied to each curve
    #[arg(long = "ma")]
    pub moving_average: Option<usize>,

    /// Field separator of the result files
    #[arg(long = "sep")]
    pub separator: Option<char>,

    #[arg(long)]
    pub xlabel: Option<String>,

    #[arg(long)]
    pub ylabel: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// Output file or stem (defaults to the bracketed reward list)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image format when the output has no extension
    #[arg(long)]
    pub format: Option<ImageFormat>,

    /// Directory for generated files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

pub async fn run(args: PlotArgs, config: &PlotConfig) -> Result<()> {
    let separator = args.separator.unwrap_or(config.separator);
    if !separator.is_ascii() {
        bail!("Separator must be a single ASCII character, got {separator:?}");
    }

    let columns = ColumnSpec {
        x: args.xaxis.clone().unwrap_or_else(|| config.xaxis.clone()),
        y: args.yaxis.clone().unwrap_or_else(|| config.yaxis.clone()),
        separator: separator as u8,
    };
    let window = args.moving_average.unwrap_or(config.moving_average);

    let sources = args
        .files
        .iter()
        .map(|f| {
            SeriesSource::resolve(f).with_context(|| format!("Failed to resolve {}", f.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    if args.labels.len() > sources.len() {
        warn!(
            "{} labels given for {} series; extra labels ignored",
            args.labels.len(),
            sources.len()
        );
    }

    let labels = assign_labels(&sources, &args.labels);
    let keys: Vec<Option<ResultKey>> = sources.iter().map(|s| s.key.clone()).collect();
    for key in keys.iter().flatten() {
        if !key.environment.is_known() {
            warn!("Unknown network '{}' in {}", key.environment, key);
        }
    }

    let series = load_all(sources, &columns)
        .await
        .context("Failed to load result series")?;

    let metric = Metric::from_column(&columns.y);
    if !metric.is_known() {
        warn!(
            "'{}' is not a simulator column; ranking will treat it as {}",
            metric.column, metric.direction
        );
    }
    let curves = series
        .iter()
        .zip(&labels)
        .map(|(raw, label)| {
            aggregate(raw, label.clone(), metric.clone())
                .map(|curve| curve.smoothed(window))
                .with_context(|| format!("Failed to aggregate {}", raw.name))
        })
        .collect::<Result<Vec<_>>>()?;

    for curve in &curves {
        info!("{}: {} points", curve.label, curve.len());
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output_dir.clone());
    let stem = artifact_stem(&labels, &keys);
    let format = args.format.unwrap_or(config.format);
    let (image_path, summary_path) = output_paths(args.output.as_deref(), &output_dir, &stem, format);

    if let Some(parent) = image_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let style = ChartStyle {
        title: args.title.clone().unwrap_or_default(),
        x_label: args.xlabel.clone().unwrap_or_else(|| config.x_label.clone()),
        y_label: args
            .ylabel
            .clone()
            .unwrap_or_else(|| default_y_label(&columns.y, config)),
        width: config.width,
        height: config.height,
    };

    render_chart(&image_path, &curves, &style)
        .with_context(|| format!("Failed to render {}", image_path.display()))?;
    write_summary(&summary_path, &curves)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    println!("Chart:   {}", image_path.display());
    println!("Summary: {}", summary_path.display());

    Ok(())
}

/// The configured label applies to the configured column; other columns are
/// labelled by name
fn default_y_label(column: &str, config: &PlotConfig) -> String {
    if column == config.yaxis {
        config.y_label.clone()
    } else {
        column.to_string()
    }
}

/// Image and summary paths.
///
/// An explicit output ending in `.png` or `.svg` names the image directly;
/// any other output is a stem. Paths are built by string concatenation since
/// stems may contain dots.
fn output_paths(
    output: Option<&Path>,
    output_dir: &Path,
    stem: &str,
    format: ImageFormat,
) -> (PathBuf, PathBuf) {
    let (base, ext) = match output {
        Some(path) => {
            let text = path.to_string_lossy().to_string();
            let lowered = text.to_lowercase();
            let known = [ImageFormat::Png, ImageFormat::Svg]
                .into_iter()
                .find(|f| lowered.ends_with(&format!(".{}", f.extension())));
            match known {
                Some(f) => (text[..text.len() - f.extension().len() - 1].to_string(), f.extension()),
                None => (text, format.extension()),
            }
        }
        None => (
            output_dir.join(stem).to_string_lossy().to_string(),
            format.extension(),
        ),
    };

    (
        PathBuf::from(format!("{base}.{ext}")),
        PathBuf::from(format!("{base}.csv")),
    )
}
