//! Result-series resolution and CSV loading

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tsc_core::{Controller, Result, ResultKey, TscError};

/// Which columns to read and how the file is delimited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub x: String,
    pub y: String,
    pub separator: u8,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            x: "step".to_string(),
            y: tsc_core::Metric::DEFAULT_COLUMN.to_string(),
            separator: b',',
        }
    }
}

/// A path given on the command line and the files it stands for
#[derive(Debug, Clone)]
pub struct SeriesSource {
    /// Path as given, either a file or a name prefix
    pub path: PathBuf,
    pub key: Option<ResultKey>,
    pub files: Vec<PathBuf>,
}

impl SeriesSource {
    /// Resolve `path` to its member files.
    ///
    /// An existing file is its own only member. Anything else is treated as a
    /// prefix: every file in the same directory whose name continues the
    /// prefix with `_`, `-` or `.` (or matches exactly) is a member, so
    /// `..._conn1` picks up `..._conn1_ep1.csv` but not `..._conn10_ep1.csv`.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let key = ResultKey::from_path(&path).ok();

        if path.is_file() {
            return Ok(Self {
                files: vec![path.clone()],
                path,
                key,
            });
        }

        let prefix = path.to_string_lossy().to_string();
        let pattern = format!("{}*", glob::Pattern::escape(&prefix));
        let entries = glob::glob(&pattern)
            .map_err(|e| TscError::Config(format!("invalid series path {prefix}: {e}")))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|p| p.is_file() && continues_prefix(&prefix, p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(TscError::NoSeriesFiles(prefix));
        }

        debug!("Resolved {} to {} file(s)", prefix, files.len());
        Ok(Self { path, key, files })
    }

    /// Display label: the reward name for training results, the controller
    /// and file stem for baselines, the file stem otherwise
    pub fn default_label(&self) -> String {
        if let Some(key) = &self.key {
            return key.reward.to_string();
        }
        let stem = file_stem(&self.path);
        match Controller::from_path(&self.path) {
            Some(controller) => format!("{controller}:{stem}"),
            None => stem,
        }
    }
}

fn continues_prefix(prefix: &str, candidate: &Path) -> bool {
    let prefix_name = Path::new(prefix)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let candidate_name = candidate
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if prefix_name.is_empty() {
        return false;
    }
    match candidate_name.strip_prefix(prefix_name.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with(['_', '-', '.']),
        None => false,
    }
}

fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    name.strip_suffix(".csv").map(str::to_string).unwrap_or(name)
}

/// Concatenated `(x, y)` samples of every member file of a source
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub name: String,
    pub files: Vec<PathBuf>,
    pub samples: Vec<(f64, f64)>,
}

/// Read every member of `source` and concatenate their samples.
///
/// Rows whose x or y cell is empty or non-numeric are skipped.
pub fn load_series(source: &SeriesSource, columns: &ColumnSpec) -> Result<RawSeries> {
    let mut samples = Vec::new();

    for file in &source.files {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(columns.separator)
            .flexible(true)
            .from_path(file)?;

        let headers = reader.headers()?.clone();
        let column_index = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| TscError::MissingColumn {
                    file: file.display().to_string(),
                    column: name.to_string(),
                })
        };
        let xi = column_index(&columns.x)?;
        let yi = column_index(&columns.y)?;

        let before = samples.len();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = record?;
            match (parse_cell(record.get(xi)), parse_cell(record.get(yi))) {
                (Some(x), Some(y)) => samples.push((x, y)),
                _ => skipped += 1,
            }
        }

        debug!(
            "Loaded {} rows from {} ({} skipped)",
            samples.len() - before,
            file.display(),
            skipped
        );
    }

    if samples.is_empty() {
        return Err(TscError::EmptySeries(source.path.display().to_string()));
    }

    Ok(RawSeries {
        name: source.path.display().to_string(),
        files: source.files.clone(),
        samples,
    })
}

fn parse_cell(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Load many sources on the blocking pool; results keep input order.
pub async fn load_all(sources: Vec<SeriesSource>, columns: &ColumnSpec) -> Result<Vec<RawSeries>> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let columns = columns.clone();
            tokio::task::spawn_blocking(move || load_series(&source, &columns))
        })
        .collect();

    let mut series = Vec::with_capacity(handles.len());
    for handle in handles {
        let loaded = handle
            .await
            .map_err(|e| TscError::Task(e.to_string()))??;
        series.push(loaded);
    }

    info!("Loaded {} series", series.len());
    Ok(series)
}

/// Pick a label per source, preferring explicit labels in order.
///
/// Colliding default labels fall back to the run-qualified label, then to a
/// positional suffix.
pub fn assign_labels(sources: &[SeriesSource], explicit: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = sources
        .iter()
        .enumerate()
        .map(|(i, s)| explicit.get(i).cloned().unwrap_or_else(|| s.default_label()))
        .collect();

    let counts = count_labels(&labels);
    for (i, source) in sources.iter().enumerate() {
        if i >= explicit.len() && counts[&labels[i]] > 1 {
            if let Some(key) = &source.key {
                labels[i] = key.qualified_label();
            }
        }
    }

    let counts = count_labels(&labels);
    let mut seen: HashMap<String, usize> = HashMap::new();
    for label in &mut labels {
        if counts[label.as_str()] > 1 {
            let n = seen.entry(label.clone()).or_insert(0);
            *n += 1;
            *label = format!("{label}#{n}");
        }
    }

    labels
}

fn count_labels(labels: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for label in labels {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }
    counts
}
