//! Per-step aggregation and smoothing

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use tsc_core::{Metric, Result, TscError};

use crate::series::RawSeries;

/// One aggregated point of a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub mean: f64,
    pub std: f64,
}

/// A labelled metric trajectory, one point per distinct x
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub metric: Metric,
    pub points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(label: impl Into<String>, metric: Metric, points: Vec<CurvePoint>) -> Self {
        Self {
            label: label.into(),
            metric,
            points,
        }
    }

    /// Apply the same moving average to mean and std
    pub fn smoothed(mut self, window: usize) -> Self {
        if window <= 1 {
            return self;
        }
        let means: Vec<f64> = self.points.iter().map(|p| p.mean).collect();
        let stds: Vec<f64> = self.points.iter().map(|p| p.std).collect();
        let means = moving_average(&means, window);
        let stds = moving_average(&stds, window);
        for (point, (mean, std)) in self.points.iter_mut().zip(means.into_iter().zip(stds)) {
            point.mean = mean;
            point.std = std;
        }
        self
    }

    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Summary statistics of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Group samples by x (ascending) and reduce each group to mean and sample std.
///
/// Episodes concatenated into one series share x values, so each group holds
/// one sample per episode.
pub fn aggregate(raw: &RawSeries, label: impl Into<String>, metric: Metric) -> Result<Curve> {
    if raw.samples.is_empty() {
        return Err(TscError::EmptySeries(raw.name.clone()));
    }

    let mut samples = raw.samples.clone();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut points = Vec::new();
    let mut group: Vec<f64> = Vec::new();
    let mut current_x = samples[0].0;

    for (x, y) in samples {
        if x != current_x {
            points.push(reduce_group(current_x, &group));
            group.clear();
            current_x = x;
        }
        group.push(y);
    }
    points.push(reduce_group(current_x, &group));

    Ok(Curve::new(label, metric, points))
}

fn reduce_group(x: f64, values: &[f64]) -> CurvePoint {
    let stats = describe(values);
    CurvePoint {
        x,
        mean: stats.mean,
        std: stats.std,
    }
}

/// Centered moving average with zero padding at the edges.
///
/// Output has the input's length; position `i` averages the window ending at
/// `i + (window - 1) / 2`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }

    let n = values.len() as isize;
    let w = window as isize;
    let offset = (w - 1) / 2;

    (0..n)
        .map(|i| {
            let end = (i + offset).min(n - 1);
            let start = (i + offset - (w - 1)).max(0);
            let sum: f64 = if start <= end {
                values[start as usize..=end as usize].iter().sum()
            } else {
                0.0
            };
            sum / window as f64
        })
        .collect()
}

/// Count, mean, sample std (0 for fewer than two values), min and max.
pub fn describe(values: &[f64]) -> Stats {
    if values.is_empty() {
        return Stats {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }

    let array = Array1::from(values.to_vec());
    let mean = array.mean().unwrap_or(f64::NAN);
    let std = if array.len() > 1 { array.std(1.0) } else { 0.0 };
    let min = array.iter().copied().fold(f64::INFINITY, f64::min);
    let max = array.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Stats {
        count: array.len(),
        mean,
        std,
        min,
        max,
    }
}
