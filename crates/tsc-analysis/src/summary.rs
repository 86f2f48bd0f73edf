//! Summary CSV written by `plot` and read back by `rank`
//!
//! Long format, one row per curve point: `label,metric,x,mean,std`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tsc_core::{Metric, Result, TscError};

use crate::stats::{Curve, CurvePoint};

/// One row of the summary CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub metric: String,
    pub x: f64,
    pub mean: f64,
    pub std: f64,
}

pub fn write_summary(path: &Path, curves: &[Curve]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0usize;

    for curve in curves {
        for point in &curve.points {
            writer.serialize(SummaryRow {
                label: curve.label.clone(),
                metric: curve.metric.column.clone(),
                x: point.x,
                mean: point.mean,
                std: point.std,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;

    debug!("Wrote {} summary rows to {}", rows, path.display());
    Ok(())
}

/// Read a summary back into curves, in order of first appearance
pub fn read_summary(path: &Path) -> Result<Vec<Curve>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut curves: Vec<Curve> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in reader.deserialize::<SummaryRow>() {
        let row = row?;
        let slot = match index.get(&row.label) {
            Some(&slot) => slot,
            None => {
                index.insert(row.label.clone(), curves.len());
                curves.push(Curve::new(
                    row.label.clone(),
                    Metric::from_column(&row.metric),
                    Vec::new(),
                ));
                curves.len() - 1
            }
        };
        curves[slot].points.push(CurvePoint {
            x: row.x,
            mean: row.mean,
            std: row.std,
        });
    }

    if curves.is_empty() {
        return Err(TscError::EmptySeries(path.display().to_string()));
    }

    Ok(curves)
}
