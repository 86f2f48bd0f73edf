//! Comparison charts for reward curves
//!
//! Each curve is drawn as a line with a translucent ±std band in the same
//! palette color. Charts go through [`plotters`]; the backend is picked from
//! the output extension (`.svg` for vector output, bitmap otherwise).

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use tsc_core::{ResultKey, TscError};

use crate::stats::Curve;

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<PlotError> for TscError {
    fn from(err: PlotError) -> Self {
        TscError::Plot(err.to_string())
    }
}

type Result<T> = core::result::Result<T, PlotError>;

/// Output image format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Png,
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = TscError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(TscError::Config(format!("unsupported image format: {other}"))),
        }
    }
}

/// Titles and dimensions of a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: "Time step (seconds)".to_string(),
            y_label: "Total waiting time (s)".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Axis ranges covering every mean ± std, padded by 5%
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x: (f64, f64),
    y: (f64, f64),
}

impl Bounds {
    fn of(curves: &[Curve]) -> Result<Self> {
        let points = curves.iter().flat_map(|c| c.points.iter());
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            x = (x.0.min(p.x), x.1.max(p.x));
            y = (y.0.min(p.mean - p.std), y.1.max(p.mean + p.std));
        }
        if !x.0.is_finite() || !y.0.is_finite() {
            return Err(PlotError::InvalidData("no finite points to plot".to_string()));
        }
        Ok(Self {
            x: widen(x, 0.0),
            y: widen(y, 0.05),
        })
    }
}

fn widen((lo, hi): (f64, f64), pad: f64) -> (f64, f64) {
    if hi - lo <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let margin = (hi - lo) * pad;
    (lo - margin, hi + margin)
}

/// Render `curves` to `path`
pub fn render_chart(path: &Path, curves: &[Curve], style: &ChartStyle) -> Result<()> {
    if curves.is_empty() {
        return Err(PlotError::InvalidData("no curves to plot".to_string()));
    }
    let bounds = Bounds::of(curves)?;
    let size = (style.width, style.height);

    match ImageFormat::from_path(path) {
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_curves(&root, curves, style, bounds)?;
        }
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_curves(&root, curves, style, bounds)?;
        }
    }

    info!("Chart written to {}", path.display());
    Ok(())
}

fn draw_curves<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    curves: &[Curve],
    style: &ChartStyle,
    bounds: Bounds,
) -> Result<()> {
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut builder = ChartBuilder::on(root);
    builder.margin(20).x_label_area_size(60).y_label_area_size(85);
    if !style.title.is_empty() {
        builder.caption(style.title.as_str(), ("sans-serif", 32));
    }

    let mut chart = builder
        .build_cartesian_2d(bounds.x.0..bounds.x.1, bounds.y.0..bounds.y.1)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (idx, curve) in curves.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();

        if curve.points.iter().any(|p| p.std > 0.0) {
            let band: Vec<(f64, f64)> = curve
                .points
                .iter()
                .map(|p| (p.x, p.mean + p.std))
                .chain(curve.points.iter().rev().map(|p| (p.x, p.mean - p.std)))
                .collect();
            chart
                .draw_series(std::iter::once(Polygon::new(band, color.mix(0.25).filled())))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        chart
            .draw_series(LineSeries::new(
                curve.points.iter().map(|p| (p.x, p.mean)),
                color.stroke_width(2),
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// File stem shared by a chart and its summary CSV.
///
/// `[label, label, ...]` followed by the environment, connection and episode
/// when every series is a training result that agrees on them.
pub fn artifact_stem(labels: &[String], keys: &[Option<ResultKey>]) -> String {
    let mut stem = format!("[{}]", labels.join(", "));

    let parsed: Vec<&ResultKey> = keys.iter().flatten().collect();
    if parsed.is_empty() || parsed.len() != keys.len() {
        return stem;
    }
    let first = parsed[0];

    if parsed.iter().all(|k| k.environment == first.environment) {
        stem.push_str(&format!("_{}", first.environment));
    }
    if parsed.iter().all(|k| k.conn == first.conn) {
        stem.push_str(&format!("_conn{}", first.conn));
    }
    if let Some(ep) = first.ep {
        if parsed.iter().all(|k| k.ep == Some(ep)) {
            stem.push_str(&format!("_ep{ep}"));
        }
    }

    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CurvePoint;
    use tsc_core::Metric;

    fn key(name: &str) -> Option<ResultKey> {
        ResultKey::parse(name).ok()
    }

    #[test]
    fn test_artifact_stem_shared_suffix() {
        let labels = vec!["avgwait".to_string(), "default".to_string()];
        let keys = vec![
            key("cologne8-PPO-ideal-avgwait_conn1"),
            key("cologne8-PPO-ideal-default_conn1"),
        ];
        assert_eq!(artifact_stem(&labels, &keys), "[avgwait, default]_cologne8_conn1");
    }

    #[test]
    fn test_artifact_stem_omits_differing_parts() {
        let labels = vec!["all3".to_string(), "speed".to_string()];
        let keys = vec![
            key("ingolstadt7-PPO-ideal-all3_conn1_ep3"),
            key("ingolstadt7-PPO-ideal-speed_conn2_ep3"),
        ];
        assert_eq!(artifact_stem(&labels, &keys), "[all3, speed]_ingolstadt7_ep3");
    }

    #[test]
    fn test_artifact_stem_with_baseline() {
        let labels = vec!["avgwait".to_string(), "greedy:cologne1-camera_conn1".to_string()];
        let keys = vec![key("cologne1-PPO-camera-avgwait_conn1"), None];
        assert_eq!(
            artifact_stem(&labels, &keys),
            "[avgwait, greedy:cologne1-camera_conn1]"
        );
    }

    #[test]
    fn test_image_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a.SVG")), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("a")), ImageFormat::Png);
        assert_eq!("svg".parse::<ImageFormat>().unwrap(), ImageFormat::Svg);
    }

    #[test]
    fn test_bounds_cover_std_band() {
        let curve = Curve::new(
            "a",
            Metric::default(),
            vec![
                CurvePoint { x: 0.0, mean: 10.0, std: 2.0 },
                CurvePoint { x: 100.0, mean: 20.0, std: 0.0 },
            ],
        );
        let bounds = Bounds::of(&[curve]).unwrap();
        assert_eq!(bounds.x, (0.0, 100.0));
        assert!(bounds.y.0 < 8.0 && bounds.y.1 > 20.0);
    }

    #[test]
    fn test_flat_single_point_is_widened() {
        let curve = Curve::new(
            "a",
            Metric::default(),
            vec![CurvePoint { x: 5.0, mean: 1.0, std: 0.0 }],
        );
        let bounds = Bounds::of(&[curve]).unwrap();
        assert_eq!(bounds.x, (4.0, 6.0));
        assert_eq!(bounds.y, (0.0, 2.0));
    }

    #[test]
    fn test_render_rejects_empty_input() {
        let err = render_chart(Path::new("unused.png"), &[], &ChartStyle::default()).unwrap_err();
        assert!(matches!(err, PlotError::InvalidData(_)));
    }

    fn sample_curves() -> Vec<Curve> {
        ["avgwait", "default"]
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let points = (1..=20)
                    .map(|k| CurvePoint {
                        x: (k * 5) as f64,
                        mean: 100.0 * (i + 1) as f64 - k as f64,
                        std: 3.0,
                    })
                    .collect();
                Curve::new(*label, Metric::default(), points)
            })
            .collect()
    }

    fn small_style() -> ChartStyle {
        ChartStyle {
            title: "cologne8".to_string(),
            width: 400,
            height: 300,
            ..ChartStyle::default()
        }
    }

    #[test]
    fn test_render_png_uses_bitmap_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("[avgwait, default]_cologne8_conn1.png");

        render_chart(&path, &sample_curves(), &small_style()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_render_svg_uses_vector_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("[avgwait, default]_cologne8_conn1.svg");

        render_chart(&path, &sample_curves(), &small_style()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.trim_start().starts_with("<svg"), "{}", &text[..text.len().min(80)]);
        assert!(text.contains("avgwait"));
        assert!(text.contains("</svg>"));
    }
}
