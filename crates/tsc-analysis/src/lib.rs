//! TSC Analysis - Reward-curve loading, aggregation, plotting, and ranking
//!
//! The pipeline behind `tsc plot` and `tsc rank`: result CSVs are resolved and
//! loaded ([`series`]), collapsed into per-step curves ([`stats`]), written to a
//! summary CSV ([`summary`]), drawn ([`plot`]) and ranked ([`ranking`]).
//! [`catalogue`] checks documentation that lists these invocations.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod catalogue;
pub mod plot;
pub mod ranking;
pub mod series;
pub mod stats;
pub mod summary;

pub use catalogue::{Catalogue, Invocation, Issue, Tool};
pub use plot::{artifact_stem, render_chart, ChartStyle, ImageFormat, PlotError};
pub use ranking::{rank, Criterion, RankEntry, RankOptions, RankingTable};
pub use series::{load_all, load_series, ColumnSpec, RawSeries, SeriesSource};
pub use stats::{aggregate, describe, moving_average, Curve, CurvePoint, Stats};
pub use summary::{read_summary, write_summary, SummaryRow};
