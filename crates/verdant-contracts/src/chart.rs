//! Declarative chart descriptions handed to a chart backend.
//!
//! A `ChartSpec` is everything a drawing surface needs to draw one line chart.
//! Backends never see `DatasetBundle`s or raw events; the renderer turns those
//! into specs first.

use serde::{Deserialize, Serialize};

use crate::telemetry::{DatasetBundle, Metric, TaggedEvent};

/// Stable identifier for a drawing surface, e.g. `CanvasId("chartCo2")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanvasId(pub String);

impl CanvasId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Metric> for CanvasId {
    fn from(metric: Metric) -> Self {
        Self::new(metric.canvas_id())
    }
}

impl std::fmt::Display for CanvasId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    /// Translucent variant of `border_color` used under the line.
    pub background_color: String,
    /// Whether the area under the line is filled.
    pub fill: bool,
    pub tension: f64,
    pub point_radius: u32,
    /// Draw straight across `None` points instead of breaking the line.
    pub span_gaps: bool,
}

/// A vertical marker at one x value with a text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSpec {
    /// The year the marker sits on.
    pub value: i32,
    pub border_color: String,
    pub border_width: u32,
    /// Dash pattern `[on, off]`.
    pub border_dash: [u32; 2],
    pub label: String,
    pub label_background: String,
}

/// Axis title plus its visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub title: String,
    pub show_grid: bool,
    pub begin_at_zero: bool,
}

/// A complete line-chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub labels: Vec<i32>,
    pub series: Vec<SeriesSpec>,
    pub annotations: Vec<AnnotationSpec>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub show_legend: bool,
}

/// The merged result of one dashboard load, ready to render.
///
/// `generation` identifies the load that produced the frame; hosts drop a
/// frame whose generation is no longer the latest.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    pub generation: u64,
    /// Year axis, taken from the primary country.
    pub years: Vec<i32>,
    /// One bundle list per metric, in `Metric::ALL` order. Each list is
    /// ordered `[primary, comparison?]`.
    pub datasets: Vec<(Metric, Vec<DatasetBundle>)>,
    /// Primary country's events first, then the comparison country's.
    pub events: Vec<TaggedEvent>,
}

impl DashboardFrame {
    /// The bundles for `metric`, or an empty slice when the frame has none.
    pub fn bundles(&self, metric: Metric) -> &[DatasetBundle] {
        self.datasets
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, b)| b.as_slice())
            .unwrap_or(&[])
    }
}
