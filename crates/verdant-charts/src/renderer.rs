//! Turns dataset bundles and tagged events into charts.
//!
//! `build_chart_spec` is pure; `ChartRenderer` adds the replace-on-redraw
//! discipline on top of a `ChartBackend`:
//!
//! 1. Build the `ChartSpec`.
//! 2. Release whatever chart the canvas currently holds.
//! 3. Create the new chart and bind it to the canvas.
//!
//! Step 2 always runs before step 3, so redrawing a canvas never leaves two
//! charts stacked on it.

use tracing::{debug, info, warn};

use verdant_contracts::{
    chart::{AnnotationSpec, AxisSpec, CanvasId, ChartSpec, DashboardFrame, SeriesSpec},
    error::DashboardResult,
    telemetry::{DatasetBundle, Metric, TaggedEvent},
};
use verdant_core::{config::AnnotationPolicy, traits::ChartBackend};

use crate::registry::ChartRegistry;

const X_AXIS_TITLE: &str = "Observation Year";
/// Hex alpha appended to a series color for its area fill.
const FILL_ALPHA_SUFFIX: &str = "20";
const LINE_TENSION: f64 = 0.3;
const POINT_RADIUS: u32 = 3;
const MARKER_WIDTH: u32 = 2;
const MARKER_DASH: [u32; 2] = [5, 5];

/// Cut `title` to `max_chars` characters, appending `...` if anything was cut.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let cut: String = title.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

/// The marker label for `event`: `[Country] Title`, title truncated.
pub fn annotation_label(event: &TaggedEvent, max_chars: usize) -> String {
    format!("[{}] {}", event.country, truncate_title(&event.title, max_chars))
}

/// Marker for every event at or after the policy's `min_year`.
///
/// Events are not merged by year: two countries with a policy in the same
/// year get two markers.
pub fn build_annotations(events: &[TaggedEvent], policy: AnnotationPolicy) -> Vec<AnnotationSpec> {
    events
        .iter()
        .filter(|e| e.year >= policy.min_year)
        .map(|e| AnnotationSpec {
            value: e.year,
            border_color: e.color.clone(),
            border_width: MARKER_WIDTH,
            border_dash: MARKER_DASH,
            label: annotation_label(e, policy.label_max_chars),
            label_background: e.color.replacen("0.6", "0.8", 1),
        })
        .collect()
}

/// One series per bundle. Area fill only when a single bundle is plotted;
/// overlapping fills are unreadable.
pub fn build_series(bundles: &[DatasetBundle]) -> Vec<SeriesSpec> {
    let fill = bundles.len() == 1;
    bundles
        .iter()
        .map(|b| SeriesSpec {
            label: b.label.clone(),
            data: b.data.clone(),
            border_color: b.color.clone(),
            background_color: format!("{}{}", b.color, FILL_ALPHA_SUFFIX),
            fill,
            tension: LINE_TENSION,
            point_radius: POINT_RADIUS,
            span_gaps: true,
        })
        .collect()
}

pub fn build_chart_spec(
    y_axis_label: &str,
    years: &[i32],
    bundles: &[DatasetBundle],
    events: &[TaggedEvent],
    policy: AnnotationPolicy,
) -> ChartSpec {
    ChartSpec {
        labels: years.to_vec(),
        series: build_series(bundles),
        annotations: build_annotations(events, policy),
        x_axis: AxisSpec {
            title: X_AXIS_TITLE.to_string(),
            show_grid: false,
            begin_at_zero: false,
        },
        y_axis: AxisSpec {
            title: y_axis_label.to_string(),
            show_grid: true,
            begin_at_zero: false,
        },
        show_legend: true,
    }
}

/// Draws charts on a backend, keeping one live chart per canvas.
pub struct ChartRenderer<B: ChartBackend> {
    backend: B,
    registry: ChartRegistry<B::Handle>,
    policy: AnnotationPolicy,
}

impl<B: ChartBackend> ChartRenderer<B> {
    pub fn new(backend: B, policy: AnnotationPolicy) -> Self {
        Self {
            backend,
            registry: ChartRegistry::new(),
            policy,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &ChartRegistry<B::Handle> {
        &self.registry
    }

    /// (Re)draw the chart on `canvas`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the new chart cannot be created. The
    /// previous chart has already been released at that point, so the
    /// canvas is left empty rather than stale.
    pub fn render_chart(
        &mut self,
        canvas: &CanvasId,
        y_axis_label: &str,
        years: &[i32],
        bundles: &[DatasetBundle],
        events: &[TaggedEvent],
    ) -> DashboardResult<()> {
        let spec = build_chart_spec(y_axis_label, years, bundles, events, self.policy);

        if let Some(previous) = self.registry.release(canvas) {
            debug!(canvas = %canvas, "releasing previous chart");
            self.backend.destroy(previous);
        }

        let handle = self.backend.create(canvas, &spec)?;
        if let Some(leaked) = self.registry.bind(canvas.clone(), handle) {
            warn!(canvas = %canvas, "canvas was rebound without release");
            self.backend.destroy(leaked);
        }

        debug!(
            canvas = %canvas,
            series = spec.series.len(),
            annotations = spec.annotations.len(),
            "chart rendered"
        );
        Ok(())
    }

    /// Draw every metric chart from `frame`.
    pub fn render_frame(&mut self, frame: &DashboardFrame) -> DashboardResult<()> {
        for metric in Metric::ALL {
            self.render_chart(
                &CanvasId::from(metric),
                metric.y_axis_label(),
                &frame.years,
                frame.bundles(metric),
                &frame.events,
            )?;
        }
        info!(generation = frame.generation, "dashboard charts rendered");
        Ok(())
    }
}
