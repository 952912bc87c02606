//! # verdant-charts
//!
//! Chart rendering for the VERDANT telemetry dashboard.
//!
//! This crate provides [`renderer::ChartRenderer`], which turns dataset
//! bundles and tagged policy events into [`ChartSpec`]s and draws them on a
//! [`ChartBackend`], keeping exactly one live chart per canvas through a
//! [`registry::ChartRegistry`].
//!
//! [`retained::RetainedBackend`] is the in-memory backend hosts read specs
//! from, and [`dashboard::Dashboard`] ties a loader and a renderer together.
//!
//! [`ChartSpec`]: verdant_contracts::chart::ChartSpec
//! [`ChartBackend`]: verdant_core::traits::ChartBackend
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use verdant_charts::{renderer::ChartRenderer, retained::RetainedBackend};
//!
//! let mut renderer = ChartRenderer::new(RetainedBackend::new(), AnnotationPolicy::default());
//! renderer.render_frame(&frame)?;
//! ```

pub mod dashboard;
pub mod registry;
pub mod renderer;
pub mod retained;

pub use dashboard::{Dashboard, FrameOutcome};
pub use renderer::ChartRenderer;
pub use retained::RetainedBackend;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use async_trait::async_trait;

    use verdant_contracts::{
        chart::{CanvasId, ChartSpec},
        error::{DashboardError, DashboardResult},
        telemetry::{CountryMetricSet, DatasetBundle, Metric, PolicyEvent, TaggedEvent, TelemetryResponse},
    };
    use verdant_core::{
        config::{AnnotationPolicy, Palette},
        countries::CountryInputs,
        traits::{ChartBackend, TelemetrySource},
        DashboardLoader,
    };

    use super::*;
    use renderer::{annotation_label, build_annotations, build_chart_spec, truncate_title};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn bundle(label: &str, color: &str) -> DatasetBundle {
        DatasetBundle {
            label: label.to_string(),
            data: vec![Some(1.0), None, Some(3.0)],
            color: color.to_string(),
        }
    }

    fn event(year: i32, title: &str, country: &str) -> TaggedEvent {
        TaggedEvent {
            year,
            title: title.to_string(),
            country: country.to_string(),
            color: "rgba(234, 88, 12, 0.6)".to_string(),
        }
    }

    fn renderer() -> ChartRenderer<RetainedBackend> {
        ChartRenderer::new(RetainedBackend::new(), AnnotationPolicy::default())
    }

    struct StaticTelemetry {
        data: HashMap<String, TelemetryResponse>,
    }

    #[async_trait]
    impl TelemetrySource for StaticTelemetry {
        async fn fetch_telemetry(&self, country: &str) -> DashboardResult<TelemetryResponse> {
            self.data.get(country).cloned().ok_or_else(|| DashboardError::Transport {
                endpoint: "/api/telemetry".to_string(),
                reason: format!("no route to {country}"),
            })
        }
    }

    fn telemetry_for(countries: &[&str]) -> StaticTelemetry {
        let data = countries
            .iter()
            .map(|c| {
                let resp = TelemetryResponse {
                    metrics: CountryMetricSet {
                        years: vec![2009, 2010, 2011],
                        co2: vec![Some(5.0), None, Some(4.0)],
                        renewables: vec![Some(20.0), Some(22.0), None],
                        aqi: vec![Some(11.0), Some(10.0), Some(9.5)],
                    },
                    events: vec![
                        PolicyEvent { year: 2005, title: "Old Act".to_string() },
                        PolicyEvent { year: 2011, title: format!("{c} Climate Framework Law") },
                    ],
                };
                (c.to_string(), resp)
            })
            .collect();
        StaticTelemetry { data }
    }

    fn dashboard(countries: &[&str]) -> Dashboard<StaticTelemetry, RetainedBackend> {
        let loader = Arc::new(DashboardLoader::new(telemetry_for(countries), Palette::default()));
        Dashboard::new(loader, renderer())
    }

    fn inputs(primary: &str, comparison: &str) -> CountryInputs {
        let mut inputs = CountryInputs::new();
        inputs.select_primary(primary).unwrap();
        if !comparison.is_empty() {
            inputs.select_comparison(comparison).unwrap();
        }
        inputs
    }

    fn spec<'a>(dash: &'a Dashboard<StaticTelemetry, RetainedBackend>, metric: Metric) -> &'a ChartSpec {
        dash.renderer()
            .backend()
            .spec_for(&CanvasId::from(metric))
            .expect("chart should be live")
    }

    // ── Labels ────────────────────────────────────────────────────────────────

    #[test]
    fn long_title_is_cut_to_fifteen_chars_with_ellipsis() {
        let e = event(2015, "Renewable Energy Sources Act", "Germany");
        assert_eq!(annotation_label(&e, 15), "[Germany] Renewable Energ...");
    }

    #[test]
    fn short_title_is_kept_whole() {
        let e = event(2015, "Carbon Tax", "Sweden");
        assert_eq!(annotation_label(&e, 15), "[Sweden] Carbon Tax");
        assert_eq!(truncate_title("exactly fifteen", 15), "exactly fifteen");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_title("Ley de Transición Energética", 15), "Ley de Transici...");
    }

    // ── Annotations ───────────────────────────────────────────────────────────

    #[test]
    fn events_before_2010_get_no_marker() {
        let events = vec![event(2005, "Early", "Japan"), event(2012, "Later", "Japan")];
        let markers = build_annotations(&events, AnnotationPolicy::default());

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].value, 2012);
        assert_eq!(markers[0].border_dash, [5, 5]);
        assert_eq!(markers[0].label_background, "rgba(234, 88, 12, 0.8)");
    }

    #[test]
    fn marker_label_only_raises_first_alpha_match() {
        let mut e = event(2016, "Grid Code", "Japan");
        e.color = "rgba(10, 0.6, 0.6, 0.6)".to_string();

        let markers = build_annotations(&[e], AnnotationPolicy::default());

        assert_eq!(markers[0].label_background, "rgba(10, 0.8, 0.6, 0.6)");
        assert_eq!(markers[0].border_color, "rgba(10, 0.6, 0.6, 0.6)");
    }

    #[test]
    fn same_year_markers_are_not_merged() {
        let mut other = event(2015, "Energy Act", "Norway");
        other.color = "rgba(139, 92, 246, 0.6)".to_string();
        let events = vec![event(2015, "Energy Act", "Japan"), other];

        let markers = build_annotations(&events, AnnotationPolicy::default());

        assert_eq!(markers.len(), 2);
        assert_ne!(markers[0].label, markers[1].label);
        assert_ne!(markers[0].border_color, markers[1].border_color);
    }

    // ── Series ────────────────────────────────────────────────────────────────

    #[test]
    fn single_bundle_is_filled_and_spans_gaps() {
        let spec = build_chart_spec("t", &[2010, 2011, 2012], &[bundle("Japan", "#ea580c")], &[], AnnotationPolicy::default());

        assert_eq!(spec.series.len(), 1);
        let s = &spec.series[0];
        assert!(s.fill);
        assert!(s.span_gaps);
        assert_eq!(s.background_color, "#ea580c20");
        assert_eq!(s.data, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(spec.x_axis.title, "Observation Year");
        assert_eq!(spec.y_axis.title, "t");
    }

    #[test]
    fn two_bundles_are_not_filled() {
        let spec = build_chart_spec(
            "t",
            &[2010],
            &[bundle("Japan", "#ea580c"), bundle("Norway", "#f59e0b")],
            &[],
            AnnotationPolicy::default(),
        );
        assert!(spec.series.iter().all(|s| !s.fill));
        assert_eq!(spec.series[1].border_color, "#f59e0b");
    }

    // ── Registry discipline ───────────────────────────────────────────────────

    #[test]
    fn rendering_twice_leaves_one_live_chart() {
        let mut r = renderer();
        let canvas = CanvasId::new("chartCo2");

        r.render_chart(&canvas, "t", &[2010], &[bundle("Japan", "#ea580c")], &[]).unwrap();
        r.render_chart(&canvas, "t", &[2010], &[bundle("Italy", "#ea580c")], &[]).unwrap();

        assert_eq!(r.backend().live_on(&canvas), 1);
        assert_eq!(r.backend().created(), 2);
        assert_eq!(r.backend().destroyed(), 1);
        assert_eq!(r.registry().len(), 1);
        assert_eq!(r.backend().spec_for(&canvas).unwrap().series[0].label, "Italy");
    }

    #[test]
    fn distinct_canvases_keep_their_own_charts() {
        let mut r = renderer();
        r.render_chart(&CanvasId::new("a"), "t", &[], &[], &[]).unwrap();
        r.render_chart(&CanvasId::new("b"), "t", &[], &[], &[]).unwrap();
        assert_eq!(r.backend().live_count(), 2);
        assert_eq!(r.registry().canvases().count(), 2);
    }

    /// A backend that fails every create after the first.
    #[derive(Default)]
    struct FlakyBackend {
        inner: RetainedBackend,
    }

    impl ChartBackend for FlakyBackend {
        type Handle = <RetainedBackend as ChartBackend>::Handle;

        fn create(&mut self, canvas: &CanvasId, spec: &ChartSpec) -> DashboardResult<Self::Handle> {
            if self.inner.created() > 0 {
                return Err(DashboardError::Render {
                    canvas: canvas.to_string(),
                    reason: "surface lost".to_string(),
                });
            }
            self.inner.create(canvas, spec)
        }

        fn destroy(&mut self, handle: Self::Handle) {
            self.inner.destroy(handle)
        }
    }

    #[test]
    fn failed_redraw_leaves_canvas_empty_not_stale() {
        let mut r = ChartRenderer::new(FlakyBackend::default(), AnnotationPolicy::default());
        let canvas = CanvasId::new("chartAqi");

        r.render_chart(&canvas, "t", &[], &[], &[]).unwrap();
        let err = r.render_chart(&canvas, "t", &[], &[], &[]).unwrap_err();

        assert!(matches!(err, DashboardError::Render { .. }));
        assert!(!r.registry().contains(&canvas));
        assert_eq!(r.backend().inner.live_count(), 0);
    }

    // ── Dashboard end to end ──────────────────────────────────────────────────

    #[tokio::test]
    async fn no_primary_touches_no_chart() {
        let mut dash = dashboard(&["Japan"]);

        let outcome = dash.load_dashboard(&CountryInputs::new()).await.unwrap();

        assert_eq!(outcome, None);
        assert_eq!(dash.renderer().backend().created(), 0);
        assert!(dash.renderer().registry().is_empty());
    }

    #[tokio::test]
    async fn primary_only_draws_three_filled_single_series_charts() {
        let mut dash = dashboard(&["Japan"]);

        let outcome = dash.load_dashboard(&inputs("Japan", "")).await.unwrap();

        assert_eq!(outcome, Some(FrameOutcome::Rendered));
        assert_eq!(dash.renderer().backend().live_count(), 3);
        for metric in Metric::ALL {
            let s = spec(&dash, metric);
            assert_eq!(s.series.len(), 1);
            assert!(s.series[0].fill);
            assert_eq!(s.y_axis.title, metric.y_axis_label());
            assert_eq!(s.labels, vec![2009, 2010, 2011]);
        }
    }

    #[tokio::test]
    async fn comparison_draws_unfilled_two_series_charts_with_both_markers() {
        let mut dash = dashboard(&["Japan", "Norway"]);

        dash.load_dashboard(&inputs("Japan", "Norway")).await.unwrap();

        for metric in Metric::ALL {
            let s = spec(&dash, metric);
            assert_eq!(s.series.len(), 2);
            assert!(s.series.iter().all(|series| !series.fill));

            let labels: Vec<&str> = s.annotations.iter().map(|a| a.label.as_str()).collect();
            assert_eq!(labels, vec!["[Japan] Japan Climate F...", "[Norway] Norway Climate ..."]);
        }
    }

    #[tokio::test]
    async fn repeated_loads_keep_three_live_charts() {
        let mut dash = dashboard(&["Japan", "Norway"]);

        dash.load_dashboard(&inputs("Japan", "")).await.unwrap();
        dash.load_dashboard(&inputs("Norway", "Japan")).await.unwrap();
        dash.load_dashboard(&inputs("Japan", "Norway")).await.unwrap();

        assert_eq!(dash.renderer().backend().live_count(), 3);
        assert_eq!(dash.renderer().registry().len(), 3);
    }

    #[tokio::test]
    async fn failed_load_leaves_existing_charts_alone() {
        let mut dash = dashboard(&["Japan"]);
        dash.load_dashboard(&inputs("Japan", "")).await.unwrap();

        let err = dash.load_dashboard(&inputs("Japan", "Norway")).await;

        assert!(err.is_err());
        assert_eq!(dash.renderer().backend().created(), 3);
        assert_eq!(spec(&dash, Metric::Co2).series[0].label, "Japan");
    }

    #[tokio::test]
    async fn stale_frame_is_dropped() {
        let mut dash = dashboard(&["Japan", "Norway"]);
        let loader = dash.loader();

        let old = loader.load_dashboard(&inputs("Japan", "")).await.unwrap().unwrap();
        let new = loader.load_dashboard(&inputs("Norway", "")).await.unwrap().unwrap();

        assert_eq!(dash.apply_frame(&new).unwrap(), FrameOutcome::Rendered);
        assert_eq!(dash.apply_frame(&old).unwrap(), FrameOutcome::Stale);
        assert_eq!(spec(&dash, Metric::Aqi).series[0].label, "Norway");
    }
}
