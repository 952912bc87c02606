//! # verdant-core
//!
//! Dashboard coordination for the VERDANT policy dashboard client.
//!
//! This crate provides:
//! - The trait seams (`TelemetrySource`, `PolicyAssistant`, `GraphSource`,
//!   `DocumentAnalyzer`, `ChartBackend`, `DashboardTrigger`)
//! - The `DashboardLoader` that fetches and merges per-country telemetry
//! - The country registry and select inputs
//! - The `Shell` (views, help overlay, graph → dashboard bridge)
//! - View models for the chat panel, the document analyzer, and the policy
//!   graph
//! - `DashboardConfig`, loaded from TOML
//!
//! ## Usage
//!
//! ```rust,ignore
//! use verdant_core::{DashboardLoader, config::DashboardConfig, countries::CountryInputs};
//!
//! let loader = DashboardLoader::new(gateway, DashboardConfig::default().palette);
//! let mut inputs = CountryInputs::new();
//! inputs.select_primary("Japan")?;
//! let frame = loader.load_dashboard(&inputs).await?;
//! ```

pub mod analyzer;
pub mod chat;
pub mod config;
pub mod countries;
pub mod graph;
pub mod loader;
pub mod shell;
pub mod traits;

pub use loader::DashboardLoader;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex, time::Duration};

    use async_trait::async_trait;

    use verdant_contracts::{
        error::{DashboardError, DashboardResult},
        telemetry::{CountryMetricSet, Metric, PolicyEvent, TelemetryResponse},
    };

    use crate::{
        config::{DashboardConfig, Palette},
        countries::CountryInputs,
        traits::TelemetrySource,
        DashboardLoader,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// In-memory telemetry keyed by country. Records every fetch and can be
    /// told to fail or stall for specific countries.
    #[derive(Default)]
    struct FakeTelemetry {
        data: HashMap<String, TelemetryResponse>,
        failing: Vec<String>,
        delays_ms: HashMap<String, u64>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTelemetry {
        fn with(mut self, country: &str, resp: TelemetryResponse) -> Self {
            self.data.insert(country.to_string(), resp);
            self
        }

        fn failing(mut self, country: &str) -> Self {
            self.failing.push(country.to_string());
            self
        }

        fn delayed(mut self, country: &str, ms: u64) -> Self {
            self.delays_ms.insert(country.to_string(), ms);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TelemetrySource for FakeTelemetry {
        async fn fetch_telemetry(&self, country: &str) -> DashboardResult<TelemetryResponse> {
            self.calls.lock().unwrap().push(country.to_string());
            if let Some(ms) = self.delays_ms.get(country) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.failing.iter().any(|c| c == country) {
                return Err(DashboardError::Transport {
                    endpoint: "/api/telemetry".to_string(),
                    reason: "connection reset".to_string(),
                });
            }
            Ok(self.data.get(country).cloned().unwrap_or_default())
        }
    }

    fn telemetry(base: f64, events: &[(i32, &str)]) -> TelemetryResponse {
        TelemetryResponse {
            metrics: CountryMetricSet {
                years: vec![2010, 2011, 2012],
                co2: vec![Some(base), None, Some(base + 1.0)],
                renewables: vec![Some(base * 2.0), Some(base * 2.0), None],
                aqi: vec![None, Some(base * 3.0), Some(base * 3.0)],
            },
            events: events
                .iter()
                .map(|(year, title)| PolicyEvent {
                    year: *year,
                    title: title.to_string(),
                })
                .collect(),
        }
    }

    fn inputs(primary: &str, comparison: &str) -> CountryInputs {
        let mut inputs = CountryInputs::new();
        if !primary.is_empty() {
            inputs.select_primary(primary).unwrap();
        }
        if !comparison.is_empty() {
            inputs.select_comparison(comparison).unwrap();
        }
        inputs
    }

    // ── 1. no primary selection ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_no_primary_makes_no_fetch() {
        let loader = DashboardLoader::new(FakeTelemetry::default(), Palette::default());

        let frame = loader.load_dashboard(&inputs("", "")).await.unwrap();

        assert!(frame.is_none());
        assert!(loader.source().calls().is_empty());
        assert_eq!(loader.current_generation(), 0);
    }

    // ── 2. primary only ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_primary_only_fetches_once() {
        let source = FakeTelemetry::default().with("Japan", telemetry(9.0, &[(2015, "Green Growth")]));
        let loader = DashboardLoader::new(source, Palette::default());

        let frame = loader.load_dashboard(&inputs("Japan", "")).await.unwrap().unwrap();

        assert_eq!(loader.source().calls(), vec!["Japan"]);
        assert_eq!(frame.years, vec![2010, 2011, 2012]);
        for metric in Metric::ALL {
            let bundles = frame.bundles(metric);
            assert_eq!(bundles.len(), 1, "{metric:?} should have one series");
            assert_eq!(bundles[0].label, "Japan");
        }
        assert_eq!(frame.bundles(Metric::Co2)[0].data, vec![Some(9.0), None, Some(10.0)]);
        assert_eq!(frame.bundles(Metric::Co2)[0].color, "#ea580c");
        assert_eq!(frame.bundles(Metric::Renewables)[0].color, "#0d9488");
        assert_eq!(frame.bundles(Metric::Aqi)[0].color, "#6366f1");
    }

    // ── 3. primary + comparison ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_comparison_fetches_twice_and_orders_primary_first() {
        let source = FakeTelemetry::default()
            .with("Japan", telemetry(9.0, &[]))
            .with("Norway", telemetry(7.0, &[]));
        let loader = DashboardLoader::new(source, Palette::default());

        let frame = loader.load_dashboard(&inputs("Japan", "Norway")).await.unwrap().unwrap();

        let mut calls = loader.source().calls();
        calls.sort();
        assert_eq!(calls, vec!["Japan", "Norway"]);

        for metric in Metric::ALL {
            let labels: Vec<&str> = frame.bundles(metric).iter().map(|b| b.label.as_str()).collect();
            assert_eq!(labels, vec!["Japan", "Norway"]);
        }
        assert_eq!(frame.bundles(Metric::Co2)[1].color, "#f59e0b");
        assert_eq!(frame.bundles(Metric::Renewables)[1].color, "#10b981");
        assert_eq!(frame.bundles(Metric::Aqi)[1].color, "#8b5cf6");
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let source = FakeTelemetry::default()
            .with("Japan", telemetry(9.0, &[]))
            .with("Norway", telemetry(7.0, &[]))
            .delayed("Japan", 200)
            .delayed("Norway", 200);
        let loader = DashboardLoader::new(source, Palette::default());

        let started = std::time::Instant::now();
        loader.load_dashboard(&inputs("Japan", "Norway")).await.unwrap();

        // Sequential fetches would take at least 400 ms.
        assert!(started.elapsed() < Duration::from_millis(390));
    }

    // ── 4. event merging ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_events_are_primary_then_comparison_not_chronological() {
        let source = FakeTelemetry::default()
            .with("Japan", telemetry(9.0, &[(2020, "J late"), (2012, "J early")]))
            .with("Norway", telemetry(7.0, &[(2011, "N first")]));
        let loader = DashboardLoader::new(source, Palette::default());

        let frame = loader.load_dashboard(&inputs("Japan", "Norway")).await.unwrap().unwrap();

        let tagged: Vec<(&str, &str, &str)> = frame
            .events
            .iter()
            .map(|e| (e.country.as_str(), e.title.as_str(), e.color.as_str()))
            .collect();
        assert_eq!(
            tagged,
            vec![
                ("Japan", "J late", "rgba(234, 88, 12, 0.6)"),
                ("Japan", "J early", "rgba(234, 88, 12, 0.6)"),
                ("Norway", "N first", "rgba(139, 92, 246, 0.6)"),
            ]
        );
    }

    #[tokio::test]
    async fn test_year_axis_comes_from_primary() {
        let mut other = telemetry(7.0, &[]);
        other.metrics.years = vec![1999, 2000, 2001];
        let source = FakeTelemetry::default()
            .with("Japan", telemetry(9.0, &[]))
            .with("Norway", other);
        let loader = DashboardLoader::new(source, Palette::default());

        let frame = loader.load_dashboard(&inputs("Japan", "Norway")).await.unwrap().unwrap();
        assert_eq!(frame.years, vec![2010, 2011, 2012]);
    }

    // ── 5. all-or-nothing join ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_comparison_failure_discards_primary() {
        let source = FakeTelemetry::default()
            .with("Japan", telemetry(9.0, &[]))
            .failing("Norway");
        let loader = DashboardLoader::new(source, Palette::default());

        let err = loader.load_dashboard(&inputs("Japan", "Norway")).await.unwrap_err();

        assert!(matches!(err, DashboardError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_empty_country_data_is_not_an_error() {
        let loader = DashboardLoader::new(FakeTelemetry::default(), Palette::default());

        let frame = loader.load_dashboard(&inputs("Mexico", "")).await.unwrap().unwrap();

        assert!(frame.years.is_empty());
        assert!(frame.bundles(Metric::Co2)[0].data.is_empty());
    }

    // ── 6. generations ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_each_load_takes_a_new_generation() {
        let loader = DashboardLoader::new(FakeTelemetry::default(), Palette::default());

        let first = loader.load_dashboard(&inputs("Japan", "")).await.unwrap().unwrap();
        let second = loader.load_dashboard(&inputs("Italy", "")).await.unwrap().unwrap();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert!(!loader.is_current(first.generation));
        assert!(loader.is_current(second.generation));
    }

    #[tokio::test]
    async fn test_slow_stale_load_is_not_current() {
        let source = FakeTelemetry::default()
            .with("Japan", telemetry(9.0, &[]))
            .with("Italy", telemetry(5.0, &[]))
            .delayed("Japan", 150);
        let loader = DashboardLoader::new(source, Palette::default());

        let japan = inputs("Japan", "");
        let italy = inputs("Italy", "");
        let (stale, fresh) = tokio::join!(loader.load_dashboard(&japan), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            loader.load_dashboard(&italy).await
        });

        let stale = stale.unwrap().unwrap();
        let fresh = fresh.unwrap().unwrap();
        assert!(!loader.is_current(stale.generation));
        assert!(loader.is_current(fresh.generation));
    }

    #[tokio::test]
    async fn test_generation_reserved_before_load_runs() {
        let loader = DashboardLoader::new(FakeTelemetry::default(), Palette::default());
        let first = loader.issue_generation();
        let second = loader.issue_generation();

        let selection = inputs("Japan", "").selection().unwrap();
        let frame = loader.load_as(first, &selection).await.unwrap();

        assert_eq!(frame.generation, first);
        assert!(!loader.is_current(frame.generation));
        assert!(loader.is_current(second));
        assert_eq!(loader.current_generation(), 2);
    }

    // ── 7. palette from config ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_configured_palette_is_used() {
        let config = DashboardConfig::from_toml_str(
            r##"
            [palette.co2]
            primary = "#000000"
            comparison = "#111111"
            "##,
        )
        .unwrap();
        let loader = DashboardLoader::new(FakeTelemetry::default(), config.palette);

        let frame = loader.load_dashboard(&inputs("Japan", "")).await.unwrap().unwrap();
        assert_eq!(frame.bundles(Metric::Co2)[0].color, "#000000");
        assert_eq!(frame.bundles(Metric::Aqi)[0].color, "#6366f1");
    }

    // ── Config ────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.annotations.min_year, 2010);
        assert_eq!(config.annotations.label_max_chars, 15);
    }

    #[test]
    fn test_config_rejects_bad_base_url() {
        let err = DashboardConfig::from_toml_str(r#"base_url = "localhost:5000""#).unwrap_err();
        assert!(matches!(err, DashboardError::Config { .. }));
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        assert!(DashboardConfig::from_toml_str("request_timeout_secs = 0").is_err());
    }

    #[test]
    fn test_config_rejects_malformed_toml() {
        let err = DashboardConfig::from_toml_str("base_url = ").unwrap_err();
        assert!(err.to_string().contains("failed to parse dashboard TOML"));
    }

    #[test]
    fn test_config_missing_file() {
        let err = DashboardConfig::from_file(std::path::Path::new("/nonexistent/verdant.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_base_url_override_is_validated() {
        let config = DashboardConfig::default()
            .with_base_url("https://policy.example.org/")
            .unwrap();
        assert_eq!(config.base_url, "https://policy.example.org");
        assert!(DashboardConfig::default().with_base_url("ftp://nope").is_err());
    }
}
