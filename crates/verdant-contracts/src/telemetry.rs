//! Telemetry wire format and the dashboard's derived series types.
//!
//! `TelemetryResponse` is exactly what `GET /api/telemetry` returns. Everything
//! else in this module is derived client-side and never sent back.

use serde::{Deserialize, Serialize};

/// One of the three metrics the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Co2,
    Renewables,
    Aqi,
}

impl Metric {
    /// Every metric, in the order the dashboard draws them.
    pub const ALL: [Metric; 3] = [Metric::Co2, Metric::Renewables, Metric::Aqi];

    /// The key used for this metric in the telemetry payload.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Co2 => "co2",
            Metric::Renewables => "renewables",
            Metric::Aqi => "aqi",
        }
    }

    /// The canvas this metric is drawn into.
    pub fn canvas_id(self) -> &'static str {
        match self {
            Metric::Co2 => "chartCo2",
            Metric::Renewables => "chartRenewables",
            Metric::Aqi => "chartAqi",
        }
    }

    /// Y-axis title for this metric's chart.
    pub fn y_axis_label(self) -> &'static str {
        match self {
            Metric::Co2 => "Metric Tons per Capita",
            Metric::Renewables => "% of Total Energy",
            Metric::Aqi => "Micrograms per Cubic Meter (µg/m³)",
        }
    }
}

/// Per-country metric series, positionally aligned with `years`.
///
/// Missing observations are `None` rather than omitted, so index `i` of every
/// series always refers to `years[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryMetricSet {
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub co2: Vec<Option<f64>>,
    #[serde(default)]
    pub renewables: Vec<Option<f64>>,
    #[serde(default)]
    pub aqi: Vec<Option<f64>>,
}

impl CountryMetricSet {
    /// Borrow the series for `metric`.
    pub fn series(&self, metric: Metric) -> &[Option<f64>] {
        match metric {
            Metric::Co2 => &self.co2,
            Metric::Renewables => &self.renewables,
            Metric::Aqi => &self.aqi,
        }
    }

    /// True when the backend had nothing for this country.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// A policy enacted in a given year, as received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEvent {
    pub year: i32,
    pub title: String,
}

/// Body of `GET /api/telemetry?country=...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryResponse {
    pub metrics: CountryMetricSet,
    #[serde(default)]
    pub events: Vec<PolicyEvent>,
}

/// A `PolicyEvent` tagged with the country it belongs to and its marker color.
///
/// Display-only: derived per load and discarded with the frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEvent {
    pub year: i32,
    pub title: String,
    pub country: String,
    pub color: String,
}

impl TaggedEvent {
    /// Tag `event` as belonging to `country`, drawn in `color`.
    pub fn tag(event: &PolicyEvent, country: &str, color: &str) -> Self {
        Self {
            year: event.year,
            title: event.title.clone(),
            country: country.to_string(),
            color: color.to_string(),
        }
    }
}

/// One country's series for a single metric, plus its line color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetBundle {
    /// Legend label; always the country name.
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub color: String,
}

/// The countries the dashboard should load.
///
/// Only constructible with a non-empty primary; "nothing selected" is
/// represented by the absence of a `CountrySelection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySelection {
    primary: String,
    comparison: Option<String>,
}

impl CountrySelection {
    /// Build a selection from raw input values.
    ///
    /// Returns `None` when `primary` is empty. An empty `comparison` is
    /// treated as "no comparison".
    pub fn from_inputs(primary: &str, comparison: &str) -> Option<Self> {
        if primary.is_empty() {
            return None;
        }
        let comparison = (!comparison.is_empty()).then(|| comparison.to_string());
        Some(Self {
            primary: primary.to_string(),
            comparison,
        })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn comparison(&self) -> Option<&str> {
        self.comparison.as_deref()
    }

    /// Primary first, then the comparison country if any.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.comparison.as_deref())
    }
}
