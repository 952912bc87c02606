//! TOML-driven dashboard configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! base_url = "http://127.0.0.1:5000"
//! request_timeout_secs = 10
//!
//! [annotations]
//! min_year = 2010
//! label_max_chars = 15
//!
//! [palette.co2]
//! primary = "#ea580c"
//! comparison = "#f59e0b"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use verdant_contracts::{
    error::{DashboardError, DashboardResult},
    telemetry::Metric,
};

/// Line colors for one role across the primary and comparison country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesColors {
    pub primary: String,
    pub comparison: String,
}

impl SeriesColors {
    fn new(primary: &str, comparison: &str) -> Self {
        Self {
            primary: primary.to_string(),
            comparison: comparison.to_string(),
        }
    }

    /// Color for the country at `index` in a `[primary, comparison]` list.
    pub fn for_index(&self, index: usize) -> &str {
        if index == 0 {
            &self.primary
        } else {
            &self.comparison
        }
    }
}

/// Colors for every metric plus the event markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub co2: SeriesColors,
    pub renewables: SeriesColors,
    pub aqi: SeriesColors,
    /// Marker colors; written as `rgba(..., 0.6)` so labels can be darkened.
    pub events: SeriesColors,
}

impl Palette {
    pub fn metric(&self, metric: Metric) -> &SeriesColors {
        match metric {
            Metric::Co2 => &self.co2,
            Metric::Renewables => &self.renewables,
            Metric::Aqi => &self.aqi,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            co2: SeriesColors::new("#ea580c", "#f59e0b"),
            renewables: SeriesColors::new("#0d9488", "#10b981"),
            aqi: SeriesColors::new("#6366f1", "#8b5cf6"),
            events: SeriesColors::new("rgba(234, 88, 12, 0.6)", "rgba(139, 92, 246, 0.6)"),
        }
    }
}

/// Which events become chart markers and how their labels are cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationPolicy {
    /// Events before this year are not drawn.
    pub min_year: i32,
    /// Titles longer than this are cut and suffixed with `...`.
    pub label_max_chars: usize,
}

impl Default for AnnotationPolicy {
    fn default() -> Self {
        Self {
            min_year: 2010,
            label_max_chars: 15,
        }
    }
}

/// Top-level configuration for every VERDANT host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root of the policy backend, without a trailing slash.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub annotations: AnnotationPolicy,
    pub palette: Palette,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 10,
            annotations: AnnotationPolicy::default(),
            palette: Palette::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `DashboardError::Config` if the TOML is malformed or a value
    /// is out of range.
    pub fn from_toml_str(s: &str) -> DashboardResult<Self> {
        let config: DashboardConfig = toml::from_str(s).map_err(|e| DashboardError::Config {
            reason: format!("failed to parse dashboard TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> DashboardResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DashboardError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Replace the backend URL, e.g. from a `--base-url` flag.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> DashboardResult<Self> {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> DashboardResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DashboardError::Config {
                reason: format!("base_url '{}' must start with http:// or https://", self.base_url),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(DashboardError::Config {
                reason: "request_timeout_secs must be at least 1".to_string(),
            });
        }
        if self.annotations.label_max_chars == 0 {
            return Err(DashboardError::Config {
                reason: "annotations.label_max_chars must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
