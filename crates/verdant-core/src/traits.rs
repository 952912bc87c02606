//! Trait seams between the dashboard logic and the outside world.
//!
//! - `TelemetrySource`:  per-country metric series and policy events
//! - `PolicyAssistant`:  question answering and policy-brief generation
//! - `GraphSource`:      the policy relationship graph and its filter options
//! - `DocumentAnalyzer`: analysis of an uploaded PDF policy document
//! - `ChartBackend`:     the drawing surface charts are built on
//! - `DashboardTrigger`: whatever runs a dashboard load for the host
//!
//! The HTTP gateway implements the four source traits; tests use in-memory
//! fakes. Hosts implement `ChartBackend` and `DashboardTrigger`.

use async_trait::async_trait;

use verdant_contracts::{
    assistant::{AskResponse, DocumentAnalysis, PolicyBrief},
    chart::{CanvasId, ChartSpec},
    error::DashboardResult,
    graph::{FilterOptions, GraphData, GraphQuery},
    telemetry::TelemetryResponse,
};

use crate::countries::CountryInputs;

/// Provider of per-country telemetry.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the metric series and policy events for `country`.
    ///
    /// A backend `{error}` payload must surface as `DashboardError::Api`, not
    /// as an empty response.
    async fn fetch_telemetry(&self, country: &str) -> DashboardResult<TelemetryResponse>;
}

/// The policy question-answering service.
#[async_trait]
pub trait PolicyAssistant: Send + Sync {
    /// Ask a free-form question about the policy corpus.
    async fn ask(&self, query: &str) -> DashboardResult<AskResponse>;

    /// Draft a formal policy brief for `country`.
    async fn generate_report(&self, country: &str) -> DashboardResult<PolicyBrief>;
}

/// Provider of the policy relationship graph.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Fetch the graph restricted to `query`.
    async fn fetch_graph(&self, query: &GraphQuery) -> DashboardResult<GraphData>;

    /// Fetch the category and type values the filter inputs offer.
    async fn fetch_filters(&self) -> DashboardResult<FilterOptions>;
}

/// The policy-document analysis service.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Upload the PDF `bytes` under `file_name` and return the analysis.
    async fn analyze_document(&self, file_name: &str, bytes: Vec<u8>) -> DashboardResult<DocumentAnalysis>;
}

/// A drawing surface that can build and release chart instances.
///
/// The backend does not track which canvas a handle belongs to; the chart
/// registry does. `destroy` must release everything `create` allocated.
pub trait ChartBackend {
    /// Whatever identifies a live chart instance on this surface.
    type Handle;

    /// Build a chart from `spec` on `canvas` and return its handle.
    fn create(&mut self, canvas: &CanvasId, spec: &ChartSpec) -> DashboardResult<Self::Handle>;

    /// Release a chart previously returned by `create`.
    fn destroy(&mut self, handle: Self::Handle);
}

/// Runs a dashboard load on behalf of a view that changed the selection.
///
/// Needed because setting an input programmatically fires no change event.
pub trait DashboardTrigger {
    fn load_dashboard(&mut self, inputs: &CountryInputs);
}
