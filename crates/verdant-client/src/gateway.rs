//! HTTP gateway to the policy backend.
//!
//! `HttpGateway` implements all three source traits from verdant-core over
//! one shared `reqwest::Client`. Every response goes through the same
//! decoding path:
//!
//! 1. Read the body and parse it as JSON.
//! 2. If the object carries a non-empty `error` field, return
//!    `DashboardError::Api`.
//! 3. Otherwise deserialize into the endpoint's response type.
//!
//! Non-2xx responses without a JSON body become `Api` errors naming the
//! status code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use verdant_contracts::{
    assistant::{AskRequest, AskResponse, DocumentAnalysis, PolicyBrief, ReportRequest},
    error::{DashboardError, DashboardResult},
    graph::{FilterOptions, GraphData, GraphQuery},
    telemetry::TelemetryResponse,
};
use verdant_core::{
    config::DashboardConfig,
    traits::{DocumentAnalyzer, GraphSource, PolicyAssistant, TelemetrySource},
};

pub const TELEMETRY_ENDPOINT: &str = "/api/telemetry";
pub const GRAPH_ENDPOINT: &str = "/api/graph";
pub const FILTERS_ENDPOINT: &str = "/api/filters";
pub const ASK_ENDPOINT: &str = "/api/ask";
pub const REPORT_ENDPOINT: &str = "/api/generate_report";
pub const UPLOAD_ENDPOINT: &str = "/api/upload_policy";

const PDF_MIME: &str = "application/pdf";

/// Turn a parsed JSON body into `T`, surfacing `{"error": ...}` payloads.
pub fn decode_payload<T: DeserializeOwned>(endpoint: &str, body: Value) -> DashboardResult<T> {
    if let Some(err) = body.get("error").filter(|e| is_truthy(e)) {
        let reason = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(DashboardError::Api {
            endpoint: endpoint.to_string(),
            reason,
        });
    }
    serde_json::from_value(body).map_err(|e| DashboardError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Whether an `error` field counts as set. `null`, `false`, `0`, and `""`
/// do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Client for the policy backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Build a gateway for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DashboardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> DashboardResult<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `endpoint`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> DashboardResult<T> {
        debug!(endpoint = %endpoint, "GET");
        let request = self.client.get(self.url(endpoint)).query(query);
        self.send(endpoint, request).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> DashboardResult<T> {
        debug!(endpoint = %endpoint, "POST");
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(endpoint, request).await
    }

    async fn post_multipart<T: DeserializeOwned>(&self, endpoint: &str, form: Form) -> DashboardResult<T> {
        debug!(endpoint = %endpoint, "POST multipart");
        let request = self.client.post(self.url(endpoint)).multipart(form);
        self.send(endpoint, request).await
    }

    async fn send<T: DeserializeOwned>(&self, endpoint: &str, request: reqwest::RequestBuilder) -> DashboardResult<T> {
        let resp = request.send().await.map_err(|e| DashboardError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| DashboardError::Transport {
            endpoint: endpoint.to_string(),
            reason: format!("failed to read response: {}", e),
        })?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(DashboardError::Api {
                    endpoint: endpoint.to_string(),
                    reason: format!("HTTP {}", status),
                });
            }
            Err(e) => {
                return Err(DashboardError::Decode {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        decode_payload(endpoint, body)
    }
}

#[async_trait]
impl TelemetrySource for HttpGateway {
    async fn fetch_telemetry(&self, country: &str) -> DashboardResult<TelemetryResponse> {
        self.get_json(TELEMETRY_ENDPOINT, &[("country", country)]).await
    }
}

#[async_trait]
impl PolicyAssistant for HttpGateway {
    async fn ask(&self, query: &str) -> DashboardResult<AskResponse> {
        let body = AskRequest {
            query: query.to_string(),
        };
        self.post_json(ASK_ENDPOINT, &body).await
    }

    async fn generate_report(&self, country: &str) -> DashboardResult<PolicyBrief> {
        let body = ReportRequest {
            country: country.to_string(),
        };
        self.post_json(REPORT_ENDPOINT, &body).await
    }
}

#[async_trait]
impl GraphSource for HttpGateway {
    async fn fetch_graph(&self, query: &GraphQuery) -> DashboardResult<GraphData> {
        let params = [
            ("search", query.search.as_str()),
            ("category", query.category.as_str()),
            ("type", query.kind.as_str()),
        ];
        self.get_json(GRAPH_ENDPOINT, &params).await
    }

    async fn fetch_filters(&self) -> DashboardResult<FilterOptions> {
        self.get_json(FILTERS_ENDPOINT, &[]).await
    }
}

#[async_trait]
impl DocumentAnalyzer for HttpGateway {
    async fn analyze_document(&self, file_name: &str, bytes: Vec<u8>) -> DashboardResult<DocumentAnalysis> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(PDF_MIME)
            .map_err(|e| DashboardError::Transport {
                endpoint: UPLOAD_ENDPOINT.to_string(),
                reason: e.to_string(),
            })?;
        let form = Form::new().part("file", part);
        self.post_multipart(UPLOAD_ENDPOINT, form).await
    }
}
