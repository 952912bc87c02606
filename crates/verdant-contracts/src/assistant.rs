//! Policy assistant request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Successful answer from `POST /api/ask`. `answer` is markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Value>,
}

/// Body of `POST /api/generate_report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub country: String,
}

/// A generated policy brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyBrief {
    #[serde(default)]
    pub country: String,
    pub report_md: String,
    #[serde(default)]
    pub sources: Vec<Value>,
}

/// Result of `POST /api/upload_policy`. `answer` is markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Value>,
}
