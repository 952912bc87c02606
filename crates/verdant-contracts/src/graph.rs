//! Policy relationship graph wire types.

use serde::{Deserialize, Serialize};

/// Marker the backend embeds in a node's tooltip HTML for the telemetry button.
const TELEMETRY_ACTION: &str = "openTelemetry('";

/// One policy in the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Policy category; drives node color.
    pub group: String,
    /// Tooltip HTML.
    #[serde(default)]
    pub title: Option<String>,
}

impl GraphNode {
    /// The country the tooltip's "view country telemetry" action points at.
    ///
    /// The backend escapes single quotes in the country name as `\'`.
    pub fn telemetry_country(&self) -> Option<String> {
        let html = self.title.as_deref()?;
        let start = html.find(TELEMETRY_ACTION)? + TELEMETRY_ACTION.len();
        let rest = &html[start..];

        let mut country = String::new();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => country.push(chars.next()?),
                '\'' => return (!country.is_empty()).then_some(country),
                other => country.push(other),
            }
        }
        None
    }
}

/// An undirected link between two policies sharing tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    /// Number of shared tags.
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `GET /api/graph`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// Body of `GET /api/filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// The graph query the user has typed or picked. Empty strings mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQuery {
    pub search: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
}
