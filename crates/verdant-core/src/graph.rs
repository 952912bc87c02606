//! View model for the policy relationship graph.
//!
//! Layout is the drawing host's concern. This module owns the parts with
//! rules: which color each policy category gets, the legend, the filter
//! inputs, and when a node's tooltip is shown or pinned.

use tracing::{debug, error};

use verdant_contracts::{
    error::DashboardResult,
    graph::{FilterOptions, GraphData, GraphNode, GraphQuery},
};

use crate::traits::GraphSource;

/// Fill and outline for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeColor {
    pub background: &'static str,
    pub border: &'static str,
}

/// Category colors, handed out in order of first appearance and reused
/// cyclically once exhausted.
pub const EARTHY_PALETTE: [NodeColor; 5] = [
    NodeColor { background: "#8b9d83", border: "#4a5944" },
    NodeColor { background: "#b59273", border: "#735a44" },
    NodeColor { background: "#7a8c99", border: "#4b5761" },
    NodeColor { background: "#c9b47c", border: "#8a7a50" },
    NodeColor { background: "#a18b96", border: "#63535d" },
];

/// Group → color assignments; doubles as the legend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPalette {
    assigned: Vec<(String, NodeColor)>,
}

impl GroupPalette {
    /// Assign colors to every group in `nodes`, in node order.
    pub fn from_nodes(nodes: &[GraphNode]) -> Self {
        let mut palette = Self::default();
        for node in nodes {
            palette.color_for(&node.group);
        }
        palette
    }

    /// The color for `group`, assigning the next palette entry if new.
    pub fn color_for(&mut self, group: &str) -> NodeColor {
        if let Some(color) = self.get(group) {
            return color;
        }
        let color = EARTHY_PALETTE[self.assigned.len() % EARTHY_PALETTE.len()];
        self.assigned.push((group.to_string(), color));
        color
    }

    pub fn get(&self, group: &str) -> Option<NodeColor> {
        self.assigned
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, c)| *c)
    }

    /// One entry per group, in assignment order.
    pub fn legend(&self) -> &[(String, NodeColor)] {
        &self.assigned
    }
}

/// Hover and pin state for the node tooltip.
///
/// A pinned tooltip ignores hover, blur, drag, and zoom; it is released by
/// double-clicking the same node again or clicking empty space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipState {
    visible: Option<String>,
    pinned: Option<String>,
}

impl TooltipState {
    /// The node whose tooltip is showing.
    pub fn visible(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    /// Pointer entered `node`. Nodes without tooltip content show nothing.
    pub fn hover(&mut self, node: &GraphNode) {
        if self.pinned.is_some() {
            return;
        }
        if node.title.is_some() {
            self.visible = Some(node.id.clone());
        }
    }

    /// Pointer left a node.
    pub fn blur(&mut self) {
        if self.pinned.is_none() {
            self.visible = None;
        }
    }

    /// Double-click, on `node` or on empty space.
    pub fn double_click(&mut self, node: Option<&GraphNode>) {
        let Some(node) = node else { return };
        if self.pinned.as_deref() == Some(node.id.as_str()) {
            self.pinned = None;
            self.visible = None;
        } else {
            self.pinned = Some(node.id.clone());
            self.visible = node.title.is_some().then(|| node.id.clone());
        }
    }

    /// Single click, on `node` or on empty space.
    pub fn click(&mut self, node: Option<&GraphNode>) {
        if self.pinned.is_some() && node.is_none() {
            self.pinned = None;
            self.visible = None;
        }
    }

    pub fn drag_start(&mut self) {
        self.blur();
    }

    pub fn zoom(&mut self) {
        self.blur();
    }
}

/// Everything the graph view shows.
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    data: GraphData,
    palette: GroupPalette,
    pub tooltip: TooltipState,
    pub query: GraphQuery,
    filters: FilterOptions,
}

impl GraphView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &GraphData {
        &self.data
    }

    pub fn palette(&self) -> &GroupPalette {
        &self.palette
    }

    pub fn filters(&self) -> &FilterOptions {
        &self.filters
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.data.nodes.iter().find(|n| n.id == id)
    }

    pub fn color_of(&self, node: &GraphNode) -> Option<NodeColor> {
        self.palette.get(&node.group)
    }

    /// Replace the drawn graph. Colors are reassigned from scratch.
    pub fn show(&mut self, data: GraphData) {
        self.palette = GroupPalette::from_nodes(&data.nodes);
        debug!(
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            groups = self.palette.legend().len(),
            "graph replaced"
        );
        self.data = data;
    }

    pub fn set_filters(&mut self, filters: FilterOptions) {
        self.filters = filters;
    }

    /// Clear search, category, and type.
    pub fn reset_query(&mut self) {
        self.query = GraphQuery::default();
    }

    /// Country behind the visible tooltip's telemetry action, if any.
    pub fn tooltip_country(&self) -> Option<String> {
        self.node(self.tooltip.visible()?)?.telemetry_country()
    }

    /// Fetch the graph for the current query and show it.
    ///
    /// On failure the error is logged and the previous graph stays up.
    pub async fn refresh(&mut self, source: &dyn GraphSource) -> DashboardResult<()> {
        match source.fetch_graph(&self.query).await {
            Ok(data) => {
                self.show(data);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, search = %self.query.search, "graph fetch error");
                Err(e)
            }
        }
    }

    /// Fetch the filter options for the category and type inputs.
    pub async fn load_filters(&mut self, source: &dyn GraphSource) -> DashboardResult<()> {
        let filters = source.fetch_filters().await.inspect_err(|e| {
            error!(error = %e, "filter fetch error");
        })?;
        self.set_filters(filters);
        Ok(())
    }
}
