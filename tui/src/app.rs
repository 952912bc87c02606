//! Application state for the terminal UI.
//!
//! Network calls run as tasks on the tokio runtime and report back over an
//! unbounded channel; the UI thread drains that channel once per tick and is
//! the only place state is mutated. Every dashboard load carries the
//! generation it was issued under; a slow load finishing after a newer one
//! is dropped, whether it succeeded or failed.

use std::{path::Path, sync::Arc};

use tokio::{
    runtime::Handle,
    sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender},
};
use tracing::{debug, error, info};

use verdant_charts::{ChartRenderer, Dashboard, FrameOutcome, RetainedBackend};
use verdant_contracts::{
    assistant::{AskResponse, DocumentAnalysis, PolicyBrief},
    chart::DashboardFrame,
    error::DashboardResult,
    graph::{FilterOptions, GraphData, GraphNode},
};
use verdant_core::{
    analyzer::{Analyzer, PendingAnalysis},
    chat::{ChatPanel, PendingQuery, PendingReport},
    config::DashboardConfig,
    countries::{CountryInputs, SelectInput},
    graph::GraphView,
    shell::Shell,
    traits::{DashboardTrigger, DocumentAnalyzer, GraphSource, PolicyAssistant, TelemetrySource},
    DashboardLoader,
};

/// Everything the UI talks to. `HttpGateway` in production, fakes in tests.
pub trait Backend: TelemetrySource + PolicyAssistant + GraphSource + DocumentAnalyzer + Clone + 'static {}

impl<T> Backend for T where T: TelemetrySource + PolicyAssistant + GraphSource + DocumentAnalyzer + Clone + 'static {}

/// Results sent back from background tasks.
pub enum Reply {
    /// A dashboard load and the generation it was issued under.
    Frame(u64, DashboardResult<DashboardFrame>),
    Answer(PendingQuery, DashboardResult<AskResponse>),
    Report(PendingReport, DashboardResult<PolicyBrief>),
    Graph(DashboardResult<GraphData>),
    Filters(DashboardResult<FilterOptions>),
    Analysis(PendingAnalysis, DashboardResult<DocumentAnalysis>),
}

/// Which country select has focus on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    Primary,
    Comparison,
}

// ── Load spawner ──────────────────────────────────────────────────────────────

/// `DashboardTrigger` that runs each load as a task on the runtime.
struct LoadSpawner<'a, S> {
    loader: Arc<DashboardLoader<S>>,
    runtime: &'a Handle,
    tx: &'a UnboundedSender<Reply>,
    spawned: usize,
}

impl<'a, S> LoadSpawner<'a, S> {
    fn new(loader: Arc<DashboardLoader<S>>, runtime: &'a Handle, tx: &'a UnboundedSender<Reply>) -> Self {
        Self {
            loader,
            runtime,
            tx,
            spawned: 0,
        }
    }
}

impl<S: TelemetrySource + 'static> DashboardTrigger for LoadSpawner<'_, S> {
    fn load_dashboard(&mut self, inputs: &CountryInputs) {
        let Some(selection) = inputs.selection() else {
            debug!("no primary country; dashboard load skipped");
            return;
        };
        let loader = Arc::clone(&self.loader);
        let generation = loader.issue_generation();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = loader.load_as(generation, &selection).await;
            let _ = tx.send(Reply::Frame(generation, result));
        });
        self.spawned += 1;
    }
}

// ── App state ─────────────────────────────────────────────────────────────────

pub struct App<G: Backend> {
    pub shell: Shell,
    pub dashboard: Dashboard<G, RetainedBackend>,
    pub chat: ChatPanel,
    pub graph: GraphView,
    pub analyzer: Analyzer,

    /// Text typed into the chat box.
    pub chat_input: String,
    /// Path typed into the analyzer's file box.
    pub path_input: String,
    /// True while keystrokes go to the graph search box.
    pub search_editing: bool,
    pub picker: Picker,
    /// Highlighted option in the primary and comparison selects.
    pub picker_cursor: [usize; 2],
    /// Highlighted node in the graph list.
    pub node_cursor: usize,

    /// Dashboard loads not yet answered.
    pub loads_in_flight: usize,
    /// Graph fetches not yet answered.
    pub graph_loads_in_flight: usize,
    /// Last user-facing problem, cleared by the next successful action.
    pub status: Option<String>,

    gateway: G,
    runtime: Handle,
    tx: UnboundedSender<Reply>,
    rx: UnboundedReceiver<Reply>,
    in_flight: usize,
}

impl<G: Backend> App<G> {
    pub fn new(gateway: G, config: &DashboardConfig, runtime: Handle) -> Self {
        let loader = Arc::new(DashboardLoader::new(gateway.clone(), config.palette.clone()));
        let renderer = ChartRenderer::new(RetainedBackend::new(), config.annotations);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            shell: Shell::new(),
            dashboard: Dashboard::new(loader, renderer),
            chat: ChatPanel::new(),
            graph: GraphView::new(),
            analyzer: Analyzer::new(),
            chat_input: String::new(),
            path_input: String::new(),
            search_editing: false,
            picker: Picker::Primary,
            picker_cursor: [0, 0],
            node_cursor: 0,
            loads_in_flight: 0,
            graph_loads_in_flight: 0,
            status: None,
            gateway,
            runtime,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Initial fetches: the graph and its filter options.
    pub fn start(&mut self) {
        info!("starting terminal UI");
        self.refresh_graph();
        self.load_filters();
    }

    pub fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    pub fn is_graph_loading(&self) -> bool {
        self.graph_loads_in_flight > 0
    }

    /// No background request is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = Reply> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(task.await);
        });
        self.in_flight += 1;
    }

    // ── Replies ───────────────────────────────────────────────────────────────

    /// Apply every reply that has arrived. Returns how many were handled.
    pub fn drain_replies(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.rx.try_recv() {
                Ok(reply) => {
                    self.handle_reply(reply);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    fn handle_reply(&mut self, reply: Reply) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match reply {
            Reply::Frame(generation, result) => {
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
                match result {
                    Ok(frame) => match self.dashboard.apply_frame(&frame) {
                        Ok(FrameOutcome::Rendered) => self.status = None,
                        Ok(FrameOutcome::Stale) => {}
                        Err(e) => self.status = Some(format!("chart error: {}", e)),
                    },
                    Err(e) if self.dashboard.is_current(generation) => {
                        self.status = Some(format!("telemetry load failed: {}", e))
                    }
                    Err(e) => debug!(generation, error = %e, "ignoring failure of superseded load"),
                }
            }
            Reply::Answer(pending, result) => self.chat.finish_query(pending, result),
            Reply::Report(pending, result) => self.chat.finish_report(pending, result),
            Reply::Graph(Ok(data)) => {
                self.graph_loads_in_flight = self.graph_loads_in_flight.saturating_sub(1);
                self.graph.show(data);
                self.node_cursor = 0;
                self.hover_current();
            }
            Reply::Graph(Err(e)) => {
                self.graph_loads_in_flight = self.graph_loads_in_flight.saturating_sub(1);
                error!(error = %e, "graph fetch error");
                self.status = Some(format!("graph load failed: {}", e));
            }
            Reply::Filters(Ok(filters)) => self.graph.set_filters(filters),
            Reply::Filters(Err(e)) => {
                error!(error = %e, "filter fetch error");
            }
            Reply::Analysis(pending, result) => self.analyzer.finish(pending, result),
        }
    }

    // ── Dashboard ─────────────────────────────────────────────────────────────

    pub fn focused_select(&self) -> &SelectInput {
        match self.picker {
            Picker::Primary => &self.shell.countries.primary,
            Picker::Comparison => &self.shell.countries.comparison,
        }
    }

    fn picker_index(&self) -> usize {
        match self.picker {
            Picker::Primary => 0,
            Picker::Comparison => 1,
        }
    }

    pub fn toggle_picker(&mut self) {
        self.picker = match self.picker {
            Picker::Primary => Picker::Comparison,
            Picker::Comparison => Picker::Primary,
        };
    }

    pub fn move_picker_cursor(&mut self, delta: isize) {
        let len = self.focused_select().options().len();
        let idx = self.picker_index();
        self.picker_cursor[idx] = step(self.picker_cursor[idx], delta, len);
    }

    /// Choose the highlighted option; a change reloads the dashboard.
    pub fn choose_option(&mut self) {
        let idx = self.picker_index();
        let Some(value) = self
            .focused_select()
            .options()
            .get(self.picker_cursor[idx])
            .map(|o| o.value.clone())
        else {
            return;
        };
        let result = match self.picker {
            Picker::Primary => self.shell.countries.select_primary(&value),
            Picker::Comparison => self.shell.countries.select_comparison(&value),
        };
        match result {
            Ok(()) => {
                self.status = None;
                self.request_dashboard();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Load whatever the country selects currently hold.
    pub fn request_dashboard(&mut self) {
        let mut spawner = LoadSpawner::new(self.dashboard.loader(), &self.runtime, &self.tx);
        spawner.load_dashboard(&self.shell.countries);
        let spawned = spawner.spawned;
        self.loads_in_flight += spawned;
        self.in_flight += spawned;
    }

    /// Move the select cursors onto the selected values.
    fn sync_picker_cursors(&mut self) {
        for (slot, input) in [&self.shell.countries.primary, &self.shell.countries.comparison]
            .into_iter()
            .enumerate()
        {
            if let Some(pos) = input.options().iter().position(|o| o.value == input.value()) {
                self.picker_cursor[slot] = pos;
            }
        }
    }

    // ── Graph ─────────────────────────────────────────────────────────────────

    pub fn current_node(&self) -> Option<&GraphNode> {
        self.graph.data().nodes.get(self.node_cursor)
    }

    fn hover_current(&mut self) {
        let node = self.current_node().cloned();
        self.graph.tooltip.blur();
        if let Some(node) = node {
            self.graph.tooltip.hover(&node);
        }
    }

    pub fn move_node_cursor(&mut self, delta: isize) {
        self.node_cursor = step(self.node_cursor, delta, self.graph.data().nodes.len());
        self.hover_current();
    }

    /// Pin or unpin the highlighted node's tooltip.
    pub fn toggle_pin(&mut self) {
        let node = self.current_node().cloned();
        self.graph.tooltip.double_click(node.as_ref());
        if self.graph.tooltip.pinned().is_none() {
            self.hover_current();
        }
    }

    /// Click on empty canvas: releases a pinned tooltip.
    pub fn click_background(&mut self) {
        self.graph.tooltip.click(None);
        self.hover_current();
    }

    pub fn refresh_graph(&mut self) {
        let source = self.gateway.clone();
        let query = self.graph.query.clone();
        debug!(search = %query.search, category = %query.category, kind = %query.kind, "graph refresh");
        self.spawn(async move { Reply::Graph(source.fetch_graph(&query).await) });
        self.graph_loads_in_flight += 1;
    }

    fn load_filters(&mut self) {
        let source = self.gateway.clone();
        self.spawn(async move { Reply::Filters(source.fetch_filters().await) });
    }

    pub fn reset_graph_query(&mut self) {
        self.graph.reset_query();
        self.refresh_graph();
    }

    /// Step the category filter through "all" and each offered category.
    pub fn cycle_category(&mut self) {
        self.graph.query.category = next_filter(&self.graph.query.category, &self.graph.filters().categories);
        self.refresh_graph();
    }

    pub fn cycle_type(&mut self) {
        self.graph.query.kind = next_filter(&self.graph.query.kind, &self.graph.filters().types);
        self.refresh_graph();
    }

    /// Follow the visible tooltip's telemetry link onto the dashboard.
    pub fn open_tooltip_telemetry(&mut self) {
        let Some(country) = self.graph.tooltip_country() else {
            self.status = Some("this policy has no telemetry link".to_string());
            return;
        };
        self.open_telemetry(&country);
    }

    pub fn open_telemetry(&mut self, country: &str) {
        let mut spawner = LoadSpawner::new(self.dashboard.loader(), &self.runtime, &self.tx);
        let result = self.shell.open_telemetry(country, &mut spawner);
        let spawned = spawner.spawned;
        self.loads_in_flight += spawned;
        self.in_flight += spawned;

        self.picker = Picker::Primary;
        self.sync_picker_cursors();
        match result {
            Ok(()) => self.status = None,
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    // ── Chat ──────────────────────────────────────────────────────────────────

    pub fn submit_chat(&mut self) {
        let text = std::mem::take(&mut self.chat_input);
        let Some(pending) = self.chat.begin_query(&text) else { return };
        let assistant = self.gateway.clone();
        self.spawn(async move {
            let result = assistant.ask(&pending.query).await;
            Reply::Answer(pending, result)
        });
    }

    pub fn request_report(&mut self) {
        let Some(pending) = self.chat.begin_report(&self.shell.countries) else { return };
        let assistant = self.gateway.clone();
        self.spawn(async move {
            let result = assistant.generate_report(&pending.country).await;
            Reply::Report(pending, result)
        });
    }

    // ── Analyzer ──────────────────────────────────────────────────────────────

    /// Read the file named in the path box and make it the analyzer's file.
    pub fn select_document(&mut self) {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            return;
        }
        let name = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        let result = std::fs::read(&path)
            .map_err(|e| format!("cannot read {}: {}", path, e))
            .and_then(|bytes| self.analyzer.select_file(&name, bytes).map_err(|e| e.to_string()));
        match result {
            Ok(()) => self.status = None,
            Err(e) => self.status = Some(e),
        }
    }

    pub fn analyze_document(&mut self) {
        let Some(pending) = self.analyzer.begin() else { return };
        let service = self.gateway.clone();
        self.spawn(async move {
            let result = service.analyze_document(&pending.file_name, pending.bytes.clone()).await;
            Reply::Analysis(pending, result)
        });
    }

    /// Clear the analyzer and its path box. Ignored while a run is in flight.
    pub fn clear_document(&mut self) {
        if self.analyzer.clear() {
            self.path_input.clear();
            self.status = None;
        }
    }
}

/// Move `current` by `delta` within `0..len`, clamping at both ends.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

/// The value after `current` in `["", options...]`, wrapping.
fn next_filter(current: &str, options: &[String]) -> String {
    let pos = options.iter().position(|o| o == current);
    match pos {
        None if current.is_empty() => options.first().cloned().unwrap_or_default(),
        None => String::new(),
        Some(i) => options.get(i + 1).cloned().unwrap_or_default(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
