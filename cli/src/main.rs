//! VERDANT Policy Dashboard - command-line client
//!
//! Talks to the policy backend through the same gateway, loader, and chart
//! renderer the terminal UI uses, and prints the results.
//!
//! Usage:
//!   cargo run -p verdant-cli -- countries
//!   cargo run -p verdant-cli -- telemetry --country Japan --compare Italy
//!   cargo run -p verdant-cli -- telemetry --country Japan --json
//!   cargo run -p verdant-cli -- ask "which countries price carbon?"
//!   cargo run -p verdant-cli -- report --country Norway
//!   cargo run -p verdant-cli -- graph --search solar
//!   cargo run -p verdant-cli -- filters
//!   cargo run -p verdant-cli -- analyze ./climate_act.pdf

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use verdant_charts::{ChartRenderer, Dashboard, FrameOutcome, RetainedBackend};
use verdant_client::HttpGateway;
use verdant_contracts::{
    chart::{CanvasId, ChartSpec},
    chat::{ChatBody, Sender},
    error::{DashboardError, DashboardResult},
    telemetry::Metric,
};
use verdant_core::{
    analyzer::Analyzer,
    chat::ChatPanel,
    config::DashboardConfig,
    countries::{CountryInputs, SUPPORTED_COUNTRIES},
    graph::GraphView,
    traits::PolicyAssistant,
    DashboardLoader,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// VERDANT: environmental policy dashboard client.
#[derive(Parser)]
#[command(
    name = "verdant",
    about = "VERDANT policy dashboard client",
    long_about = "Loads country telemetry, asks the policy assistant, analyzes policy\n\
                  documents, and browses the policy relationship graph served by a\n\
                  VERDANT backend."
)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend URL from the config.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the countries the dashboard offers.
    Countries,
    /// Load the dashboard for one country, optionally compared with another.
    Telemetry {
        #[arg(long)]
        country: String,
        #[arg(long)]
        compare: Option<String>,
        /// Print the full chart specs as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Ask the policy assistant a question.
    Ask {
        query: String,
    },
    /// Generate a formal policy brief for a country.
    Report {
        #[arg(long)]
        country: String,
    },
    /// Print the policy relationship graph.
    Graph {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long = "type", default_value = "")]
        kind: String,
    },
    /// Print the graph filter options.
    Filters,
    /// Upload a policy PDF for analysis.
    Analyze {
        path: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match load_config(cli.config.as_deref(), cli.base_url.as_deref()) {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("verdant error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>, base_url: Option<&str>) -> DashboardResult<DashboardConfig> {
    let config = match path {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    match base_url {
        Some(url) => config.with_base_url(url),
        None => Ok(config),
    }
}

async fn run(command: Command, config: DashboardConfig) -> DashboardResult<()> {
    info!(base_url = %config.base_url, "using backend");
    match command {
        Command::Countries => {
            print_countries();
            Ok(())
        }
        Command::Telemetry { country, compare, json } => {
            run_telemetry(&config, &country, compare.as_deref(), json).await
        }
        Command::Ask { query } => run_ask(&config, &query).await,
        Command::Report { country } => run_report(&config, &country).await,
        Command::Graph { search, category, kind } => run_graph(&config, search, category, kind).await,
        Command::Filters => run_filters(&config).await,
        Command::Analyze { path } => run_analyze(&config, &path).await,
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn print_countries() {
    for country in SUPPORTED_COUNTRIES.iter() {
        println!("{:<16} {}", country.name, country.iso2);
    }
}

async fn run_telemetry(
    config: &DashboardConfig,
    country: &str,
    compare: Option<&str>,
    json: bool,
) -> DashboardResult<()> {
    let mut inputs = CountryInputs::new();
    inputs.select_primary(country)?;
    if let Some(other) = compare {
        inputs.select_comparison(other)?;
    }

    let gateway = HttpGateway::from_config(config)?;
    let loader = Arc::new(DashboardLoader::new(gateway, config.palette.clone()));
    let renderer = ChartRenderer::new(RetainedBackend::new(), config.annotations);
    let mut dashboard = Dashboard::new(loader, renderer);

    match dashboard.load_dashboard(&inputs).await? {
        Some(FrameOutcome::Rendered) => {}
        Some(FrameOutcome::Stale) | None => {
            return Err(DashboardError::InvalidSelection {
                reason: "dashboard load produced no charts".to_string(),
            });
        }
    }

    let backend = dashboard.renderer().backend();
    for metric in Metric::ALL {
        let canvas = CanvasId::from(metric);
        let Some(spec) = backend.spec_for(&canvas) else { continue };
        if json {
            let out = serde_json::to_string_pretty(spec).map_err(|e| DashboardError::Render {
                canvas: canvas.to_string(),
                reason: e.to_string(),
            })?;
            println!("{}", out);
        } else {
            print_chart_summary(&canvas, spec);
        }
    }
    Ok(())
}

async fn run_ask(config: &DashboardConfig, query: &str) -> DashboardResult<()> {
    let gateway = HttpGateway::from_config(config)?;
    let mut chat = ChatPanel::new();
    let Some(pending) = chat.begin_query(query) else {
        return Err(DashboardError::InvalidSelection {
            reason: "query is empty".to_string(),
        });
    };
    let result = gateway.ask(&pending.query).await;
    let failed = result.is_err();
    chat.finish_query(pending, result);
    print_transcript(&chat);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_report(config: &DashboardConfig, country: &str) -> DashboardResult<()> {
    let mut inputs = CountryInputs::new();
    inputs.select_primary(country)?;

    let gateway = HttpGateway::from_config(config)?;
    let mut chat = ChatPanel::new();
    let Some(pending) = chat.begin_report(&inputs) else {
        print_transcript(&chat);
        std::process::exit(1);
    };
    let result = gateway.generate_report(&pending.country).await;
    let failed = result.is_err();
    chat.finish_report(pending, result);
    print_transcript(&chat);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_graph(
    config: &DashboardConfig,
    search: String,
    category: String,
    kind: String,
) -> DashboardResult<()> {
    let gateway = HttpGateway::from_config(config)?;
    let mut view = GraphView::new();
    view.query.search = search;
    view.query.category = category;
    view.query.kind = kind;
    view.refresh(&gateway).await?;

    println!("Legend:");
    for (group, color) in view.palette().legend() {
        println!("  {:<24} {}", group, color.background);
    }
    println!();
    println!("Nodes ({}):", view.data().nodes.len());
    for node in &view.data().nodes {
        match node.telemetry_country() {
            Some(country) => println!("  [{}] {}  (telemetry: {})", node.group, node.label, country),
            None => println!("  [{}] {}", node.group, node.label),
        }
    }
    println!();
    println!("Edges ({}):", view.data().edges.len());
    for edge in &view.data().edges {
        println!("  {} -> {}", edge.from, edge.to);
    }
    Ok(())
}

async fn run_filters(config: &DashboardConfig) -> DashboardResult<()> {
    let gateway = HttpGateway::from_config(config)?;
    let mut view = GraphView::new();
    view.load_filters(&gateway).await?;
    println!("Categories: {}", view.filters().categories.join(", "));
    println!("Types:      {}", view.filters().types.join(", "));
    Ok(())
}

async fn run_analyze(config: &DashboardConfig, path: &Path) -> DashboardResult<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = std::fs::read(path).map_err(|e| DashboardError::InvalidSelection {
        reason: format!("cannot read {}: {}", path.display(), e),
    })?;

    let gateway = HttpGateway::from_config(config)?;
    let mut analyzer = Analyzer::new();
    analyzer.select_file(&name, bytes)?;
    analyzer.analyze(&gateway).await;

    let Some(result) = analyzer.result() else {
        return Ok(());
    };
    if let Some(heading) = result.heading() {
        eprintln!("{}: {}", heading, result.text());
        std::process::exit(1);
    }
    println!("{}", result.text());
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_chart_summary(canvas: &CanvasId, spec: &ChartSpec) {
    println!("{}  [{}]", canvas, spec.y_axis.title);
    for series in &spec.series {
        let points = series.data.iter().flatten().count();
        let latest = spec
            .labels
            .iter()
            .zip(&series.data)
            .rev()
            .find_map(|(year, value)| value.map(|v| (*year, v)));
        match latest {
            Some((year, value)) => println!(
                "  {:<28} {:>3} points, latest {:.2} ({})",
                series.label, points, value, year
            ),
            None => println!("  {:<28} no data", series.label),
        }
    }
    for marker in &spec.annotations {
        println!("  | {}  {}", marker.value, marker.label);
    }
    println!();
}

fn print_transcript(chat: &ChatPanel) {
    for message in chat.messages() {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Assistant => "assistant",
        };
        match &message.body {
            ChatBody::Report(md) => {
                println!("{}:", who);
                println!("{}", md);
            }
            body => println!("{}: {}", who, body.text()),
        }
    }
}
