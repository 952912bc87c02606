//! VERDANT Policy Dashboard - interactive Ratatui TUI
//!
//! Four views share one terminal: the policy relationship graph, the
//! telemetry dashboard, the policy assistant chat, and the document analyzer. Network calls run on
//! a tokio runtime in the background; the event loop below only draws and
//! handles keys.
//!
//! Logs go to `verdant-tui.log` in the system temp directory so they do not
//! corrupt the screen. Set RUST_LOG=debug for verbose output.

mod app;
mod ui;

use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex, time::Duration};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use verdant_client::HttpGateway;
use verdant_core::{config::DashboardConfig, shell::View};

use app::{App, Backend};

/// Interactive terminal client for a VERDANT backend.
#[derive(Parser)]
#[command(name = "verdant-tui", about = "VERDANT policy dashboard (terminal UI)")]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the backend URL from the config.
    #[arg(long)]
    base_url: Option<String>,
}

const LOG_FILE: &str = "verdant-tui.log";
const TICK: Duration = Duration::from_millis(100);

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_logging() -> io::Result<PathBuf> {
    let path = std::env::temp_dir().join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(path)
}

fn load_config(args: &Args) -> Result<DashboardConfig, String> {
    let config = match &args.config {
        Some(path) => DashboardConfig::from_file(path).map_err(|e| e.to_string())?,
        None => DashboardConfig::default(),
    };
    match &args.base_url {
        Some(url) => config.with_base_url(url.as_str()).map_err(|e| e.to_string()),
        None => Ok(config),
    }
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Key handling ──────────────────────────────────────────────────────────────

/// What the event loop should do after a key.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key<G: Backend>(app: &mut App<G>, key: KeyEvent) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings.
    match key.code {
        KeyCode::Char('c') if ctrl => return Flow::Quit,
        KeyCode::Esc if app.shell.escape() => return Flow::Continue,
        KeyCode::F(1) => {
            app.shell.open_help();
            return Flow::Continue;
        }
        _ if app.shell.help_open() => return Flow::Continue,
        KeyCode::Tab if !app.search_editing => {
            app.shell.next_tab();
            return Flow::Continue;
        }
        _ => {}
    }

    match app.shell.active() {
        View::Chat => handle_chat_key(app, key, ctrl),
        View::Analyzer => handle_analyzer_key(app, key, ctrl),
        View::Graph if app.search_editing => handle_search_key(app, key),
        _ => handle_command_key(app, key),
    }
}

/// Keys on the graph and dashboard views, where letters are commands.
fn handle_command_key<G: Backend>(app: &mut App<G>, key: KeyEvent) -> Flow {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Flow::Quit,
        KeyCode::Char('?') => app.shell.open_help(),
        KeyCode::Char('1') => app.shell.switch_tab(View::Graph),
        KeyCode::Char('2') => app.shell.switch_tab(View::Dashboard),
        KeyCode::Char('3') => app.shell.switch_tab(View::Chat),
        KeyCode::Char('4') => app.shell.switch_tab(View::Analyzer),
        _ => {}
    }

    match app.shell.active() {
        View::Graph => match key.code {
            KeyCode::Up => app.move_node_cursor(-1),
            KeyCode::Down => app.move_node_cursor(1),
            KeyCode::PageUp => app.move_node_cursor(-10),
            KeyCode::PageDown => app.move_node_cursor(10),
            KeyCode::Enter => app.toggle_pin(),
            KeyCode::Backspace => app.click_background(),
            KeyCode::Char('t') => app.open_tooltip_telemetry(),
            KeyCode::Char('/') => app.search_editing = true,
            KeyCode::Char('c') => app.cycle_category(),
            KeyCode::Char('y') => app.cycle_type(),
            KeyCode::Char('x') => app.reset_graph_query(),
            KeyCode::Char('r') => app.refresh_graph(),
            _ => {}
        },
        View::Dashboard => match key.code {
            KeyCode::Left | KeyCode::Right => app.toggle_picker(),
            KeyCode::Up => app.move_picker_cursor(-1),
            KeyCode::Down => app.move_picker_cursor(1),
            KeyCode::PageUp => app.move_picker_cursor(-10),
            KeyCode::PageDown => app.move_picker_cursor(10),
            KeyCode::Enter => app.choose_option(),
            _ => {}
        },
        View::Chat | View::Analyzer => {}
    }
    Flow::Continue
}

fn handle_search_key<G: Backend>(app: &mut App<G>, key: KeyEvent) -> Flow {
    match key.code {
        KeyCode::Enter => {
            app.search_editing = false;
            app.refresh_graph();
        }
        KeyCode::Esc => app.search_editing = false,
        KeyCode::Backspace => {
            app.graph.query.search.pop();
        }
        KeyCode::Char(c) => app.graph.query.search.push(c),
        _ => {}
    }
    Flow::Continue
}

fn handle_chat_key<G: Backend>(app: &mut App<G>, key: KeyEvent, ctrl: bool) -> Flow {
    match key.code {
        KeyCode::Char('r') if ctrl => app.request_report(),
        KeyCode::Enter => app.submit_chat(),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(c) if !ctrl => app.chat_input.push(c),
        _ => {}
    }
    Flow::Continue
}

/// Letters go to the path box; Ctrl chords drive the analyzer.
fn handle_analyzer_key<G: Backend>(app: &mut App<G>, key: KeyEvent, ctrl: bool) -> Flow {
    match key.code {
        KeyCode::Char('a') if ctrl => app.analyze_document(),
        KeyCode::Char('x') if ctrl => app.clear_document(),
        KeyCode::Enter => app.select_document(),
        KeyCode::Backspace => {
            app.path_input.pop();
        }
        KeyCode::Char(c) if !ctrl => app.path_input.push(c),
        _ => {}
    }
    Flow::Continue
}

// ── Main event loop ───────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let args = Args::parse();
    let log_path = init_logging()?;

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("verdant-tui: {}", e);
            std::process::exit(1);
        }
    };
    let gateway = match HttpGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("verdant-tui: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let mut app = App::new(gateway, &config, runtime.handle().clone());
    app.start();

    loop {
        app.drain_replies();
        terminal.draw(|f| ui::ui(f, &app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, key) == Flow::Quit {
                    break;
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    runtime.shutdown_timeout(Duration::from_millis(200));
    println!("logs written to {}", log_path.display());
    Ok(())
}
