//! Rendering for the terminal UI.
//!
//! Layout:
//!   ┌─── header ──────────────────────────────────────────────────────────┐
//!   │  VERDANT   [1] graph  [2] dashboard  [3] chat  [4] analyzer  ...    │
//!   ├─── body (active view) ──────────────────────────────────────────────┤
//!   │  graph:     node list │ legend, filters, tooltip                    │
//!   │  dashboard: selects   │ CO2 / renewables / AQI charts               │
//!   │  chat:      transcript, input box                                   │
//!   │  analyzer:  file box, results panel                                 │
//!   ├─────────────────────────────────────────────────────────────────────┤
//!   │  footer (key bindings, status)                                      │
//!   └─────────────────────────────────────────────────────────────────────┘

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use verdant_contracts::{
    chart::{CanvasId, ChartSpec},
    chat::{ChatBody, Sender},
    telemetry::Metric,
};
use verdant_core::{countries::SelectInput, shell::View};

use crate::app::{App, Backend, Picker};

const ACCENT: Color = Color::Rgb(13, 148, 136);

pub fn ui<G: Backend>(f: &mut Frame, app: &App<G>) {
    let full = f.area();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(10),   // active view
            Constraint::Length(3), // footer
        ])
        .split(full);

    render_header(f, outer[0], app);
    match app.shell.active() {
        View::Graph => render_graph(f, outer[1], app),
        View::Dashboard => render_dashboard(f, outer[1], app),
        View::Chat => render_chat(f, outer[1], app),
        View::Analyzer => render_analyzer(f, outer[1], app),
    }
    render_footer(f, outer[2], app);

    if app.shell.help_open() {
        render_help(f, full);
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_header<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let title_style = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let mut spans: Vec<Span> = vec![Span::styled("VERDANT Policy Dashboard    ", title_style)];

    for (i, view) in View::ALL.iter().enumerate() {
        let style = if app.shell.is_active(*view) {
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}] {}  ", i + 1, view.name()), style));
    }

    let busy = if app.is_loading() {
        Some("  loading telemetry...")
    } else if app.is_graph_loading() {
        Some("  loading graph...")
    } else if app.analyzer.is_busy() {
        Some("  analyzing document...")
    } else {
        None
    };
    if let Some(label) = busy {
        spans.push(Span::styled(
            label,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    } else if !app.is_idle() {
        spans.push(Span::styled("  working...", Style::default().fg(Color::DarkGray)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(header, area);
}

// ── Graph view ────────────────────────────────────────────────────────────────

fn render_graph<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let items: Vec<ListItem> = app
        .graph
        .data()
        .nodes
        .iter()
        .map(|node| {
            let color = app
                .graph
                .color_of(node)
                .and_then(|c| parse_css_color(c.background))
                .unwrap_or(Color::Gray);
            let pin = if app.graph.tooltip.pinned() == Some(node.id.as_str()) { " *" } else { "" };
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::raw(truncate(&node.label, 48)),
                Span::styled(pin, Style::default().fg(Color::Yellow)),
            ]))
        })
        .collect();

    let title = format!(
        "Policies ({} nodes, {} links)",
        app.graph.data().nodes.len(),
        app.graph.data().edges.len()
    );
    let list = List::new(items)
        .block(panel(&title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(app.current_node().map(|_| app.node_cursor));
    f.render_stateful_widget(list, cols[0], &mut state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(7), Constraint::Min(5)])
        .split(cols[1]);

    render_graph_query(f, right[0], app);
    render_legend(f, right[1], app);
    render_tooltip(f, right[2], app);
}

fn render_graph_query<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let query = &app.graph.query;
    let search_style = if app.search_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if app.search_editing { "_" } else { "" };
    let or_all = |v: &str| if v.is_empty() { "all".to_string() } else { v.to_string() };

    let lines = vec![
        Line::from(vec![
            Span::styled("search:   ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}{}", query.search, cursor), search_style),
        ]),
        Line::from(vec![
            Span::styled("category: ", Style::default().fg(Color::DarkGray)),
            Span::raw(or_all(&query.category)),
        ]),
        Line::from(vec![
            Span::styled("type:     ", Style::default().fg(Color::DarkGray)),
            Span::raw(or_all(&query.kind)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(panel("Filters")), area);
}

fn render_legend<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let items: Vec<ListItem> = app
        .graph
        .palette()
        .legend()
        .iter()
        .map(|(group, color)| {
            let fg = parse_css_color(color.background).unwrap_or(Color::Gray);
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(fg)),
                Span::raw(group.clone()),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(panel("Categories")), area);
}

fn render_tooltip<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let node = app.graph.tooltip.visible().and_then(|id| app.graph.node(id));
    let title = if app.graph.tooltip.pinned().is_some() { "Details (pinned)" } else { "Details" };

    let lines: Vec<Line> = match node.and_then(|n| n.title.as_deref()) {
        Some(html) => {
            let mut lines: Vec<Line> = tooltip_lines(html).into_iter().map(Line::from).collect();
            if let Some(country) = node.and_then(|n| n.telemetry_country()) {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("[t] ", Style::default().fg(ACCENT)),
                    Span::raw(format!("view {} telemetry", country)),
                ]));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "move onto a policy to see its details",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(
        Paragraph::new(lines).block(panel(title)).wrap(Wrap { trim: true }),
        area,
    );
}

// ── Dashboard view ────────────────────────────────────────────────────────────

fn render_dashboard<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    let pickers = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(cols[0]);

    let countries = &app.shell.countries;
    render_select(f, pickers[0], "Country", &countries.primary, app.picker_cursor[0], app.picker == Picker::Primary);
    render_select(
        f,
        pickers[1],
        "Compare with",
        &countries.comparison,
        app.picker_cursor[1],
        app.picker == Picker::Comparison,
    );

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(cols[1]);

    let backend = app.dashboard.renderer().backend();
    for (metric, area) in Metric::ALL.into_iter().zip(charts.iter()) {
        let canvas = CanvasId::from(metric);
        match backend.spec_for(&canvas) {
            Some(spec) => render_chart(f, *area, metric_title(metric), spec),
            None => {
                let hint = Paragraph::new(Span::styled(
                    "choose a country to load telemetry",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(panel(metric_title(metric)));
                f.render_widget(hint, *area);
            }
        }
    }
}

fn metric_title(metric: Metric) -> &'static str {
    match metric {
        Metric::Co2 => "CO2 Emissions",
        Metric::Renewables => "Renewable Energy",
        Metric::Aqi => "Air Quality (PM2.5)",
    }
}

fn render_select(f: &mut Frame, area: Rect, title: &str, input: &SelectInput, cursor: usize, focused: bool) {
    let items: Vec<ListItem> = input
        .options()
        .iter()
        .map(|opt| {
            let mut style = Style::default();
            if opt.disabled {
                style = style.fg(Color::DarkGray);
            }
            if opt.value == input.value() && !opt.value.is_empty() {
                style = style.fg(ACCENT).add_modifier(Modifier::BOLD);
            }
            let mark = if opt.value == input.value() { "● " } else { "  " };
            ListItem::new(Span::styled(format!("{}{}", mark, opt.label), style))
        })
        .collect();

    let border = if focused { ACCENT } else { Color::DarkGray };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let mut state = ListState::default().with_selected(focused.then_some(cursor));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_chart(f: &mut Frame, area: Rect, title: &str, spec: &ChartSpec) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let series_points: Vec<Vec<(f64, f64)>> = spec
        .series
        .iter()
        .map(|s| {
            spec.labels
                .iter()
                .zip(&s.data)
                .filter_map(|(year, v)| v.map(|v| (f64::from(*year), v)))
                .collect()
        })
        .collect();

    let (y_min, y_max) = value_bounds(&series_points);
    let (x_min, x_max) = year_bounds(&spec.labels);

    let marker_points: Vec<[(f64, f64); 2]> = spec
        .annotations
        .iter()
        .map(|a| [(f64::from(a.value), y_min), (f64::from(a.value), y_max)])
        .collect();

    let mut datasets: Vec<Dataset> = Vec::new();
    for (marker, points) in spec.annotations.iter().zip(&marker_points) {
        let color = parse_css_color(&marker.border_color).unwrap_or(Color::DarkGray);
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(points),
        );
    }
    for (series, points) in spec.series.iter().zip(&series_points) {
        let color = parse_css_color(&series.border_color).unwrap_or(Color::White);
        datasets.push(
            Dataset::default()
                .name(series.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(points),
        );
    }

    let axis_style = Style::default().fg(Color::Gray);
    let mut chart = Chart::new(datasets)
        .block(panel(title))
        .x_axis(
            Axis::default()
                .title(spec.x_axis.title.clone())
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format!("{:.0}", x_min)),
                    Span::raw(format!("{:.0}", (x_min + x_max) / 2.0)),
                    Span::raw(format!("{:.0}", x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_axis.title.clone())
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );
    if !spec.show_legend {
        chart = chart.legend_position(None);
    }
    f.render_widget(chart, rows[0]);

    let markers: Vec<Span> = spec
        .annotations
        .iter()
        .flat_map(|a| {
            let color = parse_css_color(&a.label_background).unwrap_or(Color::Gray);
            [
                Span::styled(format!(" {} ", a.value), Style::default().fg(Color::Black).bg(color)),
                Span::raw(format!(" {}  ", a.label)),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(markers)), rows[1]);
}

/// Y range covering every plotted value with a little headroom.
fn value_bounds(series: &[Vec<(f64, f64)>]) -> (f64, f64) {
    let mut values = series.iter().flatten().map(|(_, v)| *v);
    let Some(first) = values.next() else { return (0.0, 1.0) };
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn year_bounds(years: &[i32]) -> (f64, f64) {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => (f64::from(*first), f64::from(*last)),
        (Some(only), _) => (f64::from(*only) - 1.0, f64::from(*only) + 1.0),
        _ => (0.0, 1.0),
    }
}

// ── Chat view ─────────────────────────────────────────────────────────────────

fn render_chat<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.chat.messages() {
        let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
        let (who, who_color) = match message.sender {
            Sender::User => ("you", Color::Cyan),
            Sender::Assistant => ("assistant", ACCENT),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", time), Style::default().fg(Color::DarkGray)),
            Span::styled(who, Style::default().fg(who_color).add_modifier(Modifier::BOLD)),
        ]));

        let body_style = match &message.body {
            ChatBody::Pending(_) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ChatBody::Report(_) => Style::default().fg(Color::Green),
            ChatBody::Text(_) | ChatBody::Markdown(_) => Style::default(),
        };
        if matches!(message.body, ChatBody::Report(_)) {
            lines.push(Line::from(Span::styled(
                "── policy brief ──",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }
        for text in message.body.text().lines() {
            lines.push(Line::from(Span::styled(format!("  {}", text), body_style)));
        }
        lines.push(Line::from(""));
    }

    let inner_width = rows[0].width.saturating_sub(2).max(1) as usize;
    let inner_height = rows[0].height.saturating_sub(2) as usize;
    let wrapped: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let scroll = wrapped.saturating_sub(inner_height).min(u16::MAX as usize) as u16;

    let transcript = Paragraph::new(lines)
        .block(panel("Policy Assistant"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(transcript, rows[0]);

    let input_style = if app.chat.is_waiting() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let input = Paragraph::new(Span::styled(format!("> {}_", app.chat_input), input_style))
        .block(panel("Ask about environmental policy"));
    f.render_widget(input, rows[1]);
}

// ── Analyzer view ─────────────────────────────────────────────────────────────

fn render_analyzer<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let input_style = if app.analyzer.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let input = Paragraph::new(Span::styled(format!("> {}_", app.path_input), input_style))
        .block(panel("Path to a policy PDF"));
    f.render_widget(input, rows[0]);

    let selected = match app.analyzer.document() {
        Some(doc) if app.analyzer.is_busy() => Line::from(vec![
            Span::raw(format!("📎 {}   ", doc.name)),
            Span::styled("Analyzing...", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
        ]),
        Some(doc) => Line::from(vec![
            Span::raw(format!("📎 {}   ", doc.name)),
            Span::styled("[Ctrl-A] Analyze Document  [Ctrl-X] Clear", Style::default().fg(ACCENT)),
        ]),
        None => Line::from(Span::styled("no document selected", Style::default().fg(Color::DarkGray))),
    };
    f.render_widget(Paragraph::new(selected).block(panel("Document")), rows[1]);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(result) = app.analyzer.result() {
        if let Some(heading) = result.heading() {
            lines.push(Line::from(Span::styled(
                heading,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }
        let style = if result.is_error() { Style::default().fg(Color::Red) } else { Style::default() };
        for text in result.text().lines() {
            lines.push(Line::from(Span::styled(text.to_string(), style)));
        }
    }
    let results = Paragraph::new(lines)
        .block(panel("Analysis"))
        .wrap(Wrap { trim: false });
    f.render_widget(results, rows[2]);
}

// ── Footer & help ─────────────────────────────────────────────────────────────

fn key(k: &str) -> Span<'static> {
    Span::styled(format!("[{}] ", k), Style::default().fg(ACCENT))
}

fn render_footer<G: Backend>(f: &mut Frame, area: Rect, app: &App<G>) {
    let mut spans: Vec<Span> = vec![key("Tab"), Span::raw("Next view  ")];

    match app.shell.active() {
        View::Graph if app.search_editing => {
            spans.extend([key("Enter"), Span::raw("Search  "), key("Esc"), Span::raw("Cancel  ")]);
        }
        View::Graph => {
            spans.extend([
                key("↑↓"),
                Span::raw("Browse  "),
                key("Enter"),
                Span::raw("Pin  "),
                key("t"),
                Span::raw("Telemetry  "),
                key("/"),
                Span::raw("Search  "),
                key("c/y"),
                Span::raw("Category/Type  "),
                key("x"),
                Span::raw("Reset  "),
            ]);
        }
        View::Dashboard => {
            spans.extend([
                key("←→"),
                Span::raw("Select box  "),
                key("↑↓"),
                Span::raw("Browse  "),
                key("Enter"),
                Span::raw("Choose  "),
            ]);
        }
        View::Chat => {
            spans.extend([key("Enter"), Span::raw("Send  "), key("Ctrl-R"), Span::raw("Policy brief  ")]);
        }
        View::Analyzer => {
            spans.extend([
                key("Enter"),
                Span::raw("Choose file  "),
                key("Ctrl-A"),
                Span::raw("Analyze  "),
                key("Ctrl-X"),
                Span::raw("Clear  "),
            ]);
        }
    }

    spans.extend([key("F1"), Span::raw("Help  "), key("Ctrl-C"), Span::raw("Quit")]);

    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("   {}", truncate(status, 60)),
            Style::default().fg(Color::Red),
        ));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(footer, area);
}

fn render_help(f: &mut Frame, full: Rect) {
    let area = centered(full, 64, 18);
    let lines = vec![
        Line::from(Span::styled("How to use VERDANT", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("graph      browse policies; related policies share at least two tags."),
        Line::from("           pin a policy's details, then [t] opens its country telemetry."),
        Line::from("dashboard  pick a country, optionally a second one to compare."),
        Line::from("           dashed markers show policies enacted since 2010."),
        Line::from("chat       ask questions about the policy corpus, or press Ctrl-R"),
        Line::from("           for a formal brief on the dashboard's country."),
        Line::from("analyzer   type the path of a policy PDF, Enter to choose it,"),
        Line::from("           then Ctrl-A for an AI analysis of the document."),
        Line::from(""),
        Line::from(Span::styled("press Esc to close", Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title(" Help ").borders(Borders::ALL).border_style(Style::default().fg(ACCENT)))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn centered(full: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(full.width);
    let height = height.min(full.height);
    Rect {
        x: full.x + (full.width - width) / 2,
        y: full.y + (full.height - height) / 2,
        width,
        height,
    }
}

// ── Utility helpers ───────────────────────────────────────────────────────────

/// Truncate a string to at most `max` chars, appending "…" if truncated.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Parse `#rrggbb`, `#rrggbbaa`, or `rgba(r, g, b, a)` into a terminal color.
/// Alpha is ignored.
pub fn parse_css_color(css: &str) -> Option<Color> {
    let css = css.trim();
    if let Some(hex) = css.strip_prefix('#') {
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    let inner = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
    Some(Color::Rgb(parts.next()??, parts.next()??, parts.next()??))
}

/// Plain-text lines of a policy tooltip's HTML.
pub fn tooltip_lines(html: &str) -> Vec<String> {
    let mut text = String::new();
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            rest = &rest[open..];
            break;
        };
        let tag = rest[open + 1..open + close].trim().to_ascii_lowercase();
        if tag.starts_with("br") {
            text.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    text.push_str(rest);

    let text = text
        .replace("&rarr;", "→")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&quot;", "\"");

    let mut lines: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line.to_string());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}
