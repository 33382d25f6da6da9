//! TUI rendering: one board per tab.
//!
//! ┌──────────────────────────────────────────────────────────────┐
//! │  📈 metricboard   node   tick 45   session 1a2b3c4d          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  node │ network │ explorer                                   │
//! ├────────────────────┬─────────────────────────────────────────┤
//! │  ▸ db_duration 4.2 │  ╭ db_duration  4.20 ms                 │
//! │    pow_duration    │  │       ⣀⡠⠔⠊                           │
//! │    ...             ├──────────────────┬──────────────────────┤
//! │                    │  p2p gauge       │  cards               │
//! ├────────────────────┴──────────────────┴──────────────────────┤
//! │  worldmap   authorized F1:4 B2:3   pending C3:1              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  tab: board   ↑↓ chart   p: pause   r: reset   q: quit       │
//! └──────────────────────────────────────────────────────────────┘

use metricboard_core::{NodeRange, RegionEntry};
use ratatui::{prelude::*, widgets::*};

use super::app::{App, BoardView, MapPanel};
use crate::commands::{format_value, metric_label};

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(1), // tabs
            Constraint::Min(10),   // board
            Constraint::Length(4), // worldmap
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_tabs(f, rows[1], app);
    match app.current() {
        Some(view) => draw_board(f, rows[2], app, view),
        None => {
            let p = Paragraph::new("This dashboard has no boards")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(p, rows[2]);
        }
    }
    draw_worldmap(f, rows[3], app.map());
    draw_status(f, rows[4], app);
    draw_keys(f, rows[5]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let board = app.current().map(|v| v.name.as_str()).unwrap_or("none");
    let tick = app.current().map(|v| v.tick).unwrap_or(0);
    let session = app.session_id();
    let short = session.get(..8).unwrap_or(&session);
    let state = if app.is_paused() {
        "  ⏸ paused"
    } else if app.feed_done() {
        "  feed ended"
    } else {
        ""
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 📈 metricboard ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("  board: "),
            Span::styled(board, Style::default().bold().fg(Color::Yellow)),
            Span::styled(
                format!(
                    "  tick {tick}  session {short}  {} ok / {} rejected{state} ",
                    app.applied(),
                    app.rejected()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles = app.views().iter().map(|v| format!(" {} ", v.name));
    let tabs = Tabs::new(titles)
        .select(app.tab())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().bold().fg(Color::Yellow))
        .divider("│");
    f.render_widget(tabs, area);
}

fn draw_board(f: &mut Frame, area: Rect, app: &App, view: &BoardView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    draw_chart_list(f, cols[0], app, view);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(cols[1]);

    draw_chart(f, right[0], app, view);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(right[1]);

    draw_gauges(f, bottom[0], view);
    draw_cards(f, bottom[1], view);
}

fn draw_chart_list(f: &mut Frame, area: Rect, app: &App, view: &BoardView) {
    let rows: Vec<Row> = view
        .charts
        .iter()
        .enumerate()
        .map(|(i, (key, chart))| {
            let is_cursor = i == app.cursor();
            let pointer = if is_cursor { "▸" } else { " " };
            let style = if is_cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                pointer.to_string(),
                metric_label(key).to_string(),
                format!("{:.2}", chart.latest()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),  // pointer
            Constraint::Min(20),    // metric
            Constraint::Length(10), // latest
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Charts ({}) ", view.charts.len())),
    );

    f.render_widget(table, area);
}

fn draw_chart(f: &mut Frame, area: Rect, app: &App, view: &BoardView) {
    let Some((key, chart)) = app.selected_chart() else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.name));
        let p = Paragraph::new("This board has no charts")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let latest = chart.latest();
    let [x_min, x_max] = chart.x_bounds();
    let [y_min, y_max] = chart.y_bounds();

    let datasets = vec![
        Dataset::default()
            .name(format!("{latest:.2}"))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&chart.points),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {}  {latest:.2} ms ", metric_label(key))),
        )
        .x_axis(Axis::default().bounds([x_min, x_max]).labels(vec![
            Line::from(format!("{x_min:.0}")),
            Line::from(format!("{x_max:.0}")),
        ]))
        .y_axis(Axis::default().bounds([y_min, y_max]).labels(vec![
            Line::from(format!("{y_min:.1}")),
            Line::from(format!("{y_max:.1}")),
        ]));

    f.render_widget(chart, area);
}

fn draw_gauges(f: &mut Frame, area: Rect, view: &BoardView) {
    let block = Block::default().borders(Borders::ALL).title(" Gauges ");
    if view.gauges.is_empty() {
        let p = Paragraph::new("none")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(view.gauges.iter().map(|_| Constraint::Length(3)))
        .split(inner);

    for ((key, gauge), slot) in view.gauges.iter().zip(slots.iter()) {
        let ratio = gauge.ratio();
        let color = if ratio >= 0.9 {
            Color::Red
        } else if ratio >= 0.6 {
            Color::Yellow
        } else {
            Color::Green
        };
        let widget = Gauge::default()
            .block(Block::default().title(metric_label(key).to_string()))
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(format!("{:.2} / {:.2}", gauge.value, gauge.max));
        f.render_widget(widget, *slot);
    }
}

fn draw_cards(f: &mut Frame, area: Rect, view: &BoardView) {
    let rows: Vec<Row> = view
        .cards
        .iter()
        .map(|(key, card)| {
            Row::new(vec![
                metric_label(key).to_string(),
                format_value(card.value),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(24), Constraint::Length(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Cards ({}) ", view.cards.len())),
    );
    f.render_widget(table, area);
}

fn region_spans<'a>(
    label: &'a str,
    entries: &'a [RegionEntry],
    range: NodeRange,
    color: Color,
) -> Line<'a> {
    let mut spans = vec![
        Span::styled(format!("{label:<11}"), Style::default().bold()),
        Span::styled(
            format!("{:>2} regions  {}..{}  ", entries.len(), range.min, range.max),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    for entry in entries {
        // The busiest regions stand out, as the map's largest markers would.
        let style = if range.max > range.min && entry.node_count == range.max {
            Style::default().fg(color).bold()
        } else {
            Style::default().fg(color)
        };
        spans.push(Span::styled(
            format!("{}:{} ", entry.region, entry.node_count),
            style,
        ));
    }
    Line::from(spans)
}

fn draw_worldmap(f: &mut Frame, area: Rect, map: &MapPanel) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Worldmap ({} updates) ", map.updates));

    let lines = match &map.model {
        Some(model) => vec![
            region_spans(
                "authorized",
                &model.authorized_entries,
                model.authorized_range,
                Color::Green,
            ),
            region_spans(
                "pending",
                &model.pending_entries,
                model.pending_range,
                Color::Yellow,
            ),
        ],
        None => vec![Line::from(Span::styled(
            "waiting for a worldmap update",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let failures = app.current().map(|v| v.failures.as_slice()).unwrap_or(&[]);
    let line = if let Some(first) = failures.first() {
        Span::styled(
            format!(" ⚠ {} failed: {first}", failures.len()),
            Style::default().fg(Color::Red),
        )
    } else if let Some(err) = app.last_error() {
        Span::styled(format!(" ✗ {err}"), Style::default().fg(Color::Red))
    } else {
        Span::styled(
            format!(
                " feed: {}  every {:.2}s",
                app.feed_label(),
                app.interval_secs()
            ),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(
        " tab/←→ board   ↑↓ chart   p: pause   r: reset session   +/-: speed   q: quit",
    )
    .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}
