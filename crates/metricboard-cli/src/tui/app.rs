//! TUI application state and event loop.
//!
//! The dashboard lives on the UI thread. A feeder thread (log replay or demo
//! generator) sends snapshot events over a bounded channel; each UI tick
//! drains the channel, applies the events and pushes the resulting payloads
//! into the panel sinks that `ui.rs` draws from.

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
    mpsc::{self, Receiver},
};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use metricboard_core::{
    CardSink, ChartSink, ConfigurationError, Dashboard, DashboardConfig, DashboardUpdate,
    GaugeSink, MetricBoard, MetricBoardUpdate, MetricPayload, SinkSet, SnapshotEvent,
    WorldmapRenderModel, WorldmapSink,
};

use super::demo::DemoFeed;

/// Events buffered between the feeder and the UI.
const EVENT_BUFFER: usize = 64;

const MIN_INTERVAL_MS: u64 = 50;
const MAX_INTERVAL_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Where monitor events come from.
pub enum Feed {
    Replay(VecDeque<SnapshotEvent>),
    Demo(DemoFeed),
}

impl Feed {
    fn label(&self) -> &'static str {
        match self {
            Self::Replay(_) => "replay",
            Self::Demo(_) => "demo",
        }
    }

    fn next_event(&mut self) -> Option<SnapshotEvent> {
        match self {
            Self::Replay(events) => events.pop_front(),
            Self::Demo(demo) => Some(demo.next_event()),
        }
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ChartPanel {
    pub points: Vec<(f64, f64)>,
}

impl ChartSink for ChartPanel {
    fn update(&mut self, xs: &[f64], ys: &[f64]) {
        self.points = xs.iter().copied().zip(ys.iter().copied()).collect();
    }
}

impl ChartPanel {
    pub fn latest(&self) -> f64 {
        self.points.last().map(|p| p.1).unwrap_or(0.0)
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let lo = self.points.first().map(|p| p.0).unwrap_or(0.0);
        let hi = self.points.last().map(|p| p.0).unwrap_or(0.0);
        if hi > lo { [lo, hi] } else { [lo, lo + 1.0] }
    }

    /// Y bounds with a little headroom; zero-based for non-negative data.
    pub fn y_bounds(&self) -> [f64; 2] {
        let lo = self.points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let hi = self
            .points
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return [0.0, 1.0];
        }
        let lo = lo.min(0.0);
        let span = (hi - lo).max(1.0);
        [lo, hi + span * 0.1]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GaugePanel {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl GaugeSink for GaugePanel {
    fn update(&mut self, value: f64, min: f64, max: f64) {
        *self = Self { value, min, max };
    }
}

impl GaugePanel {
    /// Fill ratio in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.max > self.min {
            ((self.value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CardPanel {
    pub value: f64,
}

impl CardSink for CardPanel {
    fn update(&mut self, value: f64) {
        self.value = value;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapPanel {
    pub model: Option<WorldmapRenderModel>,
    pub updates: u64,
}

impl WorldmapSink for MapPanel {
    fn update(&mut self, model: &WorldmapRenderModel) {
        self.model = Some(model.clone());
        self.updates += 1;
    }
}

/// Panels of one board, keyed by metric.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub name: String,
    pub event: String,
    pub tick: u64,
    pub charts: BTreeMap<String, ChartPanel>,
    pub gauges: BTreeMap<String, GaugePanel>,
    pub cards: BTreeMap<String, CardPanel>,
    /// Failures reported by the most recent update.
    pub failures: Vec<String>,
}

impl BoardView {
    fn new(event: &str, board: &MetricBoard) -> Self {
        let initial = MetricBoardUpdate {
            board: board.name().to_string(),
            tick: board.elapsed_ticks(),
            payloads: board.render_all(),
            failures: Vec::new(),
        };

        let mut view = Self {
            name: board.name().to_string(),
            event: event.to_string(),
            tick: 0,
            charts: BTreeMap::new(),
            gauges: BTreeMap::new(),
            cards: BTreeMap::new(),
            failures: Vec::new(),
        };
        for (key, payload) in &initial.payloads {
            match payload {
                MetricPayload::Series { .. } => {
                    view.charts.insert(key.clone(), ChartPanel::default());
                }
                MetricPayload::Gauge { .. } => {
                    view.gauges.insert(key.clone(), GaugePanel::default());
                }
                MetricPayload::Card { .. } => {
                    view.cards.insert(key.clone(), CardPanel::default());
                }
            }
        }
        view.apply(&initial);
        view
    }

    /// Push an update into the panels. Returns the payloads delivered.
    pub fn apply(&mut self, update: &MetricBoardUpdate) -> usize {
        self.tick = update.tick;
        self.failures = update
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.key, f.error))
            .collect();

        let mut sinks = SinkSet::new();
        for (key, panel) in self.charts.iter_mut() {
            sinks.chart(key.clone(), panel);
        }
        for (key, panel) in self.gauges.iter_mut() {
            sinks.gauge(key.clone(), panel);
        }
        for (key, panel) in self.cards.iter_mut() {
            sinks.card(key.clone(), panel);
        }
        sinks.dispatch(update)
    }
}

fn board_views(dashboard: &Dashboard) -> Vec<BoardView> {
    dashboard
        .event_names()
        .into_iter()
        .filter_map(|event| dashboard.board(event).map(|b| BoardView::new(event, b)))
        .collect()
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    dashboard: Dashboard,
    views: Vec<BoardView>,
    map: MapPanel,
    tab: usize,
    cursor: usize,
    running: bool,
    feed: Option<Feed>,
    feed_label: &'static str,
    rx: Option<Receiver<SnapshotEvent>>,
    interval_ms: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    feed_done: Arc<AtomicBool>,
    applied: u64,
    rejected: u64,
    last_error: Option<String>,
}

impl App {
    pub fn new(
        config: &DashboardConfig,
        feed: Feed,
        refresh_secs: f64,
    ) -> Result<Self, ConfigurationError> {
        let dashboard = Dashboard::from_config(config)?;
        let interval = (refresh_secs.max(0.0) * 1000.0) as u64;

        Ok(Self {
            views: board_views(&dashboard),
            dashboard,
            map: MapPanel::default(),
            tab: 0,
            cursor: 0,
            running: true,
            feed_label: feed.label(),
            feed: Some(feed),
            rx: None,
            interval_ms: Arc::new(AtomicU64::new(
                interval.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS),
            )),
            paused: Arc::new(AtomicBool::new(false)),
            feed_done: Arc::new(AtomicBool::new(false)),
            applied: 0,
            rejected: 0,
            last_error: None,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before the panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        println!(
            "Session {}: {} events applied, {} rejected",
            self.dashboard.session_id(),
            self.applied,
            self.rejected
        );
        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        self.start_feeder();

        while self.running {
            self.drain_events();
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn start_feeder(&mut self) {
        let Some(mut feed) = self.feed.take() else {
            return;
        };
        let (tx, rx) = mpsc::sync_channel(EVENT_BUFFER);
        self.rx = Some(rx);

        let interval = Arc::clone(&self.interval_ms);
        let paused = Arc::clone(&self.paused);
        let done = Arc::clone(&self.feed_done);

        thread::spawn(move || {
            loop {
                thread::sleep(Duration::from_millis(interval.load(Ordering::Relaxed)));
                if paused.load(Ordering::Relaxed) {
                    continue;
                }
                let Some(event) = feed.next_event() else {
                    break;
                };
                // Receiver gone: the UI has quit.
                if tx.send(event).is_err() {
                    break;
                }
            }
            done.store(true, Ordering::Relaxed);
        });
    }

    fn drain_events(&mut self) {
        let Some(rx) = self.rx.take() else {
            return;
        };
        while let Ok(event) = rx.try_recv() {
            self.apply_event(event);
        }
        self.rx = Some(rx);
    }

    /// Apply one event to the dashboard and forward the result to the panels.
    pub fn apply_event(&mut self, event: SnapshotEvent) {
        let name = event.event.clone();
        match self.dashboard.handle(event) {
            Ok(DashboardUpdate::Board(update)) => {
                self.applied += 1;
                if let Some(view) = self.views.iter_mut().find(|v| v.event == name) {
                    view.apply(&update);
                }
            }
            Ok(DashboardUpdate::Worldmap(model)) => {
                self.applied += 1;
                let mut sinks = SinkSet::new();
                sinks.worldmap(&mut self.map);
                sinks.dispatch_worldmap(&model);
            }
            Err(e) => {
                self.rejected += 1;
                self.last_error = Some(format!("{name}: {e}"));
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.select_tab(1),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.select_tab(self.views.len().saturating_sub(1))
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let charts = self.current().map(|v| v.charts.len()).unwrap_or(0);
                if self.cursor + 1 < charts {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('p') => {
                self.paused.fetch_xor(true, Ordering::Relaxed);
            }
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char(']') => {
                let ms = self.interval_ms.load(Ordering::Relaxed) / 2;
                self.interval_ms
                    .store(ms.max(MIN_INTERVAL_MS), Ordering::Relaxed);
            }
            KeyCode::Char('-') | KeyCode::Char('[') => {
                let ms = self.interval_ms.load(Ordering::Relaxed) * 2;
                self.interval_ms
                    .store(ms.min(MAX_INTERVAL_MS), Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn select_tab(&mut self, step: usize) {
        if self.views.is_empty() {
            return;
        }
        self.tab = (self.tab + step) % self.views.len();
        self.cursor = 0;
    }

    /// Start a fresh dashboard session with zero-filled panels.
    fn reset(&mut self) {
        match self.dashboard.reset() {
            Ok(()) => {
                self.views = board_views(&self.dashboard);
                self.map = MapPanel::default();
                self.applied = 0;
                self.rejected = 0;
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    // -- Accessors for the UI ------------------------------------------------

    pub fn views(&self) -> &[BoardView] {
        &self.views
    }

    pub fn tab(&self) -> usize {
        self.tab
    }

    pub fn current(&self) -> Option<&BoardView> {
        self.views.get(self.tab)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selected chart of the current board.
    pub fn selected_chart(&self) -> Option<(&str, &ChartPanel)> {
        self.current()
            .and_then(|v| v.charts.iter().nth(self.cursor))
            .map(|(k, p)| (k.as_str(), p))
    }

    pub fn map(&self) -> &MapPanel {
        &self.map
    }

    pub fn session_id(&self) -> String {
        self.dashboard.session_id().to_string()
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn feed_label(&self) -> &'static str {
        self.feed_label
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn feed_done(&self) -> bool {
        self.feed_done.load(Ordering::Relaxed)
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_ms.load(Ordering::Relaxed) as f64 / 1000.0
    }
}
