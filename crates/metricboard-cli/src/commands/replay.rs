use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use metricboard_core::{
    CardSink, ChartSink, Dashboard, DashboardConfig, DashboardUpdate, GaugeSink, MetricKind,
    MetricPayload, SinkSet, SnapshotEvent, WorldmapRenderModel, WorldmapSink, read_event_log,
};

/// Lines written by the sinks, drained after every dispatch.
type Transcript = Rc<RefCell<Vec<String>>>;

/// Sink that renders every payload it receives as one line.
struct PrintSink {
    label: String,
    out: Transcript,
}

impl PrintSink {
    fn new(key: &str, out: &Transcript) -> Self {
        Self {
            label: super::metric_label(key).to_string(),
            out: Rc::clone(out),
        }
    }

    fn print(&self, payload: &MetricPayload) {
        self.out.borrow_mut().push(format!(
            "    {:<44} {}",
            self.label,
            super::describe_payload(payload)
        ));
    }
}

impl ChartSink for PrintSink {
    fn update(&mut self, xs: &[f64], ys: &[f64]) {
        self.print(&MetricPayload::Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        });
    }
}

impl GaugeSink for PrintSink {
    fn update(&mut self, value: f64, min: f64, max: f64) {
        self.print(&MetricPayload::Gauge { value, min, max });
    }
}

impl CardSink for PrintSink {
    fn update(&mut self, value: f64) {
        self.print(&MetricPayload::Card { value });
    }
}

impl WorldmapSink for PrintSink {
    fn update(&mut self, model: &WorldmapRenderModel) {
        let mut out = self.out.borrow_mut();
        out.push(format!(
            "    authorized: {} regions, nodes {}..{}",
            model.authorized_entries.len(),
            model.authorized_range.min,
            model.authorized_range.max
        ));
        out.push(format!(
            "    pending:    {} regions, nodes {}..{}",
            model.pending_entries.len(),
            model.pending_range.min,
            model.pending_range.max
        ));
    }
}

/// One printing sink set per board, keyed by the event that feeds it.
fn board_sinks(config: &DashboardConfig, out: &Transcript) -> HashMap<String, SinkSet<'static>> {
    config
        .boards
        .iter()
        .map(|board| {
            let mut sinks = SinkSet::new();
            for (key, metric) in &board.metrics {
                let sink = PrintSink::new(key, out);
                match metric.kind {
                    MetricKind::Series => sinks.chart(key.clone(), sink),
                    MetricKind::Gauge => sinks.gauge(key.clone(), sink),
                    MetricKind::Card => sinks.card(key.clone(), sink),
                };
            }
            (board.event.clone(), sinks)
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
    pub failures: usize,
}

/// Feed `events` through `dashboard`, writing one block per update to `out`
/// (or one JSON line per update when `json` is set). Rejected events go to
/// stderr.
pub fn replay_events<W: Write>(
    config: &DashboardConfig,
    dashboard: &mut Dashboard,
    events: Vec<SnapshotEvent>,
    json: bool,
    out: &mut W,
) -> io::Result<ReplaySummary> {
    let transcript = Transcript::default();
    let mut sinks = board_sinks(config, &transcript);
    let mut map_sink = SinkSet::new();
    map_sink.worldmap(PrintSink::new("worldmap", &transcript));

    let mut summary = ReplaySummary::default();

    for (i, event) in events.into_iter().enumerate() {
        let name = event.event.clone();
        let update = match dashboard.handle(event) {
            Ok(update) => update,
            Err(e) => {
                summary.rejected += 1;
                eprintln!("  #{:<4} {name}: {e}", i + 1);
                continue;
            }
        };
        summary.applied += 1;

        if json {
            match serde_json::to_string(&update) {
                Ok(line) => writeln!(out, "{line}")?,
                Err(e) => eprintln!("  #{:<4} {name}: cannot encode update: {e}", i + 1),
            }
            if let DashboardUpdate::Board(u) = &update {
                summary.failures += u.failures.len();
            }
            continue;
        }

        match &update {
            DashboardUpdate::Board(u) => {
                writeln!(out, "  #{:<4} {name} → {} @ tick {}", i + 1, u.board, u.tick)?;
                if let Some(set) = sinks.get_mut(&name) {
                    set.dispatch(u);
                }
                for line in transcript.borrow_mut().drain(..) {
                    writeln!(out, "{line}")?;
                }
                for failure in &u.failures {
                    writeln!(out, "    ⚠ {}: {}", failure.key, failure.error)?;
                }
                summary.failures += u.failures.len();
            }
            DashboardUpdate::Worldmap(model) => {
                writeln!(out, "  #{:<4} {name} → worldmap", i + 1)?;
                map_sink.dispatch_worldmap(model);
                for line in transcript.borrow_mut().drain(..) {
                    writeln!(out, "{line}")?;
                }
            }
        }
    }

    Ok(summary)
}

pub fn run(path: &str, config_path: Option<&str>, json: bool) {
    let config = super::load_config(config_path);
    let events = match read_event_log(Path::new(path)) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let mut dashboard = match Dashboard::from_config(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: invalid dashboard configuration: {e}");
            std::process::exit(1);
        }
    };

    if !json {
        println!(
            "Replaying {} events from {path} (session {})",
            events.len(),
            dashboard.session_id()
        );
    }

    let stdout = io::stdout();
    let summary = match replay_events(&config, &mut dashboard, events, json, &mut stdout.lock()) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: cannot write replay output: {e}");
            std::process::exit(1);
        }
    };

    if !json {
        println!();
        println!(
            "{} applied, {} rejected, {} metric failures",
            summary.applied, summary.rejected, summary.failures
        );
    }
}
