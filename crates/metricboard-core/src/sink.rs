//! Rendering sinks and update dispatch.
//!
//! Sinks are the seam to whatever draws the widgets: a terminal chart, an
//! HTTP frame cache, a test recorder. They receive render-ready payloads and
//! must not be relied on to keep history; the board owns the rolling window.

use std::collections::HashMap;

use log::trace;

use crate::board::{MetricBoardUpdate, MetricPayload};
use crate::worldmap::WorldmapRenderModel;

pub trait ChartSink {
    fn update(&mut self, xs: &[f64], ys: &[f64]);
}

pub trait GaugeSink {
    fn update(&mut self, value: f64, min: f64, max: f64);
}

pub trait CardSink {
    fn update(&mut self, value: f64);
}

pub trait WorldmapSink {
    fn update(&mut self, model: &WorldmapRenderModel);
}

impl<T: ChartSink + ?Sized> ChartSink for &mut T {
    fn update(&mut self, xs: &[f64], ys: &[f64]) {
        ChartSink::update(&mut **self, xs, ys)
    }
}

impl<T: GaugeSink + ?Sized> GaugeSink for &mut T {
    fn update(&mut self, value: f64, min: f64, max: f64) {
        GaugeSink::update(&mut **self, value, min, max)
    }
}

impl<T: CardSink + ?Sized> CardSink for &mut T {
    fn update(&mut self, value: f64) {
        CardSink::update(&mut **self, value)
    }
}

impl<T: WorldmapSink + ?Sized> WorldmapSink for &mut T {
    fn update(&mut self, model: &WorldmapRenderModel) {
        WorldmapSink::update(&mut **self, model)
    }
}

// ---------------------------------------------------------------------------
// SinkSet
// ---------------------------------------------------------------------------

/// Sinks keyed by metric, plus an optional worldmap sink.
///
/// Registering a second sink for the same key replaces the first.
#[derive(Default)]
pub struct SinkSet<'a> {
    charts: HashMap<String, Box<dyn ChartSink + 'a>>,
    gauges: HashMap<String, Box<dyn GaugeSink + 'a>>,
    cards: HashMap<String, Box<dyn CardSink + 'a>>,
    worldmap: Option<Box<dyn WorldmapSink + 'a>>,
}

impl<'a> SinkSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&mut self, key: impl Into<String>, sink: impl ChartSink + 'a) -> &mut Self {
        self.charts.insert(key.into(), Box::new(sink));
        self
    }

    pub fn gauge(&mut self, key: impl Into<String>, sink: impl GaugeSink + 'a) -> &mut Self {
        self.gauges.insert(key.into(), Box::new(sink));
        self
    }

    pub fn card(&mut self, key: impl Into<String>, sink: impl CardSink + 'a) -> &mut Self {
        self.cards.insert(key.into(), Box::new(sink));
        self
    }

    pub fn worldmap(&mut self, sink: impl WorldmapSink + 'a) -> &mut Self {
        self.worldmap = Some(Box::new(sink));
        self
    }

    /// Forward every payload of `update` to the sink registered for its key.
    /// Returns how many payloads were delivered.
    pub fn dispatch(&mut self, update: &MetricBoardUpdate) -> usize {
        let mut delivered = 0;
        for (key, payload) in &update.payloads {
            let hit = match payload {
                MetricPayload::Series { xs, ys } => self
                    .charts
                    .get_mut(key)
                    .map(|sink| sink.update(xs, ys))
                    .is_some(),
                MetricPayload::Gauge { value, min, max } => self
                    .gauges
                    .get_mut(key)
                    .map(|sink| sink.update(*value, *min, *max))
                    .is_some(),
                MetricPayload::Card { value } => self
                    .cards
                    .get_mut(key)
                    .map(|sink| sink.update(*value))
                    .is_some(),
            };
            if hit {
                delivered += 1;
            } else {
                trace!("board `{}`: no sink for `{key}`", update.board);
            }
        }
        delivered
    }

    /// Forward a worldmap model. Returns `false` when no worldmap sink is set.
    pub fn dispatch_worldmap(&mut self, model: &WorldmapRenderModel) -> bool {
        match self.worldmap.as_mut() {
            Some(sink) => {
                sink.update(model);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// In-memory sink that keeps every payload it was handed, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    pub payloads: Vec<MetricPayload>,
    pub maps: Vec<WorldmapRenderModel>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&MetricPayload> {
        self.payloads.last()
    }
}

impl ChartSink for RecordingSink {
    fn update(&mut self, xs: &[f64], ys: &[f64]) {
        self.payloads.push(MetricPayload::Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        });
    }
}

impl GaugeSink for RecordingSink {
    fn update(&mut self, value: f64, min: f64, max: f64) {
        self.payloads.push(MetricPayload::Gauge { value, min, max });
    }
}

impl CardSink for RecordingSink {
    fn update(&mut self, value: f64) {
        self.payloads.push(MetricPayload::Card { value });
    }
}

impl WorldmapSink for RecordingSink {
    fn update(&mut self, model: &WorldmapRenderModel) {
        self.maps.push(model.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MetricBoard, MetricConfig};
    use crate::schema::{MetricSchema, Snapshot};
    use crate::worldmap::{RegionEntry, WorldmapState};
    use std::collections::BTreeMap;

    fn board() -> MetricBoard {
        let schema = MetricSchema::with_keys(["lat", "queue", "mem"]);
        let cfg = BTreeMap::from([
            ("lat".to_string(), MetricConfig::series(2)),
            ("queue".to_string(), MetricConfig::gauge()),
            ("mem".to_string(), MetricConfig::card()),
        ]);
        MetricBoard::new("node", schema, &cfg).unwrap()
    }

    #[test]
    fn test_dispatch_routes_by_kind_and_key() {
        let mut board = board();
        let update = board.apply_snapshot(
            &Snapshot::from([
                ("lat".to_string(), 3.0),
                ("queue".to_string(), 4.0),
                ("mem".to_string(), 5.0),
            ]),
            5,
        );

        let mut chart = RecordingSink::new();
        let mut gauge = RecordingSink::new();
        let mut card = RecordingSink::new();
        {
            let mut sinks = SinkSet::new();
            sinks
                .chart("lat", &mut chart)
                .gauge("queue", &mut gauge)
                .card("mem", &mut card);
            assert_eq!(sinks.dispatch(&update), 3);
        }

        assert_eq!(
            chart.last(),
            Some(&MetricPayload::Series {
                xs: vec![0.0, 5.0],
                ys: vec![0.0, 3.0]
            })
        );
        assert_eq!(
            gauge.last(),
            Some(&MetricPayload::Gauge {
                value: 4.0,
                min: 0.0,
                max: 4.0
            })
        );
        assert_eq!(card.last(), Some(&MetricPayload::Card { value: 5.0 }));
    }

    #[test]
    fn test_unregistered_keys_skipped() {
        let mut board = board();
        let update = board.apply_snapshot(&Snapshot::new(), 1);
        let mut chart = RecordingSink::new();
        let mut sinks = SinkSet::new();
        sinks.chart("lat", &mut chart);
        // A chart sink under a gauge key does not receive the gauge payload.
        sinks.chart("queue", RecordingSink::new());
        assert_eq!(sinks.dispatch(&update), 1);
    }

    #[test]
    fn test_worldmap_dispatch() {
        let mut state = WorldmapState::new();
        let model = state
            .apply_update(vec![RegionEntry::new("A", 1, true)])
            .unwrap();

        let mut sinks = SinkSet::new();
        assert!(!sinks.dispatch_worldmap(&model));

        let mut map = RecordingSink::new();
        {
            let mut sinks = SinkSet::new();
            sinks.worldmap(&mut map);
            assert!(sinks.dispatch_worldmap(&model));
        }
        assert_eq!(map.maps, vec![model]);
    }
}
