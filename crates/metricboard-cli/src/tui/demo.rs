//! Synthetic snapshot generator for `monitor --demo`.
//!
//! Emits events for every board in turn, with a worldmap update every few
//! rounds. Each snapshot omits some metrics so the dashboard's default filling
//! is visible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use metricboard_core::{
    DashboardConfig, MetricKind, RegionEntry, Snapshot, SnapshotEvent,
};

const REGIONS: &[&str] = &["F1", "B2", "C3", "D4", "E5", "A6", "G7", "H8"];

/// Probability that a metric is present in a generated snapshot.
const PRESENCE: f64 = 0.8;

/// Board rounds between worldmap updates.
const WORLDMAP_EVERY: usize = 4;

pub struct DemoFeed {
    config: DashboardConfig,
    rng: StdRng,
    step: usize,
}

impl DemoFeed {
    pub fn new(config: DashboardConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            step: 0,
        }
    }

    pub fn next_event(&mut self) -> SnapshotEvent {
        let boards = self.config.boards.len().max(1);
        let round = self.step / boards;
        let slot = self.step % boards;
        self.step += 1;

        if slot == 0 && round % WORLDMAP_EVERY == WORLDMAP_EVERY - 1 {
            if let Some(event) = self.config.worldmap_event.clone() {
                return SnapshotEvent::entries(event, self.regions());
            }
        }

        match self.config.boards.get(slot) {
            Some(board) => {
                let mut points = Snapshot::new();
                for (key, metric) in &board.metrics {
                    if !self.rng.random_bool(PRESENCE) {
                        continue;
                    }
                    let value = match metric.kind {
                        MetricKind::Series => self.rng.random_range(5.0..250.0),
                        MetricKind::Gauge => self.rng.random_range(0.0..40.0),
                        MetricKind::Card if key.starts_with("vm_memory") => {
                            self.rng.random_range(1.0e6..4.0e8_f64).round()
                        }
                        MetricKind::Card => self.rng.random_range(0..2_000u32) as f64,
                    };
                    points.insert(key.clone(), value);
                }
                SnapshotEvent::points(board.event.clone(), points)
            }
            None => SnapshotEvent::entries(
                self.config.worldmap_event.clone().unwrap_or_default(),
                self.regions(),
            ),
        }
    }

    /// A non-empty set of regions with random node counts.
    fn regions(&mut self) -> Vec<RegionEntry> {
        let mut entries = Vec::new();
        for region in REGIONS {
            if self.rng.random_bool(0.7) {
                let nodes = self.rng.random_range(1..=12);
                entries.push(RegionEntry::new(*region, nodes, self.rng.random_bool(0.75)));
            }
        }
        if entries.is_empty() {
            entries.push(RegionEntry::new(REGIONS[0], 1, true));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricboard_core::{Dashboard, EventPayload, presets};

    #[test]
    fn test_demo_events_are_all_accepted() {
        let config = presets::default_dashboard_config();
        let mut dashboard = Dashboard::from_config(&config).unwrap();
        let mut feed = DemoFeed::new(config, 7);
        for _ in 0..60 {
            let event = feed.next_event();
            assert!(dashboard.handle(event).is_ok());
        }
    }

    #[test]
    fn test_demo_emits_worldmap() {
        let mut feed = DemoFeed::new(presets::default_dashboard_config(), 1);
        let saw_map = (0..30).any(|_| {
            matches!(
                feed.next_event().payload,
                EventPayload::Entries { ref entries } if !entries.is_empty()
            )
        });
        assert!(saw_map);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let cfg = presets::default_dashboard_config();
        let mut a = DemoFeed::new(cfg.clone(), 99);
        let mut b = DemoFeed::new(cfg, 99);
        for _ in 0..10 {
            assert_eq!(a.next_event(), b.next_event());
        }
    }
}
