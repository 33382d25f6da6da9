//! Integration tests for metricboard-core.
//!
//! These tests drive the full pipeline:
//! event → dashboard routing → normalization → board update → sink dispatch.

use std::collections::BTreeMap;
use std::io::Write;

use metricboard_core::{
    Dashboard, DashboardError, DashboardUpdate, EmptyUpdateError, GaugeState, MetricBoard,
    MetricConfig, MetricPayload, MetricSchema, NodeRange, RecordingSink, RegionEntry,
    RollingSeries, SinkSet, Snapshot, SnapshotEvent, WorldmapState, load_dashboard_config,
    presets, read_event_log,
};

fn snap(pairs: &[(&str, f64)]) -> Snapshot {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn partial_snapshot_passthrough() {
    let schema = MetricSchema::with_keys(["a", "b"]);
    let out = schema.normalize(&snap(&[("a", 5.0)]));
    let collected: Vec<(&str, f64)> = out.iter().collect();
    assert_eq!(collected, vec![("a", 5.0), ("b", 0.0)]);
}

#[test]
fn series_window_length_never_changes() {
    for capacity in [1, 3, 15, 50] {
        let mut series = RollingSeries::new(capacity, 0.0).unwrap();
        for tick in 1..=(capacity * 3) {
            series.push_replace(tick as f64, tick as f64 * 0.5).unwrap();
            let view = series.snapshot();
            assert_eq!(view.xs.len(), capacity);
            assert_eq!(view.ys.len(), capacity);
        }
    }
}

#[test]
fn accumulate_deltas_reach_expected_total() {
    let mut series = RollingSeries::new(3, 0.0).unwrap();
    series.push_accumulate(1.0, 10.0).unwrap();
    series.push_accumulate(2.0, 5.0).unwrap();
    series.push_accumulate(3.0, -2.0).unwrap();
    series.push_accumulate(4.0, 3.0).unwrap();
    let view = series.snapshot();
    assert_eq!(view.ys, vec![15.0, 13.0, 16.0]);
    assert_eq!(view.xs, vec![2.0, 3.0, 4.0]);
}

#[test]
fn gauge_tracks_peak() {
    let mut gauge = GaugeState::new();
    for v in [3.0, 1.0, 7.0, 2.0] {
        gauge.update(v).unwrap();
    }
    let view = gauge.render();
    assert_eq!((view.value, view.min, view.max), (2.0, 0.0, 7.0));
}

#[test]
fn worldmap_ranges_scenario() {
    let mut state = WorldmapState::new();
    let model = state
        .apply_update(vec![
            RegionEntry::new("A", 2, true),
            RegionEntry::new("B", 5, true),
            RegionEntry::new("C", 1, false),
        ])
        .unwrap();
    assert_eq!(model.authorized_range, NodeRange { min: 2, max: 5 });
    assert_eq!(model.pending_range, NodeRange { min: 1, max: 1 });

    assert_eq!(state.apply_update(vec![]), Err(EmptyUpdateError));
    assert_eq!(state.render(), &model);
}

#[test]
fn board_to_sinks_end_to_end() {
    let schema = MetricSchema::with_keys(["duration", "volume", "latency"]);
    let configs = BTreeMap::from([
        ("duration".to_string(), MetricConfig::series(3)),
        ("volume".to_string(), MetricConfig::accumulating_series(3)),
        ("latency".to_string(), MetricConfig::gauge()),
    ]);
    let mut board = MetricBoard::new("node", schema, &configs).unwrap();

    let mut duration = RecordingSink::new();
    let mut volume = RecordingSink::new();
    let mut latency = RecordingSink::new();
    {
        let mut sinks = SinkSet::new();
        sinks
            .chart("duration", &mut duration)
            .chart("volume", &mut volume)
            .gauge("latency", &mut latency);

        for (d, v, l) in [(1.0, 4.0, 2.0), (2.0, 1.0, -1.0), (3.0, 2.0, 0.5)] {
            let update = board.apply_snapshot(
                &snap(&[("duration", d), ("volume", v), ("latency", l), ("extra", 9.0)]),
                10,
            );
            sinks.dispatch(&update);
        }
    }

    assert_eq!(
        duration.last(),
        Some(&MetricPayload::Series {
            xs: vec![10.0, 20.0, 30.0],
            ys: vec![1.0, 2.0, 3.0]
        })
    );
    assert_eq!(
        volume.last(),
        Some(&MetricPayload::Series {
            xs: vec![10.0, 20.0, 30.0],
            ys: vec![4.0, 5.0, 7.0]
        })
    );
    // The negative reading was skipped; the gauge kept its previous value for
    // that tick and its peak afterwards.
    let gauge_values: Vec<MetricPayload> = latency.payloads.clone();
    assert_eq!(
        gauge_values,
        vec![
            MetricPayload::Gauge {
                value: 2.0,
                min: 0.0,
                max: 2.0
            },
            MetricPayload::Gauge {
                value: 2.0,
                min: 0.0,
                max: 2.0
            },
            MetricPayload::Gauge {
                value: 0.5,
                min: 0.0,
                max: 2.0
            },
        ]
    );
}

#[test]
fn default_dashboard_replays_event_log() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# two network ticks and a worldmap push").unwrap();
    writeln!(
        file,
        r#"{{"event":"network_points","points":{{"archethic_db_duration":1.25,"unknown":3}}}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"event":"network_points","points":{{"archethic_p2p_send_message_duration":4}}}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"event":"worldmap_update","entries":[{{"region":"F1","node_count":3,"authorized":true}}]}}"#
    )
    .unwrap();

    let events = read_event_log(file.path()).unwrap();
    assert_eq!(events.len(), 3);

    let mut dashboard = Dashboard::from_config(&presets::default_dashboard_config()).unwrap();
    let mut last_tick = 0;
    for event in events {
        match dashboard.handle(event).unwrap() {
            DashboardUpdate::Board(update) => {
                assert!(update.tick > last_tick);
                last_tick = update.tick;
                assert!(update.is_clean());
            }
            DashboardUpdate::Worldmap(model) => {
                assert_eq!(model.authorized_range, NodeRange { min: 3, max: 3 });
            }
        }
    }

    let network = dashboard.board(presets::NETWORK_EVENT).unwrap();
    assert_eq!(network.elapsed_ticks(), 10);
    match network.payload("archethic_db_duration").unwrap() {
        MetricPayload::Series { xs, ys } => {
            assert_eq!(xs.len(), presets::DASHBOARD_CAPACITY);
            assert_eq!(&ys[ys.len() - 2..], &[1.25, 0.0]);
            assert_eq!(&xs[xs.len() - 2..], &[5.0, 10.0]);
        }
        other => panic!("unexpected payload {other:?}"),
    }
    assert_eq!(
        network.payload("archethic_p2p_send_message_duration"),
        Some(MetricPayload::Gauge {
            value: 4.0,
            min: 0.0,
            max: 4.0
        })
    );
    // The node board never received an event.
    assert_eq!(
        dashboard.board(presets::NODE_EVENT).unwrap().elapsed_ticks(),
        0
    );
}

#[test]
fn unknown_event_is_reported() {
    let mut dashboard = Dashboard::from_config(&presets::default_dashboard_config()).unwrap();
    let err = dashboard
        .handle(SnapshotEvent::points("live_points", Snapshot::new()))
        .unwrap_err();
    assert!(matches!(err, DashboardError::UnknownEvent { .. }));
}

#[test]
fn preset_config_survives_file_round_trip() {
    let cfg = presets::default_dashboard_config();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(cfg.to_json_pretty().unwrap().as_bytes())
        .unwrap();
    assert_eq!(load_dashboard_config(file.path()).unwrap(), cfg);
}

#[test]
fn bundled_sample_log_replays() {
    let path =
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/sample_events.jsonl");
    let events = read_event_log(&path).unwrap();
    assert_eq!(events.len(), 5);

    let mut dashboard = Dashboard::from_config(&presets::default_dashboard_config()).unwrap();
    let updates: Vec<DashboardUpdate> = events
        .into_iter()
        .map(|e| dashboard.handle(e).unwrap())
        .collect();

    match updates.last().unwrap() {
        DashboardUpdate::Board(update) => {
            assert_eq!(update.board, "network");
            assert_eq!(update.tick, 15);
            assert_eq!(update.failures.len(), 1);
            assert_eq!(update.failures[0].key, "archethic_p2p_send_message_duration");
        }
        other => panic!("unexpected update {other:?}"),
    }

    let map = dashboard.worldmap().unwrap().render();
    assert_eq!(map.authorized_range, NodeRange { min: 2, max: 4 });
    assert_eq!(map.pending_range, NodeRange { min: 1, max: 1 });
}
