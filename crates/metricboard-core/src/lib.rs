//! # metricboard-core
//!
//! **Live metric boards fed by pushed snapshots.**
//!
//! `metricboard-core` is the state machine behind a real-time dashboard: it
//! takes irregular, partial metric snapshots, completes them against a fixed
//! schema, and keeps fixed-length rolling windows, auto-ranging gauges, cards
//! and a node worldmap ready to render.
//!
//! ## Quick Start
//!
//! ```
//! use metricboard_core::{Dashboard, DashboardUpdate, Snapshot, presets};
//!
//! let mut dashboard = Dashboard::from_config(&presets::default_dashboard_config()).unwrap();
//!
//! let points = Snapshot::from([("archethic_db_duration".to_string(), 0.8)]);
//! let update = dashboard.apply_points(presets::NETWORK_EVENT, points).unwrap();
//!
//! if let DashboardUpdate::Board(update) = update {
//!     assert_eq!(update.tick, 5);
//!     assert!(update.failures.is_empty());
//! }
//! ```
//!
//! ## Architecture
//!
//! Transport → [`Dashboard`] (route by event name) → [`MetricSchema`]
//! (normalize) → [`MetricBoard`] (advance tick, push widgets) →
//! [`MetricBoardUpdate`] → [`SinkSet`] → sinks.
//!
//! Boards never draw. They return render payloads and the caller forwards
//! them, so everything here runs without a terminal, browser, or socket.

pub mod board;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod gauge;
pub mod presets;
pub mod schema;
pub mod series;
pub mod sink;
pub mod worldmap;

pub use board::{
    MetricBoard, MetricBoardUpdate, MetricConfig, MetricFailure, MetricKind, MetricPayload,
};
pub use config::{BoardConfig, DashboardConfig, load_dashboard_config};
pub use dashboard::{Dashboard, DashboardUpdate};
pub use error::{
    ConfigLoadError, ConfigurationError, DashboardError, EmptyUpdateError, EventLogError,
    InvalidValueError, MetricError, SeriesError,
};
pub use events::{EventPayload, SnapshotEvent, parse_event_log, read_event_log};
pub use gauge::{CardState, GaugeState, GaugeView};
pub use schema::{MetricDefault, MetricSchema, NormalizedSnapshot, Snapshot};
pub use series::{RollingSeries, SeriesMode, SeriesView};
pub use sink::{CardSink, ChartSink, GaugeSink, RecordingSink, SinkSet, WorldmapSink};
pub use worldmap::{NodeRange, RegionEntry, WorldmapRenderModel, WorldmapState};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
