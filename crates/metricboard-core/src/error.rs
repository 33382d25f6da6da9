//! Error taxonomy for the board pipeline.
//!
//! Only [`ConfigurationError`] is fatal, and only at construction time. Value
//! and update errors are local: the offending key or update is skipped and the
//! rest of the dashboard keeps showing its last good state.

use std::path::PathBuf;

use thiserror::Error;

use crate::series::SeriesMode;

/// Invalid board, series, or dashboard setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("board `{board}` has no metrics configured")]
    EmptyBoard { board: String },
    #[error("dashboard has no boards configured")]
    EmptyDashboard,
    #[error("rolling series capacity must be positive")]
    ZeroCapacity,
    #[error("metric `{key}` is a series but has no capacity")]
    MissingCapacity { key: String },
    #[error("metric `{key}` is not part of the schema")]
    UnknownMetric { key: String },
    #[error("metric `{key}` sets accumulate but is not a series")]
    AccumulateOnNonSeries { key: String },
    #[error("event name `{event}` is used by more than one board")]
    DuplicateEvent { event: String },
    #[error("board name `{board}` is used more than once")]
    DuplicateBoard { board: String },
    #[error("board `{board}` has a zero tick increment")]
    ZeroTickIncrement { board: String },
}

/// A gauge received a value it cannot display.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid gauge value {value}: gauges accept finite, non-negative values")]
pub struct InvalidValueError {
    pub value: f64,
}

/// A worldmap update arrived with no entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("worldmap update has no entries; keeping the previous model")]
pub struct EmptyUpdateError;

/// Rejected push on a rolling series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("series is locked to {locked} mode, refusing a {requested} push")]
    ModeConflict {
        locked: SeriesMode,
        requested: SeriesMode,
    },
    #[error("accumulated value is no longer finite")]
    Overflow,
}

/// Why a single metric was skipped during a board update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error(transparent)]
    InvalidValue(#[from] InvalidValueError),
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Routing failures inside a dashboard.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("no board handles event `{event}`")]
    UnknownEvent { event: String },
    #[error("event `{event}` expects {expected}")]
    PayloadMismatch {
        event: String,
        expected: &'static str,
    },
    #[error(transparent)]
    EmptyUpdate(#[from] EmptyUpdateError),
}

/// Failure to load a dashboard configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration in {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigurationError,
    },
}

/// Failure to read a JSONL event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
