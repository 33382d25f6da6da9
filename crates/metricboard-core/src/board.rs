//! Metric boards: one widget state per tracked metric on a shared x-axis.
//!
//! A [`MetricBoard`] is the state behind one live view. Each call to
//! [`MetricBoard::apply_snapshot`] advances the board's tick counter once and
//! pushes the normalized value of every configured metric into its widget, so
//! all series of a board stay aligned on the same x values. The board never
//! renders anything itself; it returns a [`MetricBoardUpdate`] that the caller
//! forwards to its sinks.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ConfigurationError, MetricError};
use crate::gauge::{CardState, GaugeState};
use crate::schema::{MetricSchema, Snapshot};
use crate::series::{RollingSeries, SeriesMode};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Widget kind backing a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Rolling line chart.
    Series,
    /// Auto-ranging gauge.
    Gauge,
    /// Latest value as text.
    Card,
}

/// Per-metric board configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub kind: MetricKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub accumulate: bool,
}

impl MetricConfig {
    pub fn series(capacity: usize) -> Self {
        Self {
            kind: MetricKind::Series,
            capacity: Some(capacity),
            accumulate: false,
        }
    }

    pub fn accumulating_series(capacity: usize) -> Self {
        Self {
            accumulate: true,
            ..Self::series(capacity)
        }
    }

    pub fn gauge() -> Self {
        Self {
            kind: MetricKind::Gauge,
            capacity: None,
            accumulate: false,
        }
    }

    pub fn card() -> Self {
        Self {
            kind: MetricKind::Card,
            capacity: None,
            accumulate: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Update records
// ---------------------------------------------------------------------------

/// Render payload for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricPayload {
    Series { xs: Vec<f64>, ys: Vec<f64> },
    Gauge { value: f64, min: f64, max: f64 },
    Card { value: f64 },
}

/// A metric skipped during an update, tagged with its key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFailure {
    pub key: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: MetricError,
}

fn serialize_display<S: Serializer>(error: &MetricError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Result of applying one snapshot to a board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBoardUpdate {
    pub board: String,
    pub tick: u64,
    pub payloads: BTreeMap<String, MetricPayload>,
    pub failures: Vec<MetricFailure>,
}

impl MetricBoardUpdate {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MetricBoard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Widget {
    Series {
        series: RollingSeries,
        mode: SeriesMode,
    },
    Gauge(GaugeState),
    Card(CardState),
}

impl Widget {
    fn build(key: &str, config: &MetricConfig) -> Result<Self, ConfigurationError> {
        if config.capacity == Some(0) {
            return Err(ConfigurationError::ZeroCapacity);
        }
        match config.kind {
            MetricKind::Series => {
                let capacity =
                    config
                        .capacity
                        .ok_or_else(|| ConfigurationError::MissingCapacity {
                            key: key.to_string(),
                        })?;
                let mode = if config.accumulate {
                    SeriesMode::Accumulate
                } else {
                    SeriesMode::Replace
                };
                Ok(Self::Series {
                    series: RollingSeries::with_mode(capacity, 0.0, mode)?,
                    mode,
                })
            }
            _ if config.accumulate => Err(ConfigurationError::AccumulateOnNonSeries {
                key: key.to_string(),
            }),
            MetricKind::Gauge => Ok(Self::Gauge(GaugeState::new())),
            MetricKind::Card => Ok(Self::Card(CardState::new())),
        }
    }

    fn apply(&mut self, x: f64, value: f64) -> Result<(), MetricError> {
        match self {
            Self::Series { series, mode } => series.push(*mode, x, value)?,
            Self::Gauge(gauge) => gauge.update(value)?,
            Self::Card(card) => card.update(value)?,
        }
        Ok(())
    }

    fn payload(&self) -> MetricPayload {
        match self {
            Self::Series { series, .. } => {
                let view = series.snapshot();
                MetricPayload::Series {
                    xs: view.xs,
                    ys: view.ys,
                }
            }
            Self::Gauge(gauge) => {
                let view = gauge.render();
                MetricPayload::Gauge {
                    value: view.value,
                    min: view.min,
                    max: view.max,
                }
            }
            Self::Card(card) => MetricPayload::Card {
                value: card.current_value(),
            },
        }
    }
}

/// Widget states for one view, advanced together by [`apply_snapshot`].
///
/// [`apply_snapshot`]: MetricBoard::apply_snapshot
#[derive(Debug, Clone)]
pub struct MetricBoard {
    name: String,
    schema: MetricSchema,
    widgets: BTreeMap<String, Widget>,
    elapsed_ticks: u64,
}

impl MetricBoard {
    /// Build a board with one widget per entry of `metrics`.
    ///
    /// Every configured key must be part of `schema`.
    pub fn new(
        name: impl Into<String>,
        schema: MetricSchema,
        metrics: &BTreeMap<String, MetricConfig>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if metrics.is_empty() {
            return Err(ConfigurationError::EmptyBoard { board: name });
        }

        let mut widgets = BTreeMap::new();
        for (key, config) in metrics {
            if !schema.contains(key) {
                return Err(ConfigurationError::UnknownMetric { key: key.clone() });
            }
            widgets.insert(key.clone(), Widget::build(key, config)?);
        }

        Ok(Self {
            name,
            schema,
            widgets,
            elapsed_ticks: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Current payload for `key` without touching the board.
    pub fn payload(&self, key: &str) -> Option<MetricPayload> {
        self.widgets.get(key).map(Widget::payload)
    }

    /// Current payloads for every metric.
    pub fn render_all(&self) -> BTreeMap<String, MetricPayload> {
        self.widgets
            .iter()
            .map(|(k, w)| (k.clone(), w.payload()))
            .collect()
    }

    /// Normalize `raw`, advance the shared tick by `tick_increment`, and push
    /// every configured metric.
    ///
    /// A metric that rejects its value is skipped and reported in
    /// [`MetricBoardUpdate::failures`]; the others are still updated.
    pub fn apply_snapshot(&mut self, raw: &Snapshot, tick_increment: u64) -> MetricBoardUpdate {
        let normalized = self.schema.normalize(raw);
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(tick_increment);
        let x = self.elapsed_ticks as f64;

        let mut payloads = BTreeMap::new();
        let mut failures = Vec::new();
        for (key, widget) in &mut self.widgets {
            // Board keys are validated against the schema at construction.
            let value = normalized.get(key).unwrap_or_default();
            if let Err(error) = widget.apply(x, value) {
                warn!("board `{}`: skipping `{key}`: {error}", self.name);
                failures.push(MetricFailure {
                    key: key.clone(),
                    error,
                });
            }
            payloads.insert(key.clone(), widget.payload());
        }

        MetricBoardUpdate {
            board: self.name.clone(),
            tick: self.elapsed_ticks,
            payloads,
            failures,
        }
    }
}
