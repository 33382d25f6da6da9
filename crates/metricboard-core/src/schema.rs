//! Closed metric schema and snapshot normalization.
//!
//! Snapshots arrive partial: a producer only reports the metrics it observed
//! during the last interval, and may also report metrics this dashboard does
//! not know about. [`MetricSchema::normalize`] turns such a snapshot into a
//! [`NormalizedSnapshot`] that is total over the known keys, so charts never go
//! blank because a metric was skipped for one tick.

use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// A raw, possibly partial snapshot as delivered by the transport.
pub type Snapshot = HashMap<String, f64>;

/// One known metric and the value it takes when a snapshot omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefault {
    pub key: String,
    #[serde(default)]
    pub default: f64,
}

/// Fixed set of known metric keys, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSchema {
    metrics: Vec<MetricDefault>,
}

impl MetricSchema {
    /// Build a schema from `(key, default)` pairs. A repeated key keeps its
    /// first position and its last default.
    pub fn new<K, I>(metrics: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut out: Vec<MetricDefault> = Vec::new();
        for (key, default) in metrics {
            let key = key.into();
            match out.iter_mut().find(|m| m.key == key) {
                Some(existing) => existing.default = default,
                None => out.push(MetricDefault { key, default }),
            }
        }
        Self { metrics: out }
    }

    /// Schema where every key defaults to `0.0`.
    pub fn with_keys<K, I>(keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        Self::new(keys.into_iter().map(|k| (k, 0.0)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.metrics.iter().any(|m| m.key == key)
    }

    pub fn default_for(&self, key: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.default)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Complete `snapshot` against the schema.
    ///
    /// Iterates the schema, never the input: unknown keys are dropped and
    /// missing or non-finite values take the registered default.
    pub fn normalize(&self, snapshot: &Snapshot) -> NormalizedSnapshot {
        let values = self
            .metrics
            .iter()
            .map(|m| {
                let value = match snapshot.get(&m.key) {
                    Some(v) if v.is_finite() => *v,
                    Some(v) => {
                        debug!("metric `{}` reported {v}, using default {}", m.key, m.default);
                        m.default
                    }
                    None => m.default,
                };
                (m.key.clone(), value)
            })
            .collect();

        for key in snapshot.keys().filter(|k| !self.contains(k)) {
            trace!("dropping unknown metric `{key}`");
        }

        NormalizedSnapshot { values }
    }
}

/// Snapshot holding a value for every schema key, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSnapshot {
    values: Vec<(String, f64)>,
}

impl NormalizedSnapshot {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert back into a raw snapshot carrying every key.
    pub fn to_snapshot(&self) -> Snapshot {
        self.values.iter().cloned().collect()
    }
}
