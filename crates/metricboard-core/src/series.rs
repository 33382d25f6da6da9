//! Fixed-capacity rolling window of `(x, y)` points.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, SeriesError};

/// How a pushed `y` is folded into the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMode {
    /// Each push is a fresh reading.
    #[default]
    Replace,
    /// Each push is a delta added to the newest retained value.
    Accumulate,
}

impl std::fmt::Display for SeriesMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Accumulate => write!(f, "accumulate"),
        }
    }
}

/// Owned copy of a series window, oldest point first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesView {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// Sliding window holding exactly `capacity` points.
///
/// Both axes start filled, so the window length never changes: every push
/// evicts the oldest point. The first push locks the update mode; a later push
/// in the other mode is refused with [`SeriesError::ModeConflict`].
#[derive(Debug, Clone)]
pub struct RollingSeries {
    xs: VecDeque<f64>,
    ys: VecDeque<f64>,
    capacity: usize,
    mode: Option<SeriesMode>,
}

impl RollingSeries {
    pub fn new(capacity: usize, fill: f64) -> Result<Self, ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        Ok(Self {
            xs: std::iter::repeat_n(fill, capacity).collect(),
            ys: std::iter::repeat_n(fill, capacity).collect(),
            capacity,
            mode: None,
        })
    }

    /// Series whose mode is fixed before the first push.
    pub fn with_mode(
        capacity: usize,
        fill: f64,
        mode: SeriesMode,
    ) -> Result<Self, ConfigurationError> {
        let mut series = Self::new(capacity, fill)?;
        series.mode = Some(mode);
        Ok(series)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Locked mode, or `None` before the first push.
    pub fn mode(&self) -> Option<SeriesMode> {
        self.mode
    }

    pub fn push_replace(&mut self, x: f64, y: f64) -> Result<(), SeriesError> {
        self.lock(SeriesMode::Replace)?;
        self.shift_in(x, y);
        Ok(())
    }

    pub fn push_accumulate(&mut self, x: f64, delta: f64) -> Result<(), SeriesError> {
        self.lock(SeriesMode::Accumulate)?;
        let base = self.ys.back().copied().unwrap_or(0.0);
        let total = base + delta;
        if !total.is_finite() {
            return Err(SeriesError::Overflow);
        }
        self.shift_in(x, total);
        Ok(())
    }

    pub fn push(&mut self, mode: SeriesMode, x: f64, y: f64) -> Result<(), SeriesError> {
        match mode {
            SeriesMode::Replace => self.push_replace(x, y),
            SeriesMode::Accumulate => self.push_accumulate(x, y),
        }
    }

    /// Newest `(x, y)` point.
    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.xs.back()?, *self.ys.back()?))
    }

    pub fn snapshot(&self) -> SeriesView {
        SeriesView {
            xs: self.xs.iter().copied().collect(),
            ys: self.ys.iter().copied().collect(),
        }
    }

    fn lock(&mut self, requested: SeriesMode) -> Result<(), SeriesError> {
        match self.mode {
            Some(locked) if locked != requested => {
                Err(SeriesError::ModeConflict { locked, requested })
            }
            Some(_) => Ok(()),
            None => {
                self.mode = Some(requested);
                Ok(())
            }
        }
    }

    fn shift_in(&mut self, x: f64, y: f64) {
        self.xs.pop_front();
        self.ys.pop_front();
        self.xs.push_back(x);
        self.ys.push_back(y);
    }
}
