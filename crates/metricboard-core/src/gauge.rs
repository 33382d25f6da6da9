//! Single-value widgets: auto-ranging gauges and plain numeric cards.

use serde::{Deserialize, Serialize};

use crate::error::InvalidValueError;

/// Render model handed to a gauge sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeView {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Latest reading plus the largest reading seen so far.
///
/// The upper bound only grows, so the gauge scale never shrinks under a
/// historical peak. The lower bound is always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaugeState {
    current_value: f64,
    observed_max: f64,
}

impl GaugeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading. Negative or non-finite values are refused and leave
    /// the gauge as it was.
    pub fn update(&mut self, value: f64) -> Result<(), InvalidValueError> {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidValueError { value });
        }
        self.current_value = value;
        if value > self.observed_max {
            self.observed_max = value;
        }
        Ok(())
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn observed_max(&self) -> f64 {
        self.observed_max
    }

    pub fn render(&self) -> GaugeView {
        GaugeView {
            value: self.current_value,
            min: 0.0,
            max: self.observed_max,
        }
    }
}

/// Latest reading only, shown as text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CardState {
    current_value: f64,
}

impl CardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) -> Result<(), InvalidValueError> {
        if !value.is_finite() {
            return Err(InvalidValueError { value });
        }
        self.current_value = value;
        Ok(())
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }
}
