//! Per-bar indicator snapshots.
//!
//! This module provides:
//! - `IndicatorConfig`: window lengths and velocity lag
//! - `IndicatorSnapshot`: every derived quantity for one bar
//! - `IndicatorPoint`: a snapshot (or insufficient history) tagged with its date
//! - `IndicatorSeries`: one point per bar of a `Series`
//! - `IndicatorEngine`: the incremental calculator behind all of the above

pub mod engine;
pub mod window;

pub use engine::{compute_indicators, IndicatorEngine};

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub volume_window: usize,
    pub velocity_lag: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            short_window: 10,
            long_window: 20,
            volume_window: 20,
            velocity_lag: 3,
        }
    }
}

impl IndicatorConfig {
    /// Index of the first bar with a complete snapshot: both moving averages
    /// need `velocity_lag` bars of history of their own, the volume mean only
    /// needs its window.
    pub fn first_valid_index(&self) -> usize {
        let ma_ready = self
            .short_window
            .max(self.long_window)
            .saturating_sub(1)
            .saturating_add(self.velocity_lag);
        ma_ready.max(self.volume_window.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorSnapshot {
    pub short_ma: f64,
    pub long_ma: f64,
    pub velocity_short: f64,
    pub velocity_long: f64,
    pub extension_ratio: f64,
    pub volume_ratio: f64,
    pub conviction_score: f64,
}

impl IndicatorSnapshot {
    /// velocity_short - velocity_long; positive means the short trend is
    /// pulling ahead of the long one.
    pub fn velocity_spread(&self) -> f64 {
        self.velocity_short - self.velocity_long
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    /// `None` while the trailing history is too short.
    pub snapshot: Option<IndicatorSnapshot>,
}

impl IndicatorPoint {
    pub fn is_valid(&self) -> bool {
        self.snapshot.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorSeries {
    pub config: IndicatorConfig,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorSnapshot> {
        self.points.get(index).and_then(|p| p.snapshot.as_ref())
    }

    pub fn valid_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_valid()).count()
    }
}
