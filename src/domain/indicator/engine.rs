//! Incremental indicator engine.
//!
//! SMA(n)[t]      = sum(C[t-n+1..=t]) / n
//! V(n, lag)[t]   = (SMA(n)[t] - SMA(n)[t-lag]) / lag
//! EXT[t]         = C[t] / SMA(long)[t] - 1
//! VOLR[t]        = VOL[t] / mean(VOL[t-m+1..=t])
//! CONV[t]        = (C[t] - L[t]) / max(H[t] - L[t], eps)
//!
//! Every quantity comes from a fixed-size circular buffer, so each bar costs
//! O(1) regardless of window length.

use super::window::RollingWindow;
use super::{IndicatorConfig, IndicatorPoint, IndicatorSeries, IndicatorSnapshot};
use crate::domain::config_validation::validate_indicator_config;
use crate::domain::error::ConfigError;
use crate::domain::ohlcv::Bar;
use crate::domain::series::Series;

/// Streaming calculator: feed bars in timestamp order, one at a time.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
    short_closes: RollingWindow,
    long_closes: RollingWindow,
    volumes: RollingWindow,
    // Last `lag + 1` moving-average values, newest first via `back`.
    short_ma_history: RollingWindow,
    long_ma_history: RollingWindow,
    bars_seen: usize,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, ConfigError> {
        validate_indicator_config(&config)?;
        Ok(Self {
            config,
            short_closes: RollingWindow::new(config.short_window),
            long_closes: RollingWindow::new(config.long_window),
            volumes: RollingWindow::new(config.volume_window),
            short_ma_history: RollingWindow::new(config.velocity_lag + 1),
            long_ma_history: RollingWindow::new(config.velocity_lag + 1),
            bars_seen: 0,
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Consume the next bar and return its snapshot, or `None` while the
    /// trailing history is too short.
    pub fn push(&mut self, bar: &Bar) -> Option<IndicatorSnapshot> {
        self.bars_seen += 1;
        self.short_closes.push(bar.close);
        self.long_closes.push(bar.close);
        self.volumes.push(bar.volume);

        if let Some(ma) = self.short_closes.mean() {
            self.short_ma_history.push(ma);
        }
        if let Some(ma) = self.long_closes.mean() {
            self.long_ma_history.push(ma);
        }

        let lag = self.config.velocity_lag;
        let velocity_short = velocity(&self.short_ma_history, lag)?;
        let velocity_long = velocity(&self.long_ma_history, lag)?;
        let short_ma = self.short_ma_history.newest()?;
        let long_ma = self.long_ma_history.newest()?;
        let mean_volume = self.volumes.mean()?;

        Some(IndicatorSnapshot {
            short_ma,
            long_ma,
            velocity_short,
            velocity_long,
            extension_ratio: bar.close / long_ma - 1.0,
            volume_ratio: bar.volume / mean_volume,
            conviction_score: bar.close_location(),
        })
    }

    pub fn reset(&mut self) {
        self.short_closes.clear();
        self.long_closes.clear();
        self.volumes.clear();
        self.short_ma_history.clear();
        self.long_ma_history.clear();
        self.bars_seen = 0;
    }
}

fn velocity(history: &RollingWindow, lag: usize) -> Option<f64> {
    if !history.is_full() {
        return None;
    }
    let now = history.newest()?;
    let then = history.back(lag)?;
    Some((now - then) / lag as f64)
}

/// Run a fresh engine over a whole series: one point per bar.
pub fn compute_indicators(
    series: &Series,
    config: &IndicatorConfig,
) -> Result<IndicatorSeries, ConfigError> {
    let mut engine = IndicatorEngine::new(*config)?;
    let points = series
        .bars()
        .iter()
        .map(|bar| IndicatorPoint {
            date: bar.date,
            snapshot: engine.push(bar),
        })
        .collect();

    Ok(IndicatorSeries {
        config: *config,
        points,
    })
}
