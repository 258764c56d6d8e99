//! Configuration validation.
//!
//! Every rule is its own function returning the first `ConfigError` found,
//! named after the INI section and key the value comes from.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::ConfigError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::signal::Thresholds;

pub const INDICATORS_SECTION: &str = "indicators";
pub const SIGNALS_SECTION: &str = "signals";
pub const BACKTEST_SECTION: &str = "backtest";

/// Upper bound on any window or lag. Buffers are allocated up front, and the
/// warm-up arithmetic stays far from overflow.
pub const MAX_WINDOW: usize = 1_000_000;

pub fn validate_indicator_config(config: &IndicatorConfig) -> Result<(), ConfigError> {
    validate_window("short_window", config.short_window)?;
    validate_window("long_window", config.long_window)?;
    validate_window("volume_window", config.volume_window)?;
    validate_window("velocity_lag", config.velocity_lag)?;
    validate_window_order(config)?;
    Ok(())
}

pub fn validate_thresholds(thresholds: &Thresholds) -> Result<(), ConfigError> {
    validate_extension_bounds(thresholds)?;
    validate_volume_threshold(thresholds)?;
    validate_conviction_threshold(thresholds)?;
    validate_velocity_epsilon(thresholds)?;
    Ok(())
}

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), ConfigError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(ConfigError::new(
            BACKTEST_SECTION,
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_window(key: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::new(
            INDICATORS_SECTION,
            key,
            format!("{key} must be positive"),
        ));
    }
    if value > MAX_WINDOW {
        return Err(ConfigError::new(
            INDICATORS_SECTION,
            key,
            format!("{key} must be at most {MAX_WINDOW}, got {value}"),
        ));
    }
    Ok(())
}

fn validate_window_order(config: &IndicatorConfig) -> Result<(), ConfigError> {
    if config.short_window >= config.long_window {
        return Err(ConfigError::new(
            INDICATORS_SECTION,
            "short_window",
            format!(
                "short_window ({}) must be less than long_window ({})",
                config.short_window, config.long_window
            ),
        ));
    }
    Ok(())
}

fn validate_extension_bounds(thresholds: &Thresholds) -> Result<(), ConfigError> {
    let lower = thresholds.extension_lower_bound;
    let upper = thresholds.extension_upper_bound;
    if !lower.is_finite() {
        return Err(ConfigError::new(
            SIGNALS_SECTION,
            "extension_lower_bound",
            "extension_lower_bound must be finite",
        ));
    }
    if !upper.is_finite() {
        return Err(ConfigError::new(
            SIGNALS_SECTION,
            "extension_upper_bound",
            "extension_upper_bound must be finite",
        ));
    }
    if lower > upper {
        return Err(ConfigError::new(
            SIGNALS_SECTION,
            "extension_lower_bound",
            format!("extension_lower_bound ({lower}) exceeds extension_upper_bound ({upper})"),
        ));
    }
    Ok(())
}

fn validate_volume_threshold(thresholds: &Thresholds) -> Result<(), ConfigError> {
    let value = thresholds.volume_threshold;
    if !value.is_finite() || value < 1.0 {
        return Err(ConfigError::new(
            SIGNALS_SECTION,
            "volume_threshold",
            "volume_threshold must be at least 1",
        ));
    }
    Ok(())
}

fn validate_conviction_threshold(thresholds: &Thresholds) -> Result<(), ConfigError> {
    let value = thresholds.conviction_threshold;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::new(
            SIGNALS_SECTION,
            "conviction_threshold",
            "conviction_threshold must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_velocity_epsilon(thresholds: &Thresholds) -> Result<(), ConfigError> {
    let value = thresholds.velocity_epsilon;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::new(
            SIGNALS_SECTION,
            "velocity_epsilon",
            "velocity_epsilon must be non-negative",
        ));
    }
    Ok(())
}
