//! Engine configuration: indicator windows, classifier thresholds and
//! backtest parameters, validated together.

use crate::domain::backtest::BacktestConfig;
use crate::domain::config_validation::{
    validate_backtest_config, validate_indicator_config, validate_thresholds, BACKTEST_SECTION,
    INDICATORS_SECTION, SIGNALS_SECTION,
};
use crate::domain::error::ConfigError;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::signal::Thresholds;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub thresholds: Thresholds,
    pub backtest: BacktestConfig,
}

impl EngineConfig {
    pub fn new(
        indicators: IndicatorConfig,
        thresholds: Thresholds,
        backtest: BacktestConfig,
    ) -> Result<Self, ConfigError> {
        let config = EngineConfig {
            indicators,
            thresholds,
            backtest,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_indicator_config(&self.indicators)?;
        validate_thresholds(&self.thresholds)?;
        validate_backtest_config(&self.backtest)?;
        Ok(())
    }

    /// Build from a config source. Absent keys take the documented default.
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self, ConfigError> {
        let d = EngineConfig::default();
        let ind = INDICATORS_SECTION;
        let sig = SIGNALS_SECTION;

        let indicators = IndicatorConfig {
            short_window: port.get_usize(ind, "short_window", d.indicators.short_window)?,
            long_window: port.get_usize(ind, "long_window", d.indicators.long_window)?,
            volume_window: port.get_usize(ind, "volume_window", d.indicators.volume_window)?,
            velocity_lag: port.get_usize(ind, "velocity_lag", d.indicators.velocity_lag)?,
        };

        let thresholds = Thresholds {
            extension_lower_bound: port.get_double(
                sig,
                "extension_lower_bound",
                d.thresholds.extension_lower_bound,
            )?,
            extension_upper_bound: port.get_double(
                sig,
                "extension_upper_bound",
                d.thresholds.extension_upper_bound,
            )?,
            volume_threshold: port.get_double(
                sig,
                "volume_threshold",
                d.thresholds.volume_threshold,
            )?,
            conviction_threshold: port.get_double(
                sig,
                "conviction_threshold",
                d.thresholds.conviction_threshold,
            )?,
            velocity_epsilon: port.get_double(
                sig,
                "velocity_epsilon",
                d.thresholds.velocity_epsilon,
            )?,
        };

        let backtest = BacktestConfig {
            initial_capital: port.get_double(
                BACKTEST_SECTION,
                "initial_capital",
                d.backtest.initial_capital,
            )?,
        };

        EngineConfig::new(indicators, thresholds, backtest)
    }
}
