//! End-to-end runs: indicators, then signals, then the backtest.
//!
//! Symbols share nothing, so batch runs fan out over rayon and collect back
//! in input order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config::EngineConfig;
use crate::domain::error::{ConfigError, SigtraderError};
use crate::domain::indicator::{compute_indicators, IndicatorSnapshot};
use crate::domain::series::Series;
use crate::domain::signal::{classify, classify_series, Signal, SignalKind};
use crate::ports::data_port::DataPort;

/// Cooperative cancellation shared between a caller and a batch run. Checked
/// once per symbol before work starts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolReport {
    pub symbol: String,
    pub signals: Vec<Signal>,
    pub result: BacktestResult,
}

impl SymbolReport {
    pub fn count(&self, kind: SignalKind) -> usize {
        self.signals.iter().filter(|s| s.kind == kind).count()
    }
}

pub type BatchOutcome = (String, Result<SymbolReport, SigtraderError>);

pub fn run_symbol(series: &Series, config: &EngineConfig) -> Result<SymbolReport, SigtraderError> {
    config.validate()?;
    let symbol = series.symbol();
    let indicators = compute_indicators(series, &config.indicators)?;
    let signals = classify_series(&indicators, &config.thresholds);

    for signal in signals.iter().filter(|s| s.kind != SignalKind::Wait) {
        debug!(
            %symbol,
            bar_index = signal.bar_index,
            kind = %signal.kind,
            "signal"
        );
    }

    let result = run_backtest(series, &signals, &config.backtest)
        .map_err(|e| SigtraderError::data_gap(symbol, e))?;

    info!(
        %symbol,
        bars = series.len(),
        trades = result.trade_count(),
        win_rate = result.win_rate(),
        compounded_return_pct = result.compounded_return_pct(),
        "symbol complete"
    );

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        signals,
        result,
    })
}

/// Run every series in parallel. One entry per input, same order; a failure
/// is confined to its own entry. An invalid config fails every entry up front.
pub fn run_batch(
    series_list: &[Series],
    config: &EngineConfig,
    cancel: &CancelFlag,
) -> Vec<BatchOutcome> {
    if let Err(e) = config.validate() {
        return reject_all(series_list.iter().map(Series::symbol), e);
    }
    series_list
        .par_iter()
        .map(|series| {
            let symbol = series.symbol().to_string();
            let outcome = if cancel.is_cancelled() {
                Err(SigtraderError::Cancelled {
                    symbol: symbol.clone(),
                })
            } else {
                run_symbol(series, config)
            };
            log_failure(&symbol, &outcome);
            (symbol, outcome)
        })
        .collect()
}

/// Load each symbol through `data_port` and run it. Bad or missing data fails
/// that symbol only.
pub fn run_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    config: &EngineConfig,
    cancel: &CancelFlag,
) -> Vec<BatchOutcome> {
    if let Err(e) = config.validate() {
        return reject_all(symbols.iter().map(String::as_str), e);
    }
    symbols
        .par_iter()
        .map(|symbol| {
            let outcome = if cancel.is_cancelled() {
                Err(SigtraderError::Cancelled {
                    symbol: symbol.clone(),
                })
            } else {
                load_series(data_port, symbol).and_then(|series| run_symbol(&series, config))
            };
            log_failure(symbol, &outcome);
            (symbol.clone(), outcome)
        })
        .collect()
}

pub fn load_series(data_port: &dyn DataPort, symbol: &str) -> Result<Series, SigtraderError> {
    let bars = data_port.fetch_bars(symbol)?;
    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Series::new(symbol, bars).map_err(|e| SigtraderError::data_gap(symbol, e))
}

/// Nothing runs on a bad config; every symbol reports the same error.
fn reject_all<'a>(
    symbols: impl Iterator<Item = &'a str>,
    error: ConfigError,
) -> Vec<BatchOutcome> {
    warn!(%error, "invalid config, batch not started");
    symbols
        .map(|symbol| (symbol.to_string(), Err(error.clone().into())))
        .collect()
}

fn log_failure(symbol: &str, outcome: &Result<SymbolReport, SigtraderError>) {
    if let Err(e) = outcome {
        warn!(%symbol, error = %e, "symbol failed");
    }
}

/// Latest-bar verdict for one symbol.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenEntry {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
    /// `None` while the series is still warming up.
    pub snapshot: Option<IndicatorSnapshot>,
}

/// Classify the most recent bar of every series. Only the indicators are
/// needed, not the backtest.
pub fn screen(
    series_list: &[Series],
    config: &EngineConfig,
) -> Result<Vec<ScreenEntry>, SigtraderError> {
    config.validate()?;
    series_list
        .par_iter()
        .map(|series| screen_one(series, config))
        .collect()
}

fn screen_one(series: &Series, config: &EngineConfig) -> Result<ScreenEntry, SigtraderError> {
    let indicators = compute_indicators(series, &config.indicators)?;
    let (index, last) = match series.last() {
        Some(bar) => (series.len() - 1, bar),
        None => {
            return Err(SigtraderError::NoData {
                symbol: series.symbol().to_string(),
            })
        }
    };
    let snapshot = indicators.get(index).copied();
    let signal = classify(index, snapshot.as_ref(), &config.thresholds);

    Ok(ScreenEntry {
        symbol: series.symbol().to_string(),
        date: last.date,
        close: last.close,
        signal,
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::GapKind;
    use crate::domain::ohlcv::Bar;
    use std::collections::HashMap;

    fn rising(symbol: &str, n: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 * 1.01_f64.powi(i as i32);
                Bar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close / 1.01,
                    high: close * 1.001,
                    low: close / 1.01,
                    close,
                    volume: if i >= 25 { 2000.0 } else { 1000.0 },
                }
            })
            .collect();
        Series::new(symbol, bars).unwrap()
    }

    #[test]
    fn cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn run_symbol_produces_one_signal_per_bar() {
        let series = rising("SPY", 60);
        let report = run_symbol(&series, &EngineConfig::default()).unwrap();
        assert_eq!(report.symbol, "SPY");
        assert_eq!(report.signals.len(), 60);
        assert!(report.count(SignalKind::Buy) > 0);
    }

    #[test]
    fn run_symbol_rejects_invalid_config() {
        let series = rising("SPY", 30);
        let mut config = EngineConfig::default();
        config.indicators.short_window = 25;
        assert!(matches!(
            run_symbol(&series, &config),
            Err(SigtraderError::Config(_))
        ));
    }

    fn bad_threshold_configs() -> Vec<(&'static str, EngineConfig)> {
        let mut conviction = EngineConfig::default();
        conviction.thresholds.conviction_threshold = 1.5;
        let mut epsilon = EngineConfig::default();
        epsilon.thresholds.velocity_epsilon = -1.0;
        let mut capital = EngineConfig::default();
        capital.backtest.initial_capital = 0.0;
        vec![
            ("conviction_threshold", conviction),
            ("velocity_epsilon", epsilon),
            ("initial_capital", capital),
        ]
    }

    #[test]
    fn run_symbol_rejects_invalid_thresholds() {
        let series = rising("SPY", 60);
        for (key, config) in bad_threshold_configs() {
            match run_symbol(&series, &config) {
                Err(SigtraderError::Config(e)) => assert_eq!(e.key, key),
                other => panic!("expected config error for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn batch_with_invalid_config_fails_every_symbol() {
        let list = vec![rising("A", 60), rising("B", 60)];
        for (key, config) in bad_threshold_configs() {
            let outcomes = run_batch(&list, &config, &CancelFlag::new());
            assert_eq!(outcomes.len(), 2);
            assert_eq!(outcomes[1].0, "B");
            for (_, outcome) in &outcomes {
                assert!(matches!(outcome, Err(SigtraderError::Config(e)) if e.key == key));
            }
        }
    }

    #[test]
    fn universe_with_invalid_config_fetches_nothing() {
        let data = MapData(HashMap::from([(
            "SPY".to_string(),
            rising("SPY", 60).bars().to_vec(),
        )]));
        let mut config = EngineConfig::default();
        config.thresholds.conviction_threshold = 1.5;
        let outcomes = run_universe(&data, &["SPY".to_string()], &config, &CancelFlag::new());
        assert_eq!(outcomes[0].0, "SPY");
        assert!(matches!(outcomes[0].1, Err(SigtraderError::Config(_))));
    }

    #[test]
    fn batch_keeps_input_order() {
        let list = vec![rising("A", 40), rising("B", 10), rising("C", 60)];
        let outcomes = run_batch(&list, &EngineConfig::default(), &CancelFlag::new());
        let symbols: Vec<&str> = outcomes.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
        assert!(outcomes.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn cancelled_batch_reports_every_symbol() {
        let list = vec![rising("A", 40), rising("B", 40)];
        let cancel = CancelFlag::new();
        cancel.cancel();
        let outcomes = run_batch(&list, &EngineConfig::default(), &cancel);
        assert_eq!(outcomes.len(), 2);
        for (symbol, outcome) in &outcomes {
            assert!(
                matches!(outcome, Err(SigtraderError::Cancelled { symbol: s }) if s == symbol)
            );
        }
    }

    struct MapData(HashMap<String, Vec<Bar>>);

    impl DataPort for MapData {
        fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, SigtraderError> {
            Ok(self.0.get(symbol).cloned().unwrap_or_default())
        }
    }

    #[test]
    fn universe_isolates_bad_symbols() {
        let good = rising("GOOD", 40).bars().to_vec();
        let mut bad = good.clone();
        bad[5].close = f64::NAN;
        let data = MapData(HashMap::from([
            ("GOOD".to_string(), good),
            ("BAD".to_string(), bad),
        ]));
        let symbols: Vec<String> = ["BAD", "GOOD", "MISSING"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let outcomes = run_universe(&data, &symbols, &EngineConfig::default(), &CancelFlag::new());
        assert_eq!(outcomes.len(), 3);
        match &outcomes[0].1 {
            Err(SigtraderError::DataGap { symbol, source }) => {
                assert_eq!(symbol, "BAD");
                assert_eq!(source.index, 5);
                assert_eq!(source.kind, GapKind::NonFinitePrice);
            }
            other => panic!("expected DataGap, got {other:?}"),
        }
        assert!(outcomes[1].1.is_ok());
        assert!(matches!(outcomes[2].1, Err(SigtraderError::NoData { .. })));
    }

    #[test]
    fn screen_reports_latest_bar() {
        let list = vec![rising("LONG", 40), rising("SHORT", 5)];
        let entries = screen(&list, &EngineConfig::default()).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].symbol, "LONG");
        assert_eq!(entries[0].signal.bar_index, 39);
        assert_eq!(entries[0].date, list[0].last().unwrap().date);
        assert!(entries[0].snapshot.is_some());

        assert!(entries[1].signal.is_insufficient_history());
        assert_eq!(entries[1].signal.kind, SignalKind::Wait);
        assert!(entries[1].snapshot.is_none());
    }
}
