//! Backtest engine.
//!
//! Replays a signal stream against its series with a FLAT/LONG state machine.
//! A signal produced from bar t always executes at the open of bar t + 1, so
//! nothing about bar t (or later) can leak into its own fill price.

use tracing::{debug, warn};

use super::error::{DataGapError, GapKind};
use super::metrics::TradeStats;
use super::ohlcv::Bar;
use super::position::{Position, Trade};
use super::series::Series;
use super::signal::{Signal, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestConfig {
    /// Only scales `TradeStats::final_capital`; returns are size-independent.
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub stats: TradeStats,
    /// Still-open position marked to market at the last close. Not part of
    /// any closed-trade statistic.
    pub open_position_at_end: Option<Trade>,
}

impl BacktestResult {
    pub fn trade_count(&self) -> usize {
        self.stats.trade_count
    }

    pub fn win_rate(&self) -> f64 {
        self.stats.win_rate
    }

    pub fn average_return_pct(&self) -> f64 {
        self.stats.average_return_pct
    }

    pub fn compounded_return_pct(&self) -> f64 {
        self.stats.compounded_return_pct
    }

    pub fn max_drawdown_pct(&self) -> f64 {
        self.stats.max_drawdown_pct
    }
}

/// What a single signal did to the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Entered { bar_index: usize, price: f64 },
    Exited(Trade),
    /// Signal arrived on the last bar; there is no next open to trade at.
    Dropped { kind: SignalKind },
    Idle,
}

/// Owns the live position and the closed trades for one series.
#[derive(Debug)]
pub struct Backtester<'a> {
    bars: &'a [Bar],
    position: Position,
    trades: Vec<Trade>,
    next_signal: usize,
}

impl<'a> Backtester<'a> {
    pub fn new(series: &'a Series) -> Self {
        Self {
            bars: series.bars(),
            position: Position::Flat,
            trades: Vec::new(),
            next_signal: 0,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Apply the signal for the next bar. Signals must arrive one per bar, in
    /// bar order.
    pub fn on_signal(&mut self, signal: &Signal) -> Result<Fill, DataGapError> {
        let t = signal.bar_index;
        if t != self.next_signal || t >= self.bars.len() {
            return Err(DataGapError::new(self.next_signal, GapKind::SignalMisaligned));
        }
        self.next_signal += 1;

        let fill = match (self.position, signal.kind) {
            (Position::Flat, SignalKind::Buy) => match self.bars.get(t + 1) {
                Some(next) => {
                    self.position = Position::Long {
                        entry_bar_index: t + 1,
                        entry_price: next.open,
                    };
                    Fill::Entered {
                        bar_index: t + 1,
                        price: next.open,
                    }
                }
                None => Fill::Dropped { kind: signal.kind },
            },
            (Position::Long { .. }, SignalKind::Sell) => match self.bars.get(t + 1) {
                Some(next) => match self.position.close(t + 1, next.open) {
                    Some(trade) => {
                        self.trades.push(trade);
                        Fill::Exited(trade)
                    }
                    None => Fill::Idle,
                },
                None => Fill::Dropped { kind: signal.kind },
            },
            _ => Fill::Idle,
        };

        match fill {
            Fill::Entered { bar_index, price } => {
                debug!(signal_bar = t, bar_index, price, "entered long");
            }
            Fill::Exited(trade) => {
                debug!(
                    signal_bar = t,
                    bar_index = trade.exit_bar_index,
                    price = trade.exit_price,
                    return_pct = trade.return_pct,
                    "exited long"
                );
            }
            Fill::Dropped { kind } => {
                warn!(signal_bar = t, %kind, "signal on last bar dropped, no next open");
            }
            Fill::Idle => {}
        }

        Ok(fill)
    }

    /// Close out the run. Fails if fewer signals than bars were applied.
    pub fn finish(self, config: &BacktestConfig) -> Result<BacktestResult, DataGapError> {
        if self.next_signal != self.bars.len() {
            return Err(DataGapError::new(self.next_signal, GapKind::SignalMisaligned));
        }

        let open_position_at_end = match (self.position, self.bars.last()) {
            (Position::Long { .. }, Some(last)) => {
                let mut position = self.position;
                position.close(self.bars.len() - 1, last.close)
            }
            _ => None,
        };

        let stats = TradeStats::compute(&self.trades, config.initial_capital);
        Ok(BacktestResult {
            trades: self.trades,
            stats,
            open_position_at_end,
        })
    }
}

/// Replay `signals` (one per bar, in order) against `series`. Any
/// misalignment aborts the run; no partial result is returned.
pub fn run_backtest(
    series: &Series,
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestResult, DataGapError> {
    let mut backtester = Backtester::new(series);
    for signal in signals {
        backtester.on_signal(signal)?;
    }
    backtester.finish(config)
}
