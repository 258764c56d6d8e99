//! Performance statistics over closed trades.
//!
//! All `*_pct` values are fractions. The equity curve is trade-by-trade: it
//! starts at 1.0 and applies each closed trade's return in order.

use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradeStats {
    pub trade_count: usize,
    pub win_rate: f64,
    pub average_return_pct: f64,
    pub compounded_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub profit_factor: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
    pub avg_hold_bars: f64,
    pub sharpe_ratio: f64,
    pub final_capital: f64,
}

impl TradeStats {
    pub fn compute(trades: &[Trade], initial_capital: f64) -> Self {
        let trade_count = trades.len();

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut best_trade_pct = 0.0_f64;
        let mut worst_trade_pct = 0.0_f64;
        let mut total_hold = 0usize;

        for (i, trade) in trades.iter().enumerate() {
            let r = trade.return_pct;
            if trade.is_win() {
                winning_trades += 1;
                total_wins += r;
            } else if trade.is_loss() {
                losing_trades += 1;
                total_losses += r.abs();
            }
            if i == 0 || r > best_trade_pct {
                best_trade_pct = r;
            }
            if i == 0 || r < worst_trade_pct {
                worst_trade_pct = r;
            }
            total_hold += trade.hold_bars();
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let equity = equity_curve(&returns);
        let compounded_return_pct = equity.last().map(|e| e - 1.0).unwrap_or(0.0);

        let per_trade = |total: f64, count: usize| {
            if count > 0 { total / count as f64 } else { 0.0 }
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        TradeStats {
            trade_count,
            win_rate: per_trade(winning_trades as f64, trade_count),
            average_return_pct: per_trade(returns.iter().sum(), trade_count),
            compounded_return_pct,
            max_drawdown_pct: compute_drawdown(&equity),
            winning_trades,
            losing_trades,
            avg_win_pct: per_trade(total_wins, winning_trades),
            avg_loss_pct: per_trade(total_losses, losing_trades),
            profit_factor,
            best_trade_pct,
            worst_trade_pct,
            avg_hold_bars: per_trade(total_hold as f64, trade_count),
            sharpe_ratio: compute_trade_sharpe(&returns),
            final_capital: initial_capital * (1.0 + compounded_return_pct),
        }
    }
}

/// Equity after each trade, starting from 1.0 (the starting point is included).
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    let mut equity = 1.0_f64;
    curve.push(equity);
    for r in returns {
        equity *= 1.0 + r;
        curve.push(equity);
    }
    curve
}

/// Largest peak-to-trough decline, as a fraction of the peak.
fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Mean over population standard deviation of per-trade returns. Not
/// annualised: trades have no fixed spacing in time.
fn compute_trade_sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 { mean / stddev } else { 0.0 }
}
