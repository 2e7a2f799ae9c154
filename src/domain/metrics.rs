//! Performance metrics over a completed backtest.

use crate::domain::backtest::{EquityPoint, Trade};

/// Annualization factor for per-bar Sharpe (daily bars, trading days).
pub const BARS_PER_YEAR: f64 = 252.0;

/// P&L within this band of zero counts as breakeven.
const BREAKEVEN_EPSILON: f64 = 1e-9;

/// Summary statistics of one run. Ratio fields are `None` when the sample
/// they describe is empty: zero trades yields no win rate, not a 0% one.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Final equity over initial equity, minus one.
    pub total_return: f64,
    /// Largest peak-to-trough equity decline, as a fraction of the peak.
    pub max_drawdown: f64,
    /// Annualized Sharpe ratio of per-bar equity returns.
    pub sharpe_ratio: f64,
    pub win_rate: Option<f64>,
    pub avg_win: Option<f64>,
    pub avg_loss: Option<f64>,
    /// Gross profit over gross loss. `None` with no losing trades.
    pub profit_factor: Option<f64>,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl Metrics {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_equity: f64,
        risk_free_rate: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map_or(initial_equity, |point| point.equity);
        let total_return = if initial_equity > 0.0 {
            final_equity / initial_equity - 1.0
        } else {
            0.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut largest_win = 0.0f64;
        let mut largest_loss = 0.0f64;

        for trade in trades {
            if trade.pnl > BREAKEVEN_EPSILON {
                trades_won += 1;
                gross_profit += trade.pnl;
                largest_win = largest_win.max(trade.pnl);
            } else if trade.pnl < -BREAKEVEN_EPSILON {
                trades_lost += 1;
                gross_loss += -trade.pnl;
                largest_loss = largest_loss.min(trade.pnl);
            } else {
                trades_breakeven += 1;
            }
        }

        let win_rate = if trades.is_empty() {
            None
        } else {
            Some(trades_won as f64 / trades.len() as f64)
        };
        let avg_win = if trades_won > 0 {
            Some(gross_profit / trades_won as f64)
        } else {
            None
        };
        let avg_loss = if trades_lost > 0 {
            Some(-gross_loss / trades_lost as f64)
        } else {
            None
        };
        let profit_factor = if gross_loss > 0.0 {
            Some(gross_profit / gross_loss)
        } else {
            None
        };

        Metrics {
            total_return,
            max_drawdown: max_drawdown(equity_curve),
            sharpe_ratio: sharpe_ratio(equity_curve, risk_free_rate),
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
            trades_won,
            trades_lost,
            trades_breakeven,
            largest_win,
            largest_loss,
        }
    }
}

/// Largest fractional decline from any running peak.
fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            worst = worst.max((peak - point.equity) / peak);
        }
    }
    worst
}

/// Annualized Sharpe over per-bar returns; 0 when the sample is too small or
/// the returns are constant.
fn sharpe_ratio(equity_curve: &[EquityPoint], risk_free_rate: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let per_bar_rf = risk_free_rate / BARS_PER_YEAR;
    let mut returns = Vec::with_capacity(equity_curve.len() - 1);
    for window in equity_curve.windows(2) {
        let prev = window[0].equity;
        if prev.abs() < f64::EPSILON {
            return 0.0;
        }
        returns.push(window[1].equity / prev - 1.0 - per_bar_rf);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev < f64::EPSILON {
        return 0.0;
    }

    mean / stddev * BARS_PER_YEAR.sqrt()
}
