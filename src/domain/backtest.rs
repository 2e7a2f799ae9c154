//! Signal-stream replay against the bar series.
//!
//! The backtester consumes an already-confirmed signal stream and replays it
//! bar by bar: entries open the single position, exits realize P&L, and every
//! bar appends a mark-to-market equity sample. Signals that do not line up
//! with the series or with the position state indicate an engine defect and
//! abort the run.

use chrono::NaiveDateTime;
use log::debug;
use std::fmt;

use crate::domain::bar::{validate_series, PriceBar};
use crate::domain::error::EmacrossError;
use crate::domain::metrics::Metrics;
use crate::domain::signal::{OpenPosition, Side, Signal, SignalKind};

#[derive(Debug, Clone, Copy)]
pub struct BacktestConfig {
    pub initial_equity: f64,
    pub position_size: f64,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_equity: 10_000.0,
            position_size: 1.0,
            risk_free_rate: 0.0,
        }
    }
}

/// Why a trade closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Closed by an opposite crossover signal.
    Cross,
    /// Force-closed at the final bar with the position still open.
    EndOfSeries,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Cross => write!(f, "CROSS"),
            ExitReason::EndOfSeries => write!(f, "END_OF_SERIES"),
        }
    }
}

/// One completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side: Side,
    pub size: f64,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// One sample per bar, initial equity first.
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
}

fn invariant(reason: String) -> EmacrossError {
    EmacrossError::SignalInvariant { reason }
}

/// Replay `signals` over `bars`. Signals must be time-ordered and each must
/// match a bar timestamp exactly.
pub fn run_backtest(
    bars: &[PriceBar],
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestResult, EmacrossError> {
    validate_series(bars)?;
    if bars.is_empty() {
        return Err(EmacrossError::DataIntegrity {
            reason: "cannot backtest an empty series".into(),
        });
    }

    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut position: Option<OpenPosition> = None;
    let mut realized = 0.0;
    let mut cursor = signals.iter().peekable();

    for bar in bars {
        while let Some(signal) = cursor.next_if(|s| s.timestamp == bar.timestamp) {
            apply_signal(signal, bar, &mut position, &mut realized, &mut trades, config)?;
        }
        if let Some(signal) = cursor.peek() {
            if signal.timestamp < bar.timestamp {
                return Err(invariant(format!(
                    "signal at {} matches no bar",
                    signal.timestamp
                )));
            }
        }

        let marked = position
            .as_ref()
            .map_or(0.0, |open| open.unrealized_pnl(bar.close));
        equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: config.initial_equity + realized + marked,
        });
    }

    if let Some(signal) = cursor.next() {
        return Err(invariant(format!(
            "signal at {} is past the end of the series",
            signal.timestamp
        )));
    }

    // Force-close a position still open at the final bar.
    if let (Some(open), Some(last)) = (position.take(), bars.last()) {
        // The final equity sample already marks this position to the last
        // close, so realized P&L needs no adjustment here.
        let pnl = open.unrealized_pnl(last.close);
        debug!("force-closing {} position at {}", open.side, last.timestamp);
        trades.push(Trade {
            side: open.side,
            size: open.size,
            entry_timestamp: open.entry_timestamp,
            entry_price: open.entry_price,
            exit_timestamp: last.timestamp,
            exit_price: last.close,
            pnl,
            exit_reason: ExitReason::EndOfSeries,
        });
    }

    let metrics = Metrics::compute(
        &trades,
        &equity_curve,
        config.initial_equity,
        config.risk_free_rate,
    );

    Ok(BacktestResult {
        trades,
        equity_curve,
        metrics,
    })
}

fn apply_signal(
    signal: &Signal,
    bar: &PriceBar,
    position: &mut Option<OpenPosition>,
    realized: &mut f64,
    trades: &mut Vec<Trade>,
    config: &BacktestConfig,
) -> Result<(), EmacrossError> {
    match signal.kind {
        SignalKind::LongEntry | SignalKind::ShortEntry => {
            if let Some(open) = position {
                return Err(invariant(format!(
                    "{} at {} while {} position open",
                    signal.kind, signal.timestamp, open.side
                )));
            }
            *position = Some(OpenPosition {
                side: signal.kind.side(),
                entry_timestamp: bar.timestamp,
                entry_price: signal.price,
                size: config.position_size,
            });
        }
        SignalKind::LongExit | SignalKind::ShortExit => {
            let open = position.take().ok_or_else(|| {
                invariant(format!("{} at {} while flat", signal.kind, signal.timestamp))
            })?;
            if open.side != signal.kind.side() {
                return Err(invariant(format!(
                    "{} at {} against a {} position",
                    signal.kind, signal.timestamp, open.side
                )));
            }
            let pnl = open.unrealized_pnl(signal.price);
            *realized += pnl;
            trades.push(Trade {
                side: open.side,
                size: open.size,
                entry_timestamp: open.entry_timestamp,
                entry_price: open.entry_price,
                exit_timestamp: bar.timestamp,
                exit_price: signal.price,
                pnl,
                exit_reason: ExitReason::Cross,
            });
        }
    }
    Ok(())
}
