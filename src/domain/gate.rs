//! Confirmation gate request/response types.
//!
//! The gate is an external advisor consulted per candidate entry signal. The
//! engine sends the candidate plus a trailing window of bars and an indicator
//! snapshot; the advisor answers approve or reject. Gate failures are the
//! caller's problem: entries fail closed, exits are never gated.

use chrono::NaiveDateTime;

use crate::domain::bar::PriceBar;
use crate::domain::signal::SignalKind;

/// Bars of trailing context handed to the gate with each candidate.
pub const CONTEXT_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Approve,
    Reject,
}

/// Indicator snapshot at the candidate bar. Fields are `None` while the
/// corresponding indicator is still warming up.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSnapshot {
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub obv: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bollinger: Option<(f64, f64, f64)>,
}

/// Trailing context for one confirmation request.
#[derive(Debug, Clone)]
pub struct GateContext<'a> {
    /// Most recent bars, oldest first, candidate bar last. At most
    /// [`CONTEXT_WINDOW`] entries.
    pub recent_bars: &'a [PriceBar],
    pub indicators: IndicatorSnapshot,
}

#[derive(Debug, Clone)]
pub struct GateRequest<'a> {
    pub kind: SignalKind,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub context: GateContext<'a>,
}
