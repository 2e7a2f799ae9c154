//! Trade signals and run-local position state.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::gate::GateDecision;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn entry_kind(self) -> SignalKind {
        match self {
            Side::Long => SignalKind::LongEntry,
            Side::Short => SignalKind::ShortEntry,
        }
    }

    pub fn exit_kind(self) -> SignalKind {
        match self {
            Side::Long => SignalKind::LongExit,
            Side::Short => SignalKind::ShortExit,
        }
    }

    /// +1 for long, -1 for short.
    pub fn direction(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    LongEntry,
    LongExit,
    ShortEntry,
    ShortExit,
}

impl SignalKind {
    pub fn is_entry(self) -> bool {
        matches!(self, SignalKind::LongEntry | SignalKind::ShortEntry)
    }

    pub fn side(self) -> Side {
        match self {
            SignalKind::LongEntry | SignalKind::LongExit => Side::Long,
            SignalKind::ShortEntry | SignalKind::ShortExit => Side::Short,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::LongEntry => write!(f, "LONG_ENTRY"),
            SignalKind::LongExit => write!(f, "LONG_EXIT"),
            SignalKind::ShortEntry => write!(f, "SHORT_ENTRY"),
            SignalKind::ShortExit => write!(f, "SHORT_EXIT"),
        }
    }
}

/// An emitted signal event. Created at most once per crossover; immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub kind: SignalKind,
    /// Close of the bar the signal fired on.
    pub price: f64,
    /// Gate outcome for entries; `None` when no gate was configured, and
    /// always `None` for exits (closing risk is unconditional).
    pub confirmation: Option<GateDecision>,
}

/// The single live position of a run. FLAT is the absence of one.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub size: f64,
}

impl OpenPosition {
    /// Mark-to-market P&L at the given price.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.size * self.side.direction()
    }
}
