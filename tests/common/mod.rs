#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use emacross::domain::backtest::BacktestConfig;
use emacross::domain::bar::PriceBar;
use emacross::domain::error::EmacrossError;
use emacross::domain::gate::{GateDecision, GateRequest};
use emacross::ports::data_port::PriceDataPort;
use emacross::ports::gate_port::ConfirmationGate;
use std::cell::RefCell;

pub fn ts(offset: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
        + Duration::minutes(15 * offset)
}

pub fn make_bar(offset: i64, close: f64) -> PriceBar {
    PriceBar {
        timestamp: ts(offset),
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(0.01),
        close,
        volume: 1000.0,
    }
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as i64, close))
        .collect()
}

/// Downtrend long enough to define fast(3)/slow(5) EMAs, then a sharp rally
/// producing an upward cross.
pub fn upward_cross_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
    closes.extend((0..6).map(|i| 92.0 + i as f64 * 4.0));
    closes
}

/// Uptrend, then a sharp fall producing a downward cross.
pub fn downward_cross_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    closes.extend((0..6).map(|i| 108.0 - i as f64 * 4.0));
    closes
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_equity: 10_000.0,
        position_size: 1.0,
        risk_free_rate: 0.0,
    }
}

pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, EmacrossError> {
        if let Some(reason) = &self.error {
            return Err(EmacrossError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn data_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, EmacrossError> {
        let bars = self.fetch_bars()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}

/// Gate that answers from a fixed script, in request order, and records what
/// it was asked.
pub struct ScriptedGate {
    decisions: RefCell<Vec<GateDecision>>,
    pub requests: RefCell<Vec<String>>,
}

impl ScriptedGate {
    pub fn new(decisions: Vec<GateDecision>) -> Self {
        Self {
            decisions: RefCell::new(decisions),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm(&self, request: &GateRequest) -> Result<GateDecision, EmacrossError> {
        self.requests
            .borrow_mut()
            .push(format!("{} {}", request.kind, request.timestamp));
        let mut decisions = self.decisions.borrow_mut();
        if decisions.is_empty() {
            return Ok(GateDecision::Approve);
        }
        Ok(decisions.remove(0))
    }
}

pub struct FailingGate;

impl ConfirmationGate for FailingGate {
    fn confirm(&self, _request: &GateRequest) -> Result<GateDecision, EmacrossError> {
        Err(EmacrossError::GateUnavailable {
            reason: "advisor offline".into(),
        })
    }
}
