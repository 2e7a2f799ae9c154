//! Stateful dual-EMA crossover detection.
//!
//! The engine walks a time-ordered series once, tracking the previous bar's
//! fast/slow ordering and the single live position. A cross emits at most one
//! exit and one entry on the same bar, exit first. Entry candidates pass
//! through the confirmation gate when one is configured; exits never do.

use log::{debug, warn};

use crate::domain::bar::{validate_series, PriceBar};
use crate::domain::error::EmacrossError;
use crate::domain::gate::{
    GateContext, GateDecision, GateRequest, IndicatorSnapshot, CONTEXT_WINDOW,
};
use crate::domain::indicator::{
    atr::calculate_atr, bollinger::calculate_bollinger, macd::calculate_macd_default,
    obv::calculate_obv, rsi::calculate_rsi, IndicatorSeries, IndicatorValue,
};
use crate::domain::signal::{OpenPosition, Side, Signal};
use crate::ports::gate_port::ConfirmationGate;

pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT_X100: u32 = 200;

/// Strict fast/slow ordering on the previous bar. Equality or an undefined
/// EMA leaves the ordering unset, so flat-lined values cannot flap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmaOrdering {
    FastAbove,
    FastBelow,
}

/// Auxiliary indicator panel backing the gate context.
#[derive(Debug, Clone)]
pub struct AuxSeries {
    pub rsi: IndicatorSeries,
    pub atr: IndicatorSeries,
    pub obv: IndicatorSeries,
    pub macd: IndicatorSeries,
    pub bollinger: IndicatorSeries,
}

impl AuxSeries {
    pub fn compute(bars: &[PriceBar]) -> Self {
        AuxSeries {
            rsi: calculate_rsi(bars, RSI_PERIOD),
            atr: calculate_atr(bars, ATR_PERIOD),
            obv: calculate_obv(bars),
            macd: calculate_macd_default(bars),
            bollinger: calculate_bollinger(bars, BOLLINGER_PERIOD, BOLLINGER_MULT_X100),
        }
    }

    fn snapshot_at(&self, i: usize, fast: Option<f64>, slow: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            fast_ema: fast,
            slow_ema: slow,
            rsi: self.rsi.simple_at(i),
            atr: self.atr.simple_at(i),
            obv: self.obv.simple_at(i),
            macd_histogram: self.macd.values.get(i).and_then(|p| {
                if !p.valid {
                    return None;
                }
                match p.value {
                    IndicatorValue::Macd { histogram, .. } => Some(histogram),
                    _ => None,
                }
            }),
            bollinger: self.bollinger.values.get(i).and_then(|p| {
                if !p.valid {
                    return None;
                }
                match p.value {
                    IndicatorValue::Bollinger {
                        upper,
                        middle,
                        lower,
                    } => Some((upper, middle, lower)),
                    _ => None,
                }
            }),
        }
    }
}

/// Per-run crossover state machine: FLAT, LONG or SHORT, transitions only
/// via confirmed entry/exit signals.
#[derive(Debug)]
pub struct CrossoverEngine {
    position: Option<OpenPosition>,
    prev_ordering: Option<EmaOrdering>,
    position_size: f64,
}

impl CrossoverEngine {
    pub fn new(position_size: f64) -> Self {
        CrossoverEngine {
            position: None,
            prev_ordering: None,
            position_size,
        }
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    /// Process one bar. Returns zero, one, or two signals (exit before entry
    /// within the same bar).
    pub fn process(
        &mut self,
        bar: &PriceBar,
        fast: Option<f64>,
        slow: Option<f64>,
        gate: Option<&dyn ConfirmationGate>,
        context: &GateContext,
    ) -> Vec<Signal> {
        let (Some(fast), Some(slow)) = (fast, slow) else {
            self.prev_ordering = None;
            return Vec::new();
        };

        let ordering = if fast > slow {
            Some(EmaOrdering::FastAbove)
        } else if fast < slow {
            Some(EmaOrdering::FastBelow)
        } else {
            None
        };

        let cross_to = match (self.prev_ordering, ordering) {
            (Some(EmaOrdering::FastBelow), Some(EmaOrdering::FastAbove)) => Some(Side::Long),
            (Some(EmaOrdering::FastAbove), Some(EmaOrdering::FastBelow)) => Some(Side::Short),
            _ => None,
        };
        self.prev_ordering = ordering;

        let Some(entry_side) = cross_to else {
            return Vec::new();
        };

        let mut signals = Vec::with_capacity(2);

        // Close an opposite position first; closing risk is unconditional.
        if let Some(open) = self.position.take() {
            if open.side == entry_side {
                // Cross in the direction already held; keep the position.
                self.position = Some(open);
                return signals;
            }
            signals.push(Signal {
                timestamp: bar.timestamp,
                kind: open.side.exit_kind(),
                price: bar.close,
                confirmation: None,
            });
        }

        let confirmation = match gate {
            None => None,
            Some(gate) => {
                let request = GateRequest {
                    kind: entry_side.entry_kind(),
                    timestamp: bar.timestamp,
                    price: bar.close,
                    context: context.clone(),
                };
                let decision = match gate.confirm(&request) {
                    Ok(d) => d,
                    Err(e) => {
                        // Fail closed: an unavailable advisor rejects entries.
                        warn!("gate unavailable at {}: {}", bar.timestamp, e);
                        GateDecision::Reject
                    }
                };
                if decision == GateDecision::Reject {
                    debug!(
                        "gate rejected {} at {}",
                        entry_side.entry_kind(),
                        bar.timestamp
                    );
                    return signals;
                }
                Some(decision)
            }
        };

        self.position = Some(OpenPosition {
            side: entry_side,
            entry_timestamp: bar.timestamp,
            entry_price: bar.close,
            size: self.position_size,
        });
        signals.push(Signal {
            timestamp: bar.timestamp,
            kind: entry_side.entry_kind(),
            price: bar.close,
            confirmation,
        });

        signals
    }
}

/// Run the engine over a full series, producing the confirmation-filtered
/// signal stream. Fast/slow EMA series must be one-to-one with `bars`.
pub fn generate_signals(
    bars: &[PriceBar],
    fast_series: &IndicatorSeries,
    slow_series: &IndicatorSeries,
    aux: &AuxSeries,
    gate: Option<&dyn ConfirmationGate>,
    position_size: f64,
) -> Result<Vec<Signal>, EmacrossError> {
    validate_series(bars)?;
    if fast_series.values.len() != bars.len() || slow_series.values.len() != bars.len() {
        return Err(EmacrossError::DataIntegrity {
            reason: format!(
                "indicator series length mismatch: {} bars, {} fast, {} slow",
                bars.len(),
                fast_series.values.len(),
                slow_series.values.len()
            ),
        });
    }

    let mut engine = CrossoverEngine::new(position_size);
    let mut signals = Vec::new();

    for (i, bar) in bars.iter().enumerate() {
        let fast = fast_series.simple_at(i);
        let slow = slow_series.simple_at(i);
        let window_start = (i + 1).saturating_sub(CONTEXT_WINDOW);
        let context = GateContext {
            recent_bars: &bars[window_start..=i],
            indicators: aux.snapshot_at(i, fast, slow),
        };
        signals.extend(engine.process(bar, fast, slow, gate, &context));
    }

    debug!("generated {} signals over {} bars", signals.len(), bars.len());
    Ok(signals)
}
