//! Built-in confirmation gate implementations.
//!
//! `AutoApproveGate` keeps the gate plumbing active without filtering, useful
//! for measuring the raw strategy. `RsiAdvisorGate` is a local advisor that
//! vetoes entries into momentum extremes: no long into an overbought market,
//! no short into an oversold one.

use log::debug;

use crate::domain::error::EmacrossError;
use crate::domain::gate::{GateDecision, GateRequest};
use crate::domain::signal::SignalKind;
use crate::ports::gate_port::ConfirmationGate;

pub struct AutoApproveGate;

impl ConfirmationGate for AutoApproveGate {
    fn confirm(&self, _request: &GateRequest) -> Result<GateDecision, EmacrossError> {
        Ok(GateDecision::Approve)
    }
}

pub struct RsiAdvisorGate {
    overbought: f64,
    oversold: f64,
}

impl RsiAdvisorGate {
    pub fn new(overbought: f64, oversold: f64) -> Self {
        Self {
            overbought,
            oversold,
        }
    }
}

impl ConfirmationGate for RsiAdvisorGate {
    fn confirm(&self, request: &GateRequest) -> Result<GateDecision, EmacrossError> {
        let rsi = request
            .context
            .indicators
            .rsi
            .ok_or_else(|| EmacrossError::GateUnavailable {
                reason: format!("RSI not yet defined at {}", request.timestamp),
            })?;

        let decision = match request.kind {
            SignalKind::LongEntry if rsi > self.overbought => GateDecision::Reject,
            SignalKind::ShortEntry if rsi < self.oversold => GateDecision::Reject,
            _ => GateDecision::Approve,
        };
        debug!(
            "rsi advisor: {} at {} with RSI {:.2} -> {:?}",
            request.kind, request.timestamp, rsi, decision
        );
        Ok(decision)
    }
}
