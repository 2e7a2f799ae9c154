//! Confirmation gate port trait.

use crate::domain::error::EmacrossError;
use crate::domain::gate::{GateDecision, GateRequest};

/// External advisory consulted before opening a position.
///
/// Implementations must answer synchronously; any bounded timeout belongs to
/// the adapter. An `Err` is treated by the engine as a rejection for entry
/// candidates (fail-closed) and never suppresses an exit.
pub trait ConfirmationGate {
    fn confirm(&self, request: &GateRequest) -> Result<GateDecision, EmacrossError>;
}
