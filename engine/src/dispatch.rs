//! # Dispatch Seam
//!
//! The one place the engine touches the outside world. When a transaction
//! reaches quorum, the engine hands `(destination, value, payload)` to a
//! [`Dispatcher`] supplied by the host and moves on.
//!
//! The outcome is observable but deliberately not acted upon: the
//! transaction is marked executed *before* the dispatch and stays executed
//! whether the call is delivered or not. Fire-and-forget is the contract
//! the engine inherits; hosts that need delivery guarantees build them on
//! top of the event log.

use serde::{Deserialize, Serialize};

use crate::identity::Address;

/// Result of an outbound call, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// The host performed the call (and any value transfer) successfully.
    Delivered,
    /// The call could not be performed. The engine logs this and nothing
    /// else — the transaction remains executed.
    Failed,
}

/// The outbound call primitive the hosting runtime provides.
///
/// `&mut self` because real dispatchers mutate — an account ledger debits
/// balances, a network host consumes a connection.
pub trait Dispatcher {
    /// Performs the outbound call to `destination` carrying `value` and
    /// `payload`.
    fn dispatch(&mut self, destination: &Address, value: u64, payload: &[u8]) -> DispatchOutcome;
}

// ---------------------------------------------------------------------------
// Stock implementations
// ---------------------------------------------------------------------------

/// A dispatcher that accepts everything and does nothing. For dry-run
/// hosts and tests where only the state machine matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDispatcher;

impl Dispatcher for NullDispatcher {
    fn dispatch(&mut self, _destination: &Address, _value: u64, _payload: &[u8]) -> DispatchOutcome {
        DispatchOutcome::Delivered
    }
}

/// One recorded outbound call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchCall {
    pub destination: Address,
    pub value: u64,
    pub payload: Vec<u8>,
}

/// A test double that records every call and reports a fixed outcome.
#[derive(Clone, Debug)]
pub struct RecordingDispatcher {
    /// Calls in dispatch order.
    pub calls: Vec<DispatchCall>,
    /// The outcome reported for every call.
    pub outcome: DispatchOutcome,
}

impl RecordingDispatcher {
    /// A recorder that reports `Delivered` for every call.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            outcome: DispatchOutcome::Delivered,
        }
    }

    /// A recorder that reports `Failed` for every call.
    pub fn failing() -> Self {
        Self {
            calls: Vec::new(),
            outcome: DispatchOutcome::Failed,
        }
    }
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&mut self, destination: &Address, value: u64, payload: &[u8]) -> DispatchOutcome {
        self.calls.push(DispatchCall {
            destination: *destination,
            value,
            payload: payload.to_vec(),
        });
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ADDRESS_LENGTH;

    #[test]
    fn recording_dispatcher_captures_calls() {
        let dest = Address::from_bytes([7u8; ADDRESS_LENGTH]);
        let mut d = RecordingDispatcher::new();

        assert_eq!(d.dispatch(&dest, 42, b"abc"), DispatchOutcome::Delivered);
        assert_eq!(d.calls.len(), 1);
        assert_eq!(d.calls[0].destination, dest);
        assert_eq!(d.calls[0].value, 42);
        assert_eq!(d.calls[0].payload, b"abc");
    }

    #[test]
    fn failing_dispatcher_reports_failed() {
        let dest = Address::from_bytes([7u8; ADDRESS_LENGTH]);
        let mut d = RecordingDispatcher::failing();
        assert_eq!(d.dispatch(&dest, 1, b""), DispatchOutcome::Failed);
        assert_eq!(d.calls.len(), 1);
    }
}
