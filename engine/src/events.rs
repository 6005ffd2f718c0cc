//! # Event Log
//!
//! Every state-changing operation appends exactly one entry to the
//! engine-owned, append-only [`EventLog`]. The log is an output the
//! surrounding system reads — not a callback or subscription mechanism —
//! so the engine's core logic stays free of listener lifecycle concerns.
//!
//! Entries are sequenced and timestamped at append time. Nothing is ever
//! removed: a cancelled transaction disappears from the ledger, but its
//! `Created`, `Approved`, and `Cancelled` entries remain as the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::Address;
use crate::txn::record::hex_bytes;
use crate::txn::TxId;

// ---------------------------------------------------------------------------
// WalletEvent
// ---------------------------------------------------------------------------

/// A structured description of one state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    /// A transaction record was created (or an existing slot reinitialized).
    Created {
        id: TxId,
        destination: Address,
        value: u64,
        #[serde(with = "hex_bytes")]
        payload: Vec<u8>,
    },
    /// A signer approved a transaction. Emitted on every approval call,
    /// including repeats by the same signer.
    Approved { id: TxId, approver: Address },
    /// A transaction reached quorum and its outbound call was dispatched.
    Executed { id: TxId },
    /// The owner cancelled a pending transaction.
    Cancelled { id: TxId },
    /// The owner added a signer to the roster.
    SignerAdded { signer: Address },
    /// The owner removed a signer from the roster.
    SignerRemoved { signer: Address },
    /// The recovery identity replaced the owner.
    OwnerRecovered { previous: Address, new_owner: Address },
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { id, .. } => write!(f, "Created({id})"),
            Self::Approved { id, approver } => write!(f, "Approved({id}, {approver})"),
            Self::Executed { id } => write!(f, "Executed({id})"),
            Self::Cancelled { id } => write!(f, "Cancelled({id})"),
            Self::SignerAdded { signer } => write!(f, "SignerAdded({signer})"),
            Self::SignerRemoved { signer } => write!(f, "SignerRemoved({signer})"),
            Self::OwnerRecovered { previous, new_owner } => {
                write!(f, "OwnerRecovered({previous} -> {new_owner})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventRecord / EventLog
// ---------------------------------------------------------------------------

/// One log entry: the event plus its position and append time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log. Strictly increasing, no gaps.
    pub seq: u64,
    /// When the entry was appended (UTC).
    pub at: DateTime<Utc>,
    /// The state change itself.
    pub event: WalletEvent,
}

/// Append-only event log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event, assigning it the next sequence number.
    pub fn append(&mut self, event: WalletEvent) -> &EventRecord {
        tracing::debug!(seq = self.entries.len() as u64, %event, "event appended");
        self.entries.push(EventRecord {
            seq: self.entries.len() as u64,
            at: Utc::now(),
            event,
        });
        self.entries.last().expect("just pushed")
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[EventRecord] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the bare events, oldest first. Convenient for tests
    /// and hosts that don't care about sequence numbers.
    pub fn events(&self) -> impl Iterator<Item = &WalletEvent> {
        self.entries.iter().map(|r| &r.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ADDRESS_LENGTH;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; ADDRESS_LENGTH])
    }

    #[test]
    fn append_assigns_increasing_seq() {
        let mut log = EventLog::new();
        log.append(WalletEvent::SignerAdded { signer: addr(2) });
        log.append(WalletEvent::SignerRemoved { signer: addr(2) });

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].seq, 0);
        assert_eq!(log.entries()[1].seq, 1);
    }

    #[test]
    fn display_is_compact() {
        let e = WalletEvent::SignerAdded { signer: addr(2) };
        let s = e.to_string();
        assert!(s.starts_with("SignerAdded("));
    }

    #[test]
    fn log_serialization_roundtrip() {
        let mut log = EventLog::new();
        let id = TxId::derive(&addr(9), 7, b"x");
        log.append(WalletEvent::Created {
            id,
            destination: addr(9),
            value: 7,
            payload: b"x".to_vec(),
        });
        log.append(WalletEvent::Executed { id });

        let json = serde_json::to_string(&log).unwrap();
        let restored: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.entries(), log.entries());
    }
}
