//! # Transaction Records
//!
//! A [`TxRecord`] is one pending (or executed) action: the immutable
//! `(destination, value, payload)` triple set at creation, the set of
//! signers that have approved it, and the terminal `executed` flag.
//!
//! The record itself knows nothing about quorums or rosters — it only
//! stores facts. The wallet decides when those facts add up to execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::identity::Address;

/// Serde helper for byte payloads: hex strings in JSON instead of arrays
/// of numbers. `{"payload": "deadbeef"}` reads better in a state snapshot
/// than fifty comma-separated integers.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// One transaction: the requested action plus its approval state.
///
/// `destination`, `value`, and `payload` are set once at creation and never
/// mutated. `approvals` only grows. `executed` flips false → true at most
/// once and stays true.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Where the outbound call goes.
    pub destination: Address,

    /// Value carried by the call, in the host's smallest unit.
    pub value: u64,

    /// Opaque call payload, forwarded verbatim to the dispatcher.
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,

    /// Signers that have approved this transaction. A `BTreeSet` so the
    /// serialized form is deterministic regardless of approval order.
    pub approvals: BTreeSet<Address>,

    /// Terminal execution flag.
    pub executed: bool,

    /// When this record was (re)created.
    pub created_at: DateTime<Utc>,
}

impl TxRecord {
    /// Creates a fresh record: no approvals, not executed.
    pub fn new(destination: Address, value: u64, payload: Vec<u8>) -> Self {
        Self {
            destination,
            value,
            payload,
            approvals: BTreeSet::new(),
            executed: false,
            created_at: Utc::now(),
        }
    }

    /// Records an approval. Returns `true` if this signer had not approved
    /// before, `false` on a repeat — the approval set never shrinks either
    /// way.
    pub fn approve(&mut self, signer: Address) -> bool {
        self.approvals.insert(signer)
    }

    /// Whether the given identity has approved this transaction.
    pub fn has_approved(&self, identity: &Address) -> bool {
        self.approvals.contains(identity)
    }

    /// Marks the record executed. The caller is responsible for checking
    /// the flag first; this method only flips it.
    pub fn mark_executed(&mut self) {
        self.executed = true;
    }
}
