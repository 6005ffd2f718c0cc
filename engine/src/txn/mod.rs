//! # Transaction Module
//!
//! The vocabulary of pending work: deterministic transaction ids and the
//! per-transaction record the approval engine mutates.
//!
//! ```text
//! id.rs      — TxId: content-addressed identifier over (destination, value, payload)
//! record.rs  — TxRecord: the action, its approvals, and the terminal executed flag
//! ```
//!
//! Ids carry no creation-time entropy on purpose: the same requested action
//! always maps to the same id, so callers can compute an id before the
//! transaction exists and coordinate approvals out of band.

pub mod id;
pub mod record;

pub use id::TxId;
pub use record::TxRecord;
