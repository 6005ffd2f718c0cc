//! # Identity Module
//!
//! Who is allowed to do what. Every participant the engine cares about is
//! identified by an opaque 20-byte [`Address`] assigned by the hosting
//! runtime — the engine never verifies keys or signatures, it only compares
//! identities the host has already authenticated.
//!
//! The identity stack has two layers:
//!
//! 1. **Address** — the raw identity. Hex-encoded, ordered, hashable.
//! 2. **SignerRoster** — the authorization table: one owner, an ordered set
//!    of unique signers, the quorum threshold, and the fixed recovery
//!    identity. Every mutation re-validates the quorum invariant.

pub mod address;
pub mod roster;

pub use address::Address;
pub use roster::{RosterError, SignerRoster};
