//! # Engine Configuration & Constants
//!
//! Every magic number in AEGIS lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.

/// Engine version string, kept in lockstep with the crate version.
///
/// Reported by hosts in status output so operators can tell at a glance
/// which state-machine semantics a running wallet implements.
pub const ENGINE_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Identifier Widths
// ---------------------------------------------------------------------------

/// Length of an [`Address`](crate::identity::Address) in bytes.
///
/// 20 bytes of opaque identity, hex-encoded for display. Wide enough that
/// collisions are not a practical concern, short enough to eyeball in logs.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a [`TxId`](crate::txn::TxId) in bytes. BLAKE3 output width.
pub const TX_ID_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Transaction Id Derivation
// ---------------------------------------------------------------------------

/// Domain-separation context for transaction id derivation.
///
/// Fed to BLAKE3's `derive_key` mode so that a transaction id can never
/// collide with any other hash the surrounding system computes over the
/// same bytes. Changing this string changes every transaction id — it is
/// consensus-critical for any deployment that persists state.
pub const TX_ID_CONTEXT: &str = "aegis/tx-id/v1";

/// Separator byte between fields in the id preimage.
pub const TX_ID_FIELD_SEPARATOR: u8 = 0x00;
