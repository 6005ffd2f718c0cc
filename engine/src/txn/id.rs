//! # Transaction Ids
//!
//! A [`TxId`] is a content-addressed fingerprint of a requested action:
//! the domain-separated BLAKE3 hash of `(destination, value, payload)`.
//!
//! Two properties fall out of this construction:
//!
//! - **Predictability.** Anyone can compute the id of an action before the
//!   transaction is created, which is how out-of-band approval coordination
//!   works.
//! - **Collision by design.** Submitting the same triple twice produces the
//!   same id and re-targets the same ledger slot. There is no nonce and no
//!   timestamp in the preimage.
//!
//! Domain separation uses BLAKE3's `derive_key` mode with a fixed context
//! string, so transaction ids can never collide with hashes computed
//! elsewhere over the same bytes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::{TX_ID_CONTEXT, TX_ID_FIELD_SEPARATOR, TX_ID_LENGTH};
use crate::identity::Address;

/// A unique, content-addressed identifier for a transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId([u8; TX_ID_LENGTH]);

impl TxId {
    /// Creates a `TxId` from a raw 32-byte hash.
    pub fn from_bytes(bytes: [u8; TX_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; TX_ID_LENGTH] {
        &self.0
    }

    /// Returns the hex-encoded id.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded id. Accepts exactly 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != TX_ID_LENGTH {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; TX_ID_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives the id of the action `(destination, value, payload)`.
    ///
    /// The preimage is the concatenation of:
    /// - `destination` (20 bytes)
    /// - `0x00` separator
    /// - `value` (8 bytes, little-endian)
    /// - `0x00` separator
    /// - `payload` (variable length, last field)
    ///
    /// hashed with BLAKE3 in `derive_key` mode under
    /// [`TX_ID_CONTEXT`](crate::config::TX_ID_CONTEXT). Pure: identical
    /// inputs always produce identical output, with no per-call entropy.
    pub fn derive(destination: &Address, value: u64, payload: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(TX_ID_CONTEXT);
        hasher.update(destination.as_bytes());
        hasher.update(&[TX_ID_FIELD_SEPARATOR]);
        hasher.update(&value.to_le_bytes());
        hasher.update(&[TX_ID_FIELD_SEPARATOR]);
        hasher.update(payload);
        Self(*hasher.finalize().as_bytes())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Hex-string serde, for the same reasons as `Address`: readable documents
// and valid JSON map keys.

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxId::from_hex(&s).map_err(serde::de::Error::custom)
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
    fn derive_is_deterministic() {
        let a = TxId::derive(&addr(1), 100, b"payload");
        let b = TxId::derive(&addr(1), 100, b"payload");
        assert_eq!(a, b);
    }

    #[test]
    fn each_field_perturbs_the_id() {
        let base = TxId::derive(&addr(1), 100, b"payload");
        assert_ne!(base, TxId::derive(&addr(2), 100, b"payload"));
        assert_ne!(base, TxId::derive(&addr(1), 101, b"payload"));
        assert_ne!(base, TxId::derive(&addr(1), 100, b"payloae"));
    }

    #[test]
    fn empty_payload_is_valid() {
        let a = TxId::derive(&addr(1), 0, b"");
        let b = TxId::derive(&addr(1), 0, b"");
        assert_eq!(a, b);
    }

    #[test]
    fn hex_roundtrip() {
        let id = TxId::derive(&addr(7), 42, b"data");
        assert_eq!(TxId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(TxId::from_hex("abcd").is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = TxId::derive(&addr(7), 42, b"data");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));

        let back: TxId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
