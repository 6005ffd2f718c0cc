//! # Addresses
//!
//! An [`Address`] is a 20-byte opaque identity. The engine treats it as a
//! pure comparison token: the hosting runtime authenticates callers and
//! hands the engine an address; the engine decides what that address may do.
//!
//! Addresses are hex-encoded everywhere a human or a JSON document might
//! see them, and implement `Ord` so that signer and approval sets serialize
//! in a deterministic order regardless of insertion history.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::ADDRESS_LENGTH;

/// A 20-byte opaque identity.
///
/// `Copy` on purpose — addresses flow through every operation signature in
/// the engine, and a 20-byte copy is cheaper than the bookkeeping of a
/// borrow.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Creates an `Address` from raw bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 20-byte identity.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the lowercase hex encoding of the address.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded address. Accepts exactly 40 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; ADDRESS_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Addresses serialize as hex strings, not byte arrays. JSON documents with
// `"destination": "aabbcc..."` stay reviewable by humans, and hex strings
// are valid JSON map keys where a byte array is not.

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; ADDRESS_LENGTH])
    }

    #[test]
    fn hex_roundtrip() {
        let a = addr(0xab);
        let parsed = Address::from_hex(&a.to_hex()).unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Address::from_hex("aabb").is_err());
        assert!(Address::from_hex(&"aa".repeat(21)).is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(Address::from_hex(&"zz".repeat(ADDRESS_LENGTH)).is_err());
    }

    #[test]
    fn display_is_full_hex() {
        let a = addr(0x01);
        assert_eq!(a.to_string(), "01".repeat(ADDRESS_LENGTH));
    }

    #[test]
    fn serializes_as_hex_string() {
        let a = addr(0xfe);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", "fe".repeat(ADDRESS_LENGTH)));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn ordering_follows_bytes() {
        assert!(addr(0x01) < addr(0x02));
    }
}
