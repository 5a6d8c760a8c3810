//! Identifier types for accounts, contracts and orders
//!
//! Addresses are 20 bytes, order hashes 32 bytes. Both display and parse as
//! `0x`-prefixed lowercase hex and serialize as that string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::errors::IdError;

/// Account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive the address controlled by an ed25519 public key:
    /// the last 20 bytes of `sha256(public_key)`.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        Self::from_digest(public_key)
    }

    /// Deterministic address for a named contract or fixture account.
    pub fn from_label(label: &str) -> Self {
        Self::from_digest(label.as_bytes())
    }

    fn from_digest(input: &[u8]) -> Self {
        let digest: [u8; 32] = Sha256::digest(input).into();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed::<20>(s)?))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical digest of a signed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderHash([u8; 32]);

impl OrderHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for OrderHash {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed::<32>(s)?))
    }
}

impl Serialize for OrderHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OrderHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], IdError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| IdError::InvalidHex(e.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| IdError::InvalidLength { expected: N, actual })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_label_is_deterministic() {
        let a = Address::from_label("relayer");
        let b = Address::from_label("relayer");
        assert_eq!(a, b);
        assert_ne!(a, Address::from_label("trader"));
        assert!(!a.is_zero());
    }

    #[test]
    fn test_address_display_and_parse() {
        let addr = Address::from_label("market");
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_parse_without_prefix() {
        let addr: Address = "0000000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(addr.as_bytes()[19], 1);
    }

    #[test]
    fn test_address_parse_rejects_wrong_length() {
        let err = "0xabcd".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            IdError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
    }

    #[test]
    fn test_address_parse_rejects_bad_hex() {
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(IdError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn test_address_serialization() {
        let addr = Address::from_label("proxy");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_order_hash_serialization() {
        let hash = OrderHash::new([7u8; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        let back: OrderHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
