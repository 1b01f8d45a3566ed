//! Account address type.
//!
//! Address format: `mrd_` + hex(public_key, 64 chars) + hex(checksum, 8 chars).
//! The checksum is the first 4 bytes of Blake2b-256 over the public key;
//! computing and verifying it lives in `spinup-crypto`. This module owns the
//! string format: prefix, length, and hex-character validation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Prefix for all Meridian addresses.
pub const ADDRESS_PREFIX: &str = "mrd_";
/// Hex characters encoding the 32-byte public key.
const PUBKEY_CHARS: usize = 64;
/// Hex characters encoding the 4-byte checksum.
const CHECKSUM_CHARS: usize = 8;

/// Errors from parsing an address string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with `{ADDRESS_PREFIX}`")]
    BadPrefix,

    #[error("address body must be {expected} characters, got {got}")]
    BadLength { expected: usize, got: usize },

    #[error("address contains non-hex characters")]
    BadEncoding,
}

/// A Meridian account address.
///
/// Guaranteed well-formed (prefix, length, hex body) by construction.
/// Checksum correctness is a separate concern, verified by
/// `spinup_crypto::verify_address`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let body = s.strip_prefix(ADDRESS_PREFIX).ok_or(AddressError::BadPrefix)?;
        if body.len() != PUBKEY_CHARS + CHECKSUM_CHARS {
            return Err(AddressError::BadLength {
                expected: PUBKEY_CHARS + CHECKSUM_CHARS,
                got: body.len(),
            });
        }
        if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::BadEncoding);
        }
        Ok(Self(s.to_string()))
    }

    /// Assemble an address from its raw parts.
    ///
    /// Used by `spinup_crypto::derive_address`; the caller is responsible for
    /// supplying a checksum that actually matches the public key.
    pub fn from_raw_parts(public_key: &[u8; 32], checksum: &[u8; 4]) -> Self {
        Self(format!(
            "{ADDRESS_PREFIX}{}{}",
            hex::encode(public_key),
            hex::encode(checksum)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex-encoded public key portion of the address body.
    pub fn public_key_hex(&self) -> &str {
        &self.0[ADDRESS_PREFIX.len()..ADDRESS_PREFIX.len() + PUBKEY_CHARS]
    }

    /// The hex-encoded checksum portion of the address body.
    pub fn checksum_hex(&self) -> &str {
        &self.0[ADDRESS_PREFIX.len() + PUBKEY_CHARS..]
    }

    /// Decode the public key bytes embedded in the address.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        // Infallible: construction guarantees 64 hex chars.
        let decoded = hex::decode(self.public_key_hex()).expect("validated hex");
        out.copy_from_slice(&decoded);
        out
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address::from_raw_parts(&[0xAB; 32], &[0x01, 0x02, 0x03, 0x04])
    }

    #[test]
    fn round_trips_through_parse() {
        let addr = sample();
        let parsed = Address::parse(addr.as_str()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn exposes_parts() {
        let addr = sample();
        assert_eq!(addr.public_key_hex(), "ab".repeat(32));
        assert_eq!(addr.checksum_hex(), "01020304");
        assert_eq!(addr.public_key_bytes(), [0xAB; 32]);
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert_eq!(
            Address::parse("brd_0011"),
            Err(AddressError::BadPrefix)
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Address::parse("mrd_abcdef").unwrap_err();
        assert!(matches!(err, AddressError::BadLength { got: 6, .. }));
    }

    #[test]
    fn rejects_non_hex() {
        let body = "zz".repeat(36);
        let err = Address::parse(&format!("mrd_{body}")).unwrap_err();
        assert_eq!(err, AddressError::BadEncoding);
    }

    #[test]
    fn serde_round_trip() {
        let addr = sample();
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn serde_rejects_malformed() {
        let result: Result<Address, _> = serde_json::from_str("\"mrd_nothex\"");
        assert!(result.is_err());
    }
}
