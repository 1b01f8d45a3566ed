//! Address derivation from public keys.
//!
//! An address embeds the full hex-encoded public key followed by a 4-byte
//! checksum: the first 4 bytes of Blake2b-256 over the public key. The string
//! format itself (prefix, length, hex) is owned by `spinup_types::Address`.

use spinup_types::{Address, PublicKey};

use crate::hash::blake2b_256;

/// Compute the 4-byte address checksum for a public key.
fn checksum(public_key: &PublicKey) -> [u8; 4] {
    let digest = blake2b_256(public_key.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Derive the account address for a public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    Address::from_raw_parts(public_key.as_bytes(), &checksum(public_key))
}

/// Verify that an address's checksum matches its embedded public key.
pub fn verify_address(address: &Address) -> bool {
    let public_key = PublicKey(address.public_key_bytes());
    address.checksum_hex() == hex::encode(checksum(&public_key))
}
