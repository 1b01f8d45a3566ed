//! Core types for spinup.
//!
//! This crate defines the types shared across the workspace: account
//! addresses, native-currency amounts, Ed25519 key material, and network
//! identifiers. It has no network or crypto dependencies; address *checksum*
//! derivation lives in `spinup-crypto`.

pub mod address;
pub mod amount;
pub mod keys;
pub mod network;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
