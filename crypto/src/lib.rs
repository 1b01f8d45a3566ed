//! Key derivation and signing for spinup.
//!
//! - **BIP39** mnemonic generation and Ed25519 keypair derivation
//! - **Ed25519** transfer signing and verification
//! - Address derivation with `mrd_` prefix and Blake2b checksum

pub mod address;
pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod sign;

pub use address::{derive_address, verify_address};
pub use hash::blake2b_256;
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use mnemonic::{
    generate_mnemonic, keypair_from_mnemonic, validate_mnemonic, MnemonicError, WordCount,
};
pub use sign::{sign_message, verify_signature};
