//! BIP39 mnemonic generation and Ed25519 key derivation.
//!
//! Generates a 12- or 24-word mnemonic and derives an Ed25519 keypair using
//! derivation path `m/44'/7305'/0'/0/0` (7305 = Meridian coin type).
//!
//! The derivation applies HMAC-SHA512 keyed with the path over the BIP39
//! seed, then takes the first 32 bytes as the Ed25519 secret key.

use bip39::Mnemonic;
use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use spinup_types::{KeyPair, PrivateKey, PublicKey};
use thiserror::Error;

type HmacSha512 = Hmac<Sha512>;

/// BIP44 derivation path for Meridian: m/44'/7305'/0'/0/0
const MERIDIAN_BIP44_PATH: &str = "m/44'/7305'/0'/0/0";

/// How many words a generated mnemonic carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordCount {
    Twelve,
    TwentyFour,
}

impl WordCount {
    /// Entropy bytes backing a mnemonic of this length.
    fn entropy_len(self) -> usize {
        match self {
            Self::Twelve => 16,
            Self::TwentyFour => 32,
        }
    }

    pub fn words(self) -> usize {
        match self {
            Self::Twelve => 12,
            Self::TwentyFour => 24,
        }
    }
}

/// Errors arising from mnemonic operations.
#[derive(Debug, Error)]
pub enum MnemonicError {
    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),
}

/// Generate a fresh BIP39 mnemonic with the requested word count.
pub fn generate_mnemonic(word_count: WordCount) -> Result<String, MnemonicError> {
    let mut entropy = vec![0u8; word_count.entropy_len()];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| MnemonicError::DerivationFailed(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Derive an Ed25519 keypair from a BIP39 mnemonic phrase.
///
/// Process:
/// 1. Validate the mnemonic and derive the BIP39 seed (empty passphrase)
/// 2. HMAC-SHA512 keyed with the derivation path over the seed
/// 3. First 32 bytes of the output become the Ed25519 secret key
pub fn keypair_from_mnemonic(mnemonic: &str) -> Result<KeyPair, MnemonicError> {
    let mnemonic = Mnemonic::parse_normalized(mnemonic)
        .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()))?;

    let seed = mnemonic.to_seed_normalized("");

    let mut mac = HmacSha512::new_from_slice(MERIDIAN_BIP44_PATH.as_bytes())
        .map_err(|e| MnemonicError::DerivationFailed(e.to_string()))?;
    mac.update(&seed);
    let derived = mac.finalize().into_bytes();

    let mut secret_bytes = [0u8; 32];
    secret_bytes.copy_from_slice(&derived[..32]);

    let signing_key = SigningKey::from_bytes(&secret_bytes);
    let verifying_key = signing_key.verifying_key();

    Ok(KeyPair {
        public: PublicKey(verifying_key.to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    })
}

/// Validate that a phrase is a well-formed BIP39 mnemonic.
pub fn validate_mnemonic(mnemonic: &str) -> bool {
    Mnemonic::parse_normalized(mnemonic).is_ok()
}
