//! Encrypted persistence of generated-account recovery phrases.
//!
//! Funds sent to a generated account are recoverable only through its
//! mnemonic. When a keystore directory is configured, each phrase is
//! encrypted and written to disk *before* the forward transfer is submitted,
//! so no funds are ever sent to a key that exists only in a log line.
//!
//! Format: Argon2id derives a 32-byte key from the passphrase + random salt,
//! AES-256-GCM encrypts the UTF-8 phrase bytes with a random nonce, and the
//! result is stored as one JSON file per account, named by address.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use spinup_types::Address;

use crate::error::WalletError;

/// Argon2id parameters: 19 MiB memory, 2 iterations, 1 lane.
const ARGON2_MEMORY_KIB: u32 = 19456;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Salt length in bytes.
const SALT_LEN: usize = 32;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// One encrypted phrase, serializable to/from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    /// The account address this phrase controls.
    pub address: String,
    pub crypto: KeystoreCrypto,
}

/// The crypto section, carrying every parameter needed for decryption.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded nonce.
    pub nonce: String,
    /// Hex-encoded ciphertext.
    pub ciphertext: String,
}

/// KDF parameters for Argon2id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Derive a 32-byte encryption key from a passphrase via Argon2id.
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; ARGON2_OUTPUT_LEN], WalletError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| WalletError::Keystore(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut out = [0u8; ARGON2_OUTPUT_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut out)
        .map_err(|e| WalletError::Keystore(format!("key derivation failed: {e}")))?;
    Ok(out)
}

/// Encrypt a recovery phrase with a passphrase.
pub fn encrypt_phrase(
    address: &Address,
    phrase: &str,
    passphrase: &str,
) -> Result<KeystoreFile, WalletError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let derived = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived)
        .map_err(|e| WalletError::Keystore(format!("AES key init failed: {e}")))?;

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, phrase.as_bytes())
        .map_err(|e| WalletError::Keystore(format!("encryption failed: {e}")))?;

    Ok(KeystoreFile {
        version: 1,
        address: address.as_str().to_string(),
        crypto: KeystoreCrypto {
            cipher: "aes-256-gcm".to_string(),
            kdf: "argon2id".to_string(),
            kdf_params: KdfParams {
                memory: ARGON2_MEMORY_KIB,
                iterations: ARGON2_ITERATIONS,
                parallelism: ARGON2_PARALLELISM,
            },
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
        },
    })
}

/// Decrypt a keystore file, returning the recovery phrase.
pub fn decrypt_phrase(keystore: &KeystoreFile, passphrase: &str) -> Result<String, WalletError> {
    if keystore.version != 1 {
        return Err(WalletError::Keystore(format!(
            "unsupported keystore version: {}",
            keystore.version
        )));
    }

    let salt = hex::decode(&keystore.crypto.salt)
        .map_err(|e| WalletError::Keystore(format!("invalid salt hex: {e}")))?;
    let nonce_bytes = hex::decode(&keystore.crypto.nonce)
        .map_err(|e| WalletError::Keystore(format!("invalid nonce hex: {e}")))?;
    let ciphertext = hex::decode(&keystore.crypto.ciphertext)
        .map_err(|e| WalletError::Keystore(format!("invalid ciphertext hex: {e}")))?;

    if nonce_bytes.len() != NONCE_LEN {
        return Err(WalletError::Keystore(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce_bytes.len()
        )));
    }

    let derived = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived)
        .map_err(|e| WalletError::Keystore(format!("AES key init failed: {e}")))?;

    let nonce = Nonce::from_slice(&nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| WalletError::Keystore("decryption failed (wrong passphrase?)".into()))?;

    String::from_utf8(plaintext)
        .map_err(|e| WalletError::Keystore(format!("decrypted phrase is not UTF-8: {e}")))
}

/// Encrypt and write one generated account's phrase, returning the file path.
///
/// The file is named after the account address; an existing file for the
/// same address is never overwritten (a generated address collision would
/// mean something is deeply wrong).
pub fn save_generated(
    dir: &Path,
    address: &Address,
    phrase: &str,
    passphrase: &str,
) -> Result<PathBuf, WalletError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| WalletError::Keystore(format!("cannot create keystore dir: {e}")))?;

    let path = dir.join(format!("{}.json", address.as_str()));
    if path.exists() {
        return Err(WalletError::Keystore(format!(
            "keystore already exists: {}",
            path.display()
        )));
    }

    let keystore = encrypt_phrase(address, phrase, passphrase)?;
    let json = serde_json::to_string_pretty(&keystore)
        .map_err(|e| WalletError::Keystore(format!("serialization failed: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| WalletError::Keystore(format!("cannot write keystore: {e}")))?;

    Ok(path)
}

/// Load and decrypt a previously saved keystore file.
pub fn load_generated(path: &Path, passphrase: &str) -> Result<String, WalletError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| WalletError::Keystore(format!("cannot read keystore: {e}")))?;
    let keystore: KeystoreFile = serde_json::from_str(&json)
        .map_err(|e| WalletError::Keystore(format!("malformed keystore: {e}")))?;
    decrypt_phrase(&keystore, passphrase)
}
