//! Authenticated encryption with ChaCha20-Poly1305.
//!
//! Every encryption call draws a fresh 96-bit nonce from the OS CSPRNG.
//! Nonce reuse under one key breaks the mode's confidentiality outright, so
//! nonces are never derived, counted, or cached.

use chacha20poly1305::aead::rand_core::RngCore;
use chacha20poly1305::aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CryptoError, CryptoResult};
use crate::key::MasterKey;

/// Nonce length in bytes for ChaCha20-Poly1305.
pub const NONCE_SIZE: usize = 12;

/// The persisted form of any encrypted payload: nonce and ciphertext as
/// fixed-width lowercase hex. This is the only format ever written for
/// sensitive content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// 24 hex chars (96-bit nonce).
    pub nonce: String,
    /// Even-length hex: ciphertext plus the Poly1305 tag.
    pub ciphertext: String,
}

impl EncryptedBlob {
    /// Parses the blob out of a stored JSON record, if it is one.
    ///
    /// Returns `None` for records missing either field: those are
    /// pre-encryption legacy data, not an error.
    pub fn from_value(value: &Value) -> Option<Self> {
        let nonce = value.get("nonce")?.as_str()?;
        let ciphertext = value.get("ciphertext")?.as_str()?;
        Some(Self {
            nonce: nonce.to_string(),
            ciphertext: ciphertext.to_string(),
        })
    }
}

/// Whether a stored JSON record is an encrypted blob.
///
/// Anything that is not (a record missing `nonce` or `ciphertext`)
/// must be passed through untouched by callers, never rejected.
pub fn is_encrypted_format(value: &Value) -> bool {
    EncryptedBlob::from_value(value).is_some()
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
///
/// Two calls with identical inputs produce different blobs. Fails with
/// [`CryptoError::Entropy`] if the OS random source is unavailable; it
/// never falls back to a weaker source.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> CryptoResult<EncryptedBlob> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedBlob {
        nonce: hex::encode(nonce_bytes),
        ciphertext: hex::encode(ciphertext),
    })
}

/// Decrypts a blob, verifying its authentication tag.
///
/// Tag failure means wrong key, corrupted ciphertext, or tampering. The
/// three are indistinguishable, and [`CryptoError::Decryption`] carries no
/// detail on purpose.
pub fn decrypt(key: &MasterKey, blob: &EncryptedBlob) -> CryptoResult<Vec<u8>> {
    let nonce_bytes =
        hex::decode(&blob.nonce).map_err(|e| CryptoError::Encoding(format!("nonce: {e}")))?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(CryptoError::Encoding(format!(
            "nonce length {} (expected {NONCE_SIZE})",
            nonce_bytes.len()
        )));
    }
    let ciphertext = hex::decode(&blob.ciphertext)
        .map_err(|e| CryptoError::Encoding(format!("ciphertext: {e}")))?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| CryptoError::Decryption)
}
