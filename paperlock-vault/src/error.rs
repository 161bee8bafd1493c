//! Error types for the vault engine.

use paperlock_crypto::CryptoError;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors from the vault engine.
#[derive(Debug, Error)]
pub enum VaultError {
    /// No active key and no caller-supplied override. Recoverable: prompt
    /// for the password and retry.
    #[error("vault is locked")]
    Locked,

    /// Key derivation failed. Fatal; nothing proceeds without a key.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// Authentication tag failure. Wrong password and corrupted data are
    /// reported identically; the protocol cannot tell them apart.
    #[error("decryption failed (incorrect password or corrupted data)")]
    Decryption,

    /// Other cryptographic or serialization failure.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// A pre-commit rotation step failed. Guarantees no document or key
    /// state changed; the rotation is retryable from scratch.
    #[error("rotation aborted: {0}")]
    RotationAborted(String),

    /// The restore canary could not be decrypted with the candidate key.
    /// The restore did not proceed; prompt for a legacy password.
    #[error("backup key mismatch")]
    KeyMismatch,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Decryption => VaultError::Decryption,
            CryptoError::Derivation(msg) => VaultError::Derivation(msg),
            other => VaultError::Crypto(other.to_string()),
        }
    }
}

impl From<StoreError> for VaultError {
    fn from(err: StoreError) -> Self {
        VaultError::Storage(err.to_string())
    }
}
