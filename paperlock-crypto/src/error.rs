//! Error types for the crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from the cryptographic primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (invalid inputs). Fatal; nothing proceeds
    /// without a key.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// The platform's secure random source was unavailable. Never degrades
    /// to a weaker source.
    #[error("secure random source unavailable: {0}")]
    Entropy(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Authentication tag did not verify. Wrong key and corrupted data are
    /// indistinguishable here; callers must report both the same way.
    #[error("decryption failed (incorrect password or corrupted data)")]
    Decryption,

    /// Malformed hex in a stored blob.
    #[error("invalid blob encoding: {0}")]
    Encoding(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Stored data references derivation parameters this build does not know.
    #[error("unsupported key derivation version: {0}")]
    UnsupportedKdfVersion(u8),
}
