//! Encryption primitives for Paperlock.
//!
//! Provides the vault's cryptographic core:
//! - PBKDF2-HMAC-SHA256 key derivation from passwords, with a versioned,
//!   counted work factor
//! - ChaCha20-Poly1305 authenticated encryption with a fresh random nonce
//!   per call
//! - Secure key handling with zeroization
//!
//! Document content is encrypted directly under the master key derived from
//! the user's password. The key is never stored anywhere: it is re-derived
//! on every unlock and lives only in process memory.
//!
//! There is no stored password-verification value. The only signal that a
//! password is wrong is an authentication-tag failure when decrypting real
//! content, which is indistinguishable from corrupted data on purpose.

mod cipher;
mod digest;
mod error;
mod key;

pub use cipher::{decrypt, encrypt, is_encrypted_format, EncryptedBlob, NONCE_SIZE};
pub use digest::content_hash;
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, generate_random_key, KdfParams, MasterKey, Salt, KEY_SIZE};
