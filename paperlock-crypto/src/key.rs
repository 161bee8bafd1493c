//! Key material: master keys, per-user salts, versioned derivation parameters.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 under a counted work factor so
//! that offline brute-forcing a password stays deliberately expensive. The
//! same password and salt always derive the same key; the salt is the user's
//! stable account identifier and must never change without a full rotation.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Symmetric key length in bytes (256-bit).
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric key. Exists only in process memory; zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice, rejecting anything but exactly
    /// [`KEY_SIZE`] bytes.
    pub fn try_from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    // Key material must never reach logs or panic messages.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Per-user key-derivation salt. Stable and non-secret; in practice the
/// user's account identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(Vec<u8>);

impl Salt {
    pub fn from_user_id(user_id: &str) -> Self {
        Self(user_id.as_bytes().to_vec())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Versioned key-derivation work factor.
///
/// Parameters travel with each user's stored data: raising the iteration
/// count mints a new version instead of mutating an existing one, so data
/// encrypted under an old version stays decryptable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub version: u8,
    pub iterations: u32,
}

impl KdfParams {
    /// PBKDF2-HMAC-SHA256, 100k iterations.
    pub const V1: KdfParams = KdfParams {
        version: 1,
        iterations: 100_000,
    };

    /// Resolves the parameters recorded alongside previously stored data.
    pub fn for_version(version: u8) -> CryptoResult<Self> {
        match version {
            1 => Ok(Self::V1),
            v => Err(CryptoError::UnsupportedKdfVersion(v)),
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::V1
    }
}

/// Derives a 256-bit key from a password and per-user salt.
///
/// Deterministic: identical inputs always produce an identical key, across
/// calls and across process restarts.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<MasterKey> {
    if salt.as_bytes().is_empty() {
        return Err(CryptoError::Derivation("empty salt".into()));
    }
    if params.iterations == 0 {
        return Err(CryptoError::Derivation("zero iteration count".into()));
    }

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        params.iterations,
        &mut key,
    );
    Ok(MasterKey::from_bytes(key))
}

/// Generates a random 256-bit key from the OS CSPRNG.
pub fn generate_random_key() -> CryptoResult<MasterKey> {
    use chacha20poly1305::aead::rand_core::RngCore;
    use chacha20poly1305::aead::OsRng;

    let mut bytes = [0u8; KEY_SIZE];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(MasterKey::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams {
            version: 1,
            iterations: 1_000,
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let salt = Salt::from_user_id("user-41");
        let k1 = derive_key("hunter2-but-longer", &salt, &fast_params()).unwrap();
        let k2 = derive_key("hunter2-but-longer", &salt, &fast_params()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_passwords_derive_different_keys() {
        let salt = Salt::from_user_id("user-41");
        let k1 = derive_key("alpha", &salt, &fast_params()).unwrap();
        let k2 = derive_key("beta", &salt, &fast_params()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_salts_derive_different_keys() {
        let k1 = derive_key("alpha", &Salt::from_user_id("user-1"), &fast_params()).unwrap();
        let k2 = derive_key("alpha", &Salt::from_user_id("user-2"), &fast_params()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn empty_salt_rejected() {
        let result = derive_key("alpha", &Salt::from_bytes(Vec::new()), &fast_params());
        assert!(matches!(result, Err(CryptoError::Derivation(_))));
    }

    #[test]
    fn zero_iterations_rejected() {
        let params = KdfParams {
            version: 1,
            iterations: 0,
        };
        let result = derive_key("alpha", &Salt::from_user_id("u"), &params);
        assert!(matches!(result, Err(CryptoError::Derivation(_))));
    }

    #[test]
    fn kdf_version_resolution() {
        assert_eq!(KdfParams::for_version(1).unwrap(), KdfParams::V1);
        assert!(matches!(
            KdfParams::for_version(9),
            Err(CryptoError::UnsupportedKdfVersion(9))
        ));
    }

    #[test]
    fn v1_work_factor_meets_floor() {
        assert!(KdfParams::V1.iterations >= 100_000);
    }

    #[test]
    fn random_keys_differ() {
        let k1 = generate_random_key().unwrap();
        let k2 = generate_random_key().unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn try_from_slice_checks_length() {
        assert!(MasterKey::try_from_slice(&[0u8; 32]).is_ok());
        assert!(matches!(
            MasterKey::try_from_slice(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let key = MasterKey::from_bytes([0xAB; KEY_SIZE]);
        let printed = format!("{key:?}");
        assert!(!printed.contains("171"));
        assert!(!printed.to_lowercase().contains("ab"));
    }
}
