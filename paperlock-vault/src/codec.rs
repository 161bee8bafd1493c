//! The document encrypt/decrypt contract.
//!
//! Every read and write of sensitive document content goes through here.
//! The codec resolves the key per call (explicit override first, else the
//! manager's active key) and retains no key material beyond the call. It
//! also owns the persisted record shape: `{nonce, ciphertext, content_hash}`.

use paperlock_crypto::{content_hash, decrypt, encrypt, EncryptedBlob, MasterKey};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::error::{VaultError, VaultResult};
use crate::keyring::VaultKeyManager;

pub struct DocumentCodec {
    keyring: Arc<VaultKeyManager>,
}

impl DocumentCodec {
    pub fn new(keyring: Arc<VaultKeyManager>) -> Self {
        Self { keyring }
    }

    fn resolve_key(&self, key_override: Option<&MasterKey>) -> VaultResult<MasterKey> {
        match key_override {
            Some(key) => Ok(key.clone()),
            None => self.keyring.current_key(),
        }
    }

    /// Encrypts a document's plaintext fields into the persisted record.
    ///
    /// Fails with [`VaultError::Locked`] when the vault is locked and no
    /// override is supplied.
    pub fn encrypt_document(
        &self,
        fields: &Value,
        key_override: Option<&MasterKey>,
    ) -> VaultResult<Value> {
        let key = self.resolve_key(key_override)?;
        let plaintext = serde_json::to_vec(fields).map_err(|e| VaultError::Crypto(e.to_string()))?;
        let blob = encrypt(&key, &plaintext)?;
        Ok(json!({
            "nonce": blob.nonce,
            "ciphertext": blob.ciphertext,
            "content_hash": content_hash(&plaintext),
        }))
    }

    /// Decrypts a persisted record back into plaintext fields.
    ///
    /// Records that are not in the encrypted format are returned unchanged:
    /// they are pre-encryption legacy data, and rejecting them would change
    /// which stored records the application accepts. Tag failure surfaces
    /// [`VaultError::Decryption`] verbatim so callers can distinguish a
    /// wrong password from every other failure. A content-hash mismatch is
    /// logged, not thrown; the document is still returned.
    pub fn decrypt_document(
        &self,
        content: &Value,
        key_override: Option<&MasterKey>,
    ) -> VaultResult<Value> {
        let Some(blob) = EncryptedBlob::from_value(content) else {
            return Ok(content.clone());
        };

        let key = self.resolve_key(key_override)?;
        let plaintext = decrypt(&key, &blob)?;

        if let Some(stored) = content.get("content_hash").and_then(Value::as_str) {
            let computed = content_hash(&plaintext);
            if computed != stored {
                warn!(
                    stored = %stored,
                    computed = %computed,
                    "content hash mismatch after decrypt"
                );
            }
        }

        serde_json::from_slice(&plaintext).map_err(|e| VaultError::Crypto(e.to_string()))
    }
}
