//! Backup restore with wrong-key canary detection.
//!
//! A backup may have been taken under a different password than the live
//! session's. Before doing any real work, exactly one document is
//! trial-decrypted with the candidate key. If its tag fails, every other
//! document in the bundle would fail the same way (they were encrypted
//! under the same key), so the restore stops immediately with
//! [`VaultError::KeyMismatch`] instead of surfacing a pile of identical
//! failures. Past the canary, a failing document is a local data problem
//! and is skipped, not fatal.

use paperlock_crypto::{is_encrypted_format, MasterKey};
use std::sync::Arc;
use tracing::{info, warn};

use crate::codec::DocumentCodec;
use crate::document::{BackupBundle, NewDocument, StoredDocument};
use crate::error::{VaultError, VaultResult};
use crate::keyring::VaultKeyManager;
use crate::store::DocumentStore;

/// Outcome of a restore pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    /// Documents persisted under the live session key.
    pub restored: usize,
    /// Documents that failed to decrypt after the canary passed.
    pub skipped: usize,
}

pub struct RestoreCanaryChecker {
    keyring: Arc<VaultKeyManager>,
    codec: Arc<DocumentCodec>,
    store: Arc<dyn DocumentStore>,
}

impl RestoreCanaryChecker {
    pub fn new(
        keyring: Arc<VaultKeyManager>,
        codec: Arc<DocumentCodec>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            keyring,
            codec,
            store,
        }
    }

    /// Resolves the candidate key and trial-decrypts one document.
    ///
    /// With a legacy password supplied, the candidate is derived from it;
    /// otherwise the active key is used. Returns the candidate key on
    /// success so the full pass can reuse it. [`VaultError::KeyMismatch`]
    /// means the backup was encrypted under a different password; no
    /// further documents are attempted.
    pub async fn check(
        &self,
        bundle: &BackupBundle,
        legacy_password: Option<&str>,
    ) -> VaultResult<MasterKey> {
        let candidate = match legacy_password {
            Some(password) => self.keyring.derive_candidate(password).await?,
            None => self.keyring.current_key()?,
        };

        if let Some(canary) = Self::first_encrypted(&bundle.documents) {
            match self.codec.decrypt_document(&canary.content, Some(&candidate)) {
                Ok(_) => {}
                Err(VaultError::Decryption) => return Err(VaultError::KeyMismatch),
                Err(other) => return Err(other),
            }
        }
        // A bundle holding only legacy plaintext documents has no
        // ciphertext that could mismatch.
        Ok(candidate)
    }

    /// Runs the canary, then restores the full bundle: decrypt under the
    /// candidate key, re-encrypt under the live session key, persist each
    /// as a new document.
    ///
    /// The restored data always ends up protected by the password in
    /// effect for the live session, not the backup's original password.
    pub async fn restore(
        &self,
        user_id: &str,
        bundle: &BackupBundle,
        legacy_password: Option<&str>,
    ) -> VaultResult<RestoreReport> {
        let _guard = self.keyring.maintenance_lock().await;

        let candidate = self.check(bundle, legacy_password).await?;
        let active = self.keyring.current_key()?;

        let mut restored = 0usize;
        let mut skipped = 0usize;
        for doc in &bundle.documents {
            let fields = match self.codec.decrypt_document(&doc.content, Some(&candidate)) {
                Ok(fields) => fields,
                Err(err) => {
                    // The canary already proved the key; this document is
                    // individually unreadable.
                    warn!(document = %doc.id, error = %err, "skipping unreadable backup document");
                    skipped += 1;
                    continue;
                }
            };
            let content = self.codec.encrypt_document(&fields, Some(&active))?;
            let new_doc = NewDocument {
                template_id: doc.template_id.clone(),
                content,
                metadata: doc.metadata.clone(),
            };
            self.store
                .create_document(user_id, new_doc)
                .await
                .map_err(VaultError::from)?;
            restored += 1;
        }

        info!(
            restored,
            skipped,
            templates = bundle.templates.len(),
            "backup restore finished"
        );
        Ok(RestoreReport { restored, skipped })
    }

    fn first_encrypted(documents: &[StoredDocument]) -> Option<&StoredDocument> {
        documents.iter().find(|d| is_encrypted_format(&d.content))
    }
}
