//! Master-key rotation: re-encrypt every document under a key derived from
//! a new password, commit the batch atomically, then swap the active key.
//!
//! The ordering is the whole point. Nothing is written until every document
//! has been re-encrypted in memory, the batch write is all-or-nothing, and
//! the key swap happens only after the commit is confirmed. Any earlier
//! failure leaves the persisted documents and the active key exactly as
//! they were.

use paperlock_crypto::MasterKey;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::codec::DocumentCodec;
use crate::document::DocumentUpdate;
use crate::error::{VaultError, VaultResult};
use crate::keyring::VaultKeyManager;
use crate::store::DocumentStore;

/// Rotation tuning. `timeout` bounds the pre-commit phase (derivation,
/// read, re-encryption); expiry aborts with nothing committed.
#[derive(Clone, Debug, Default)]
pub struct RotationOptions {
    pub timeout: Option<Duration>,
}

/// Outcome of a successful rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationReport {
    /// Documents re-encrypted and committed.
    pub documents: usize,
}

pub struct RotationOrchestrator {
    keyring: Arc<VaultKeyManager>,
    codec: Arc<DocumentCodec>,
    store: Arc<dyn DocumentStore>,
}

impl RotationOrchestrator {
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

    /// Rotates the vault to `new_password`.
    ///
    /// Pre-commit failures (including timeout expiry) return
    /// [`VaultError::RotationAborted`] and are fully retryable from
    /// scratch. A commit failure is a [`VaultError::Storage`] with nothing
    /// half-written, because the batch write is atomic.
    pub async fn run(
        &self,
        user_id: &str,
        new_password: &str,
        options: RotationOptions,
    ) -> VaultResult<RotationReport> {
        let _guard = self.keyring.maintenance_lock().await;

        let (new_key, updates) = match options.timeout {
            Some(limit) => timeout(limit, self.stage(user_id, new_password))
                .await
                .map_err(|_| VaultError::RotationAborted("timed out before commit".into()))??,
            None => self.stage(user_id, new_password).await?,
        };
        let count = updates.len();

        // Commit point. Cancellation is no longer allowed past here; the
        // write either applies every update or none.
        self.store
            .write_document_batch(user_id, updates)
            .await
            .map_err(VaultError::from)?;

        // Data is committed under the new key; the swap must follow. The
        // maintenance guard means only a concurrent lock() can make this
        // fail, and the data is already correct; retry the swap alone.
        self.keyring.replace_active_key(new_key)?;

        info!(documents = count, "vault rotation committed");
        Ok(RotationReport { documents: count })
    }

    /// Pre-commit phase: derive the candidate, read every document, and
    /// re-encrypt in memory. No side effects; retryable as a whole.
    async fn stage(
        &self,
        user_id: &str,
        new_password: &str,
    ) -> VaultResult<(MasterKey, Vec<DocumentUpdate>)> {
        let new_key = self
            .keyring
            .derive_candidate(new_password)
            .await
            .map_err(|e| VaultError::RotationAborted(format!("candidate derivation: {e}")))?;

        // One key snapshot for the whole batch; the maintenance lock keeps
        // it from being swapped underneath us.
        let current_key = self
            .keyring
            .current_key()
            .map_err(|_| VaultError::RotationAborted("vault locked".into()))?;

        let documents = self
            .store
            .read_all_documents(user_id)
            .await
            .map_err(|e| VaultError::RotationAborted(format!("document read: {e}")))?;

        let mut updates = Vec::with_capacity(documents.len());
        for doc in &documents {
            // A decrypt failure here means the vault is already
            // inconsistent; rotating the rest would make recovery harder,
            // not easier. Legacy plaintext records pass through and get
            // encrypted for the first time.
            let fields = self
                .codec
                .decrypt_document(&doc.content, Some(&current_key))
                .map_err(|e| {
                    VaultError::RotationAborted(format!("document {}: {e}", doc.id))
                })?;
            let reencrypted = self
                .codec
                .encrypt_document(&fields, Some(&new_key))
                .map_err(|e| VaultError::RotationAborted(format!("re-encryption: {e}")))?;
            debug!(document = %doc.id, "staged for rotation");
            updates.push(DocumentUpdate {
                id: doc.id.clone(),
                content: reencrypted,
            });
        }

        Ok((new_key, updates))
    }
}
