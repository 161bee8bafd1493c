//! Master-key lifecycle.
//!
//! `VaultKeyManager` is the single owner of the active key: Locked holds
//! nothing, Unlocked holds exactly one key. A rotation transiently sees two
//! keys, but only inside the orchestrator while it holds the maintenance
//! lock. On success the manager goes straight back to Unlocked with the
//! new key, never through Locked.
//!
//! Readers take a snapshot of the key at the point of use and never cache
//! it across suspension points beyond one batch pass, so a `lock()` between
//! acquiring a codec and calling it fails cleanly instead of succeeding
//! with a stale key.

use paperlock_crypto::{derive_key, KdfParams, MasterKey, Salt};
use std::sync::RwLock;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{VaultError, VaultResult};

pub struct VaultKeyManager {
    key: RwLock<Option<MasterKey>>,
    /// Per-user derivation inputs, captured at activation. Non-secret.
    derivation: RwLock<Option<(Salt, KdfParams)>>,
    /// Serializes rotation/restore passes against each other and against
    /// key swaps. A swap must never land mid-batch.
    maintenance: Mutex<()>,
}

impl VaultKeyManager {
    pub fn new() -> Self {
        Self {
            key: RwLock::new(None),
            derivation: RwLock::new(None),
            maintenance: Mutex::new(()),
        }
    }

    /// Derives the master key and unlocks the vault, or replaces the key of
    /// an already-unlocked session.
    ///
    /// Derivation is CPU-bound by construction and runs off the calling
    /// thread. Fails only on derivation failure.
    pub async fn activate(&self, password: &str, salt: Salt, params: KdfParams) -> VaultResult<()> {
        let key = Self::derive_off_thread(password.to_string(), salt.clone(), params.clone()).await?;
        *self.derivation.write().unwrap() = Some((salt, params));
        *self.key.write().unwrap() = Some(key);
        debug!("vault unlocked");
        Ok(())
    }

    pub fn is_unlocked(&self) -> bool {
        self.key.read().unwrap().is_some()
    }

    /// Discards the key reference. Any encrypt/decrypt that re-checks the
    /// key after this point fails with [`VaultError::Locked`]; a stale-key
    /// success is not possible.
    pub fn lock(&self) {
        *self.key.write().unwrap() = None;
        debug!("vault locked");
    }

    /// Derives a key from `password` with the session's salt and
    /// parameters, without touching the active key. Used to test a legacy
    /// password during restore and to prepare a rotation candidate.
    pub async fn derive_candidate(&self, password: &str) -> VaultResult<MasterKey> {
        let (salt, params) = self
            .derivation
            .read()
            .unwrap()
            .clone()
            .ok_or(VaultError::Locked)?;
        Self::derive_off_thread(password.to_string(), salt, params).await
    }

    /// Atomically swaps the active key. Called only by the rotation
    /// orchestrator, after its batch commit is confirmed.
    pub fn replace_active_key(&self, new_key: MasterKey) -> VaultResult<()> {
        let mut guard = self.key.write().unwrap();
        if guard.is_none() {
            return Err(VaultError::Locked);
        }
        *guard = Some(new_key);
        Ok(())
    }

    /// Snapshot of the active key for one operation or one batch pass.
    pub(crate) fn current_key(&self) -> VaultResult<MasterKey> {
        self.key.read().unwrap().clone().ok_or(VaultError::Locked)
    }

    /// Exclusive guard for bulk passes (rotation, restore). Holding it
    /// keeps the active key stable for the duration of a batch.
    pub(crate) async fn maintenance_lock(&self) -> MutexGuard<'_, ()> {
        self.maintenance.lock().await
    }

    async fn derive_off_thread(
        password: String,
        salt: Salt,
        params: KdfParams,
    ) -> VaultResult<MasterKey> {
        tokio::task::spawn_blocking(move || derive_key(&password, &salt, &params))
            .await
            .map_err(|e| VaultError::Derivation(e.to_string()))?
            .map_err(VaultError::from)
    }
}

impl Default for VaultKeyManager {
    fn default() -> Self {
        Self::new()
    }
}
