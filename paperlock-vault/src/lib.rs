//! Master-key lifecycle and document encryption engine for Paperlock.
//!
//! Everything a user stores is encrypted on the client under a single
//! master key derived from their password; the storage backend only ever
//! sees ciphertext. This crate owns:
//!
//! - [`VaultKeyManager`] — the active key's lifetime (locked/unlocked)
//! - [`DocumentCodec`] — the encrypt/decrypt contract for document content
//! - [`RotationOrchestrator`] — bulk re-encryption under a new password
//! - [`RestoreCanaryChecker`] — backup import with wrong-key detection
//! - [`DocumentStore`] — the interface the persistence layer implements
//!
//! There is deliberately no stored password-verification value: failing to
//! decrypt real content is the only signal that a password is wrong, and
//! wrong-password and corrupted-data failures are reported identically.

mod codec;
mod document;
mod error;
mod keyring;
mod restore;
mod rotation;
mod store;

pub use codec::DocumentCodec;
pub use document::{
    BackupBundle, DocumentMetadata, DocumentUpdate, NewDocument, StoredDocument, TemplateDef,
};
pub use error::{VaultError, VaultResult};
pub use keyring::VaultKeyManager;
pub use restore::{RestoreCanaryChecker, RestoreReport};
pub use rotation::{RotationOptions, RotationOrchestrator, RotationReport};
pub use store::{DocumentStore, MemoryStore, StoreError, StoreResult};
