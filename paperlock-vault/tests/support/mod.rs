#![allow(dead_code)]

//! Shared fixtures for the engine integration tests.

use paperlock_crypto::{derive_key, KdfParams, MasterKey, Salt};
use paperlock_vault::{
    DocumentCodec, DocumentMetadata, MemoryStore, RestoreCanaryChecker, RotationOrchestrator,
    StoredDocument, VaultKeyManager,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const USER: &str = "user-1234";

/// Low iteration count so tests stay fast; the production work factor is
/// exercised by its own unit test.
pub fn fast_params() -> KdfParams {
    KdfParams {
        version: 1,
        iterations: 1_000,
    }
}

/// Derives the key a given password would produce for the test user.
pub fn key_for(password: &str) -> MasterKey {
    derive_key(password, &Salt::from_user_id(USER), &fast_params()).unwrap()
}

pub struct Harness {
    pub keyring: Arc<VaultKeyManager>,
    pub codec: Arc<DocumentCodec>,
    pub store: Arc<MemoryStore>,
    pub rotation: RotationOrchestrator,
    pub restore: RestoreCanaryChecker,
}

/// Builds an engine with an unlocked session for `password` and an empty
/// in-memory store.
pub async fn unlocked(password: &str) -> Harness {
    let keyring = Arc::new(VaultKeyManager::new());
    keyring
        .activate(password, Salt::from_user_id(USER), fast_params())
        .await
        .unwrap();
    let codec = Arc::new(DocumentCodec::new(keyring.clone()));
    let store = Arc::new(MemoryStore::new());
    let rotation = RotationOrchestrator::new(keyring.clone(), codec.clone(), store.clone());
    let restore = RestoreCanaryChecker::new(keyring.clone(), codec.clone(), store.clone());
    Harness {
        keyring,
        codec,
        store,
        rotation,
        restore,
    }
}

pub fn fields(n: u32) -> Value {
    json!({
        "full_name": format!("Person {n}"),
        "account_number": format!("0000-{n:04}"),
    })
}

pub fn stored(id: &str, content: Value) -> StoredDocument {
    StoredDocument {
        id: id.to_string(),
        template_id: "contact-form".to_string(),
        content,
        metadata: DocumentMetadata::new(id),
    }
}

/// Flips one hex digit of a string field on an encrypted record.
pub fn corrupt_field(content: &mut Value, field: &str) {
    let value = content.get(field).and_then(Value::as_str).unwrap();
    let mut chars: Vec<char> = value.chars().collect();
    chars[0] = if chars[0] == '0' { '1' } else { '0' };
    content[field] = Value::String(chars.into_iter().collect());
}
