//! Persistence-layer boundary.
//!
//! The engine never talks to a backend directly; it consumes this trait.
//! `write_document_batch` is all-or-nothing: rotation stages an entire
//! vault as one batch and assumes it fits the backend's atomic write unit.
//! Vaults too large for that unit are an explicit scaling limit; they are
//! not silently chunked here.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::document::{DocumentUpdate, NewDocument, StoredDocument};

/// Errors from a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    /// The batch was rejected as a whole; no update was applied.
    #[error("batch write rejected: {0}")]
    BatchRejected(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote document persistence, as the engine needs to see it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents owned by `user_id`.
    async fn read_all_documents(&self, user_id: &str) -> StoreResult<Vec<StoredDocument>>;

    /// Replaces the content of every listed document atomically: either
    /// all updates apply or none do.
    async fn write_document_batch(
        &self,
        user_id: &str,
        updates: Vec<DocumentUpdate>,
    ) -> StoreResult<()>;

    /// Persists a new document and returns its minted id.
    async fn create_document(&self, user_id: &str, doc: NewDocument) -> StoreResult<String>;
}

/// In-memory store with atomic batch semantics.
///
/// Reference implementation for tests and for embedders wiring the engine
/// before a real backend exists.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user's documents directly, bypassing creation.
    pub fn seed(&self, user_id: &str, docs: Vec<StoredDocument>) {
        self.inner.write().unwrap().insert(user_id.to_string(), docs);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_all_documents(&self, user_id: &str) -> StoreResult<Vec<StoredDocument>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_document_batch(
        &self,
        user_id: &str,
        updates: Vec<DocumentUpdate>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().unwrap();
        let docs = inner
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;

        // Validate the whole batch before touching anything.
        for update in &updates {
            if !docs.iter().any(|d| d.id == update.id) {
                return Err(StoreError::BatchRejected(format!(
                    "unknown document {}",
                    update.id
                )));
            }
        }

        for update in updates {
            if let Some(doc) = docs.iter_mut().find(|d| d.id == update.id) {
                doc.content = update.content;
            }
        }
        Ok(())
    }

    async fn create_document(&self, user_id: &str, doc: NewDocument) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let stored = StoredDocument {
            id: id.clone(),
            template_id: doc.template_id,
            content: doc.content,
            metadata: doc.metadata,
        };
        self.inner
            .write()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }
}
