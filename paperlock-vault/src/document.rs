//! Document model shared between the engine and the persistence layer.
//!
//! `content` is always one of two shapes: an encrypted record
//! (`{nonce, ciphertext, content_hash}`) or a legacy plaintext record from
//! before encryption shipped. Listing metadata stays plaintext on purpose
//! so the UI can render document lists without decrypting anything.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plaintext, non-sensitive listing metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    /// Unix millis.
    pub created_at: i64,
    /// Unix millis.
    pub modified_at: i64,
}

impl DocumentMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            title: title.into(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// A persisted document row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub template_id: String,
    /// Encrypted record or legacy plaintext record.
    pub content: Value,
    pub metadata: DocumentMetadata,
}

/// Payload for creating a document; the store mints the id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewDocument {
    pub template_id: String,
    pub content: Value,
    pub metadata: DocumentMetadata,
}

/// One entry of a rotation batch: replacement content for an existing row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub id: String,
    pub content: Value,
}

/// Template definition carried through backup import. The engine treats
/// definitions as opaque; persisting them belongs to the template layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateDef {
    pub id: String,
    pub definition: Value,
}

/// An imported backup: encrypted documents plus their originating templates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackupBundle {
    pub documents: Vec<StoredDocument>,
    pub templates: Vec<TemplateDef>,
}
