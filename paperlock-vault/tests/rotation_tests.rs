mod support;

use paperlock_vault::{DocumentStore, RotationOptions, VaultError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use support::{corrupt_field, fields, key_for, stored, unlocked, USER};

#[tokio::test]
async fn rotation_reencrypts_every_document_and_swaps_the_key() {
    let h = unlocked("old password").await;
    let docs: Vec<_> = (0..3)
        .map(|n| {
            let content = h.codec.encrypt_document(&fields(n), None).unwrap();
            stored(&format!("doc-{n}"), content)
        })
        .collect();
    h.store.seed(USER, docs);

    let report = h
        .rotation
        .run(USER, "new password", RotationOptions::default())
        .await
        .unwrap();
    assert_eq!(report.documents, 3);

    let old_key = key_for("old password");
    for (n, doc) in h.store.read_all_documents(USER).await.unwrap().iter().enumerate() {
        // The active key is now the new one and opens every blob.
        assert_eq!(
            h.codec.decrypt_document(&doc.content, None).unwrap(),
            fields(n as u32)
        );
        // The persisted blobs no longer open under the old key.
        assert!(matches!(
            h.codec.decrypt_document(&doc.content, Some(&old_key)),
            Err(VaultError::Decryption)
        ));
    }
}

#[tokio::test]
async fn one_bad_document_aborts_with_nothing_changed() {
    let h = unlocked("old password").await;
    let mut docs: Vec<_> = (0..3)
        .map(|n| {
            let content = h.codec.encrypt_document(&fields(n), None).unwrap();
            stored(&format!("doc-{n}"), content)
        })
        .collect();
    corrupt_field(&mut docs[1].content, "ciphertext");
    h.store.seed(USER, docs.clone());

    let result = h
        .rotation
        .run(USER, "new password", RotationOptions::default())
        .await;
    assert!(matches!(result, Err(VaultError::RotationAborted(_))));

    // Store is byte-for-byte as seeded and the old key is still active.
    let after = h.store.read_all_documents(USER).await.unwrap();
    assert_eq!(after, docs);
    assert_eq!(
        h.codec.decrypt_document(&after[0].content, None).unwrap(),
        fields(0)
    );
}

#[tokio::test]
async fn legacy_plaintext_documents_get_encrypted_by_rotation() {
    let h = unlocked("old password").await;
    let legacy = json!({ "title": "pre-encryption note" });
    h.store.seed(USER, vec![stored("doc-legacy", legacy.clone())]);

    h.rotation
        .run(USER, "new password", RotationOptions::default())
        .await
        .unwrap();

    let after = h.store.read_all_documents(USER).await.unwrap();
    assert!(paperlock_crypto::is_encrypted_format(&after[0].content));
    assert_eq!(
        h.codec.decrypt_document(&after[0].content, None).unwrap(),
        legacy
    );
}

#[tokio::test]
async fn locked_vault_cannot_rotate() {
    let h = unlocked("old password").await;
    h.keyring.lock();

    let result = h
        .rotation
        .run(USER, "new password", RotationOptions::default())
        .await;
    assert!(matches!(result, Err(VaultError::RotationAborted(_))));
}

#[tokio::test]
async fn expired_timeout_aborts_before_commit() {
    let h = unlocked("old password").await;
    let content = h.codec.encrypt_document(&fields(0), None).unwrap();
    let docs = vec![stored("doc-0", content)];
    h.store.seed(USER, docs.clone());

    let result = h
        .rotation
        .run(
            USER,
            "new password",
            RotationOptions {
                timeout: Some(Duration::ZERO),
            },
        )
        .await;
    assert!(matches!(result, Err(VaultError::RotationAborted(_))));

    // Nothing committed, old key still active.
    assert_eq!(h.store.read_all_documents(USER).await.unwrap(), docs);
    assert_eq!(
        h.codec.decrypt_document(&docs[0].content, None).unwrap(),
        fields(0)
    );
}

#[tokio::test]
async fn empty_vault_rotation_succeeds_and_swaps_key() {
    let h = unlocked("old password").await;
    h.store.seed(USER, Vec::new());

    let report = h
        .rotation
        .run(USER, "new password", RotationOptions::default())
        .await
        .unwrap();
    assert_eq!(report.documents, 0);

    // New password's key is active now.
    let record = h.codec.encrypt_document(&fields(0), None).unwrap();
    let new_key = key_for("new password");
    assert_eq!(
        h.codec.decrypt_document(&record, Some(&new_key)).unwrap(),
        fields(0)
    );
}
