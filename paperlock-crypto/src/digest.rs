//! Content digests for tamper detection.

use sha2::{Digest, Sha256};

/// SHA-256 of the decrypted plaintext, lowercase hex.
///
/// Stored alongside each blob and re-checked after every decrypt. A
/// mismatch is surfaced as a warning, never a failure: records predating
/// the digest carry no hash and must keep decrypting.
pub fn content_hash(plaintext: &[u8]) -> String {
    hex::encode(Sha256::digest(plaintext))
}
