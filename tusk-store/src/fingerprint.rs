//! Stable identifiers for captured memories.

use sha2::{Digest, Sha256};

/// Hex characters kept from the full SHA-256 digest. Plenty of entropy for a
/// per-user memory directory.
const FINGERPRINT_HEX_LEN: usize = 16;

/// Derive the stable identifier for a piece of memory text.
///
/// The identifier is the first 16 hex characters of the SHA-256 digest of the
/// trimmed, lower-cased text, so texts differing only by case or surrounding
/// whitespace share one identifier and collapse to one stored artifact.
pub fn fingerprint(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    let mut id = hex::encode(digest);
    id.truncate(FINGERPRINT_HEX_LEN);
    id
}
